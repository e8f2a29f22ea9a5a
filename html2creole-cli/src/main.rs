//! html2creole command line tool
//!
//! Converts an HTML file, an inline string or stdin to Creole markup.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use html2creole::dom::print_tree;
use html2creole::{Config, parse_document};
use owo_colors::OwoColorize;

/// Convert HTML documents into Creole wiki markup
#[derive(Parser, Debug)]
#[command(name = "html2creole")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Convert a file
    html2creole page.html

    # Convert inline HTML
    html2creole --html '<p>Hello <strong>world</strong></p>'

    # Read from stdin
    cat page.html | html2creole

    # Show the document tree instead of Creole
    html2creole --tree page.html

    # Load options from a JSON file
    html2creole --config html2creole.json page.html
"#)]
struct Cli {
    /// Path to the HTML file; stdin is read when neither this nor --html is given
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Convert this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Trace builder and emitter events to stderr
    #[arg(long)]
    debug: bool,

    /// Print the document tree instead of Creole markup
    #[arg(long)]
    tree: bool,

    /// Print the token stream instead of Creole markup
    #[arg(long)]
    tokens: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    config.debug |= cli.debug;

    let html = read_input(cli)?;
    let document = parse_document(&html, &config);

    if cli.tokens {
        println!("=== Tokens ({}) ===", document.tokens.len());
        for (i, token) in document.tokens.iter().enumerate() {
            println!("{i:5}: {token}");
        }
        return Ok(());
    }

    if cli.tree {
        print_tree(&document.tree, document.tree.root());
        for issue in &document.issues {
            eprintln!(
                "{} token {}: {}",
                "issue:".yellow(),
                issue.token_index,
                issue.message
            );
        }
        return Ok(());
    }

    let creole = document
        .emit(&config.emitter)
        .context("conversion failed")?;
    println!("{creole}");
    Ok(())
}

/// Load HTML from --html, the file argument, or stdin.
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(html) = &cli.html {
        return Ok(html.clone());
    }
    if let Some(path) = &cli.path {
        return fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()));
    }
    let mut html = String::new();
    let _ = io::stdin()
        .read_to_string(&mut html)
        .context("failed to read stdin")?;
    Ok(html)
}

fn load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config '{}'", path.display()))
}
