//! Verbatim region extraction and whitespace normalization.
//!
//! Preformatted blocks, inline code spans and template pass-through blocks
//! must reach the output untouched. They are cut out of the raw text before
//! tokenizing and replaced by a placeholder tag:
//!
//! ```text
//! <pre>raw &amp; text</pre>   =>   <blockdata type="pre" id="0" />
//! ```
//!
//! The captured text is kept in a [`VerbatimTable`] and looked up again by
//! the tree builder when it meets the placeholder.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use html2creole_dom::is_block_tag;

/// Kinds of verbatim region, in matcher priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RegionKind {
    /// `{% name ... %} ... {% endname %}`
    PassBlock,
    /// `<pre>...</pre>`
    PreBlock,
    /// `<tt>...</tt>` or `<code>...</code>`
    InlineCode,
}

impl RegionKind {
    /// Element name of the placeholder tag.
    #[must_use]
    pub const fn placeholder_tag(self) -> &'static str {
        match self {
            Self::PassBlock | Self::PreBlock => "blockdata",
            Self::InlineCode => "inlinedata",
        }
    }

    /// Value of the placeholder's `type` attribute.
    #[must_use]
    pub const fn type_tag(self) -> &'static str {
        match self {
            Self::PassBlock => "pass",
            Self::PreBlock | Self::InlineCode => "pre",
        }
    }

    /// Map a placeholder element name and `type` value back to a region kind.
    #[must_use]
    pub fn from_marker(tag: &str, type_tag: &str) -> Option<Self> {
        Self::iter().find(|kind| kind.placeholder_tag() == tag && kind.type_tag() == type_tag)
    }

    /// Whether `tag` names a placeholder element.
    #[must_use]
    pub fn is_placeholder_tag(tag: &str) -> bool {
        Self::iter().any(|kind| kind.placeholder_tag() == tag)
    }

    /// The placeholder tag that stands in for entry `id` of the table.
    #[must_use]
    pub fn placeholder(self, id: usize) -> String {
        format!(
            "<{} type=\"{}\" id=\"{id}\" />",
            self.placeholder_tag(),
            self.type_tag()
        )
    }
}

/// One region found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RegionMatch {
    /// Byte offset of the region start.
    start: usize,
    /// Byte offset just past the region end.
    end: usize,
    /// The text to store in the table.
    captured: String,
    kind: RegionKind,
}

/// A way to find one kind of region.
#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// `{% name %} ... {% endname %}`, both markers included.
    PassBlock,
    /// An element whose content is captured, optionally trimmed.
    Element {
        regex: &'static LazyLock<Regex>,
        kind: RegionKind,
        trim: bool,
    },
}

static PRE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<pre(?:\s[^>]*)?>(.*?)</pre\s*>").unwrap());

static TT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tt(?:\s[^>]*)?>(.*?)</tt\s*>").unwrap());

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<code(?:\s[^>]*)?>(.*?)</code\s*>").unwrap());

static TEMPLATE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{%\s*(\w+).*?%\}").unwrap());

static TEMPLATE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%\s*end(\w+)\s*%\}").unwrap());

/// The matchers in priority order: pass-through, preformatted, inline code.
static MATCHERS: [Matcher; 4] = [
    Matcher::PassBlock,
    Matcher::Element {
        regex: &PRE_RE,
        kind: RegionKind::PreBlock,
        trim: true,
    },
    Matcher::Element {
        regex: &TT_RE,
        kind: RegionKind::InlineCode,
        trim: false,
    },
    Matcher::Element {
        regex: &CODE_RE,
        kind: RegionKind::InlineCode,
        trim: false,
    },
];

/// Next match of one matcher, remembered between steps of a scan.
#[derive(Debug)]
enum Pending {
    Unsearched,
    Found(RegionMatch),
    /// Nothing at or after the last search offset, so nothing later either.
    Exhausted,
}

/// Finds the regions of one document, left to right.
///
/// Each matcher's next match is kept until the scan moves past its start.
/// Template close markers are indexed once per document.
struct RegionScanner<'t> {
    text: &'t str,
    /// `{% endname %}` markers by name, as `(start, end)` in text order.
    closes: HashMap<&'t str, Vec<(usize, usize)>>,
    /// One entry per item of [`MATCHERS`].
    pending: Vec<Pending>,
}

impl<'t> RegionScanner<'t> {
    fn new(text: &'t str) -> Self {
        let mut closes: HashMap<&'t str, Vec<(usize, usize)>> = HashMap::new();
        for caps in TEMPLATE_CLOSE_RE.captures_iter(text) {
            if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
                closes
                    .entry(name.as_str())
                    .or_default()
                    .push((whole.start(), whole.end()));
            }
        }
        Self {
            text,
            closes,
            pending: MATCHERS.iter().map(|_| Pending::Unsearched).collect(),
        }
    }

    /// The earliest region starting at or after `pos`. Ties go to the
    /// matcher listed first.
    fn next_region(&mut self, pos: usize) -> Option<RegionMatch> {
        let mut best: Option<(usize, usize)> = None;
        for (index, matcher) in MATCHERS.iter().enumerate() {
            let stale = match &self.pending[index] {
                Pending::Unsearched => true,
                Pending::Found(region) => region.start < pos,
                Pending::Exhausted => false,
            };
            if stale {
                self.pending[index] = self
                    .find(*matcher, pos)
                    .map_or(Pending::Exhausted, Pending::Found);
            }
            let Pending::Found(region) = &self.pending[index] else {
                continue;
            };
            if best.is_none_or(|(start, _)| region.start < start) {
                best = Some((region.start, index));
            }
        }

        let (_, index) = best?;
        match std::mem::replace(&mut self.pending[index], Pending::Unsearched) {
            Pending::Found(region) => Some(region),
            Pending::Unsearched | Pending::Exhausted => None,
        }
    }

    fn find(&self, matcher: Matcher, from: usize) -> Option<RegionMatch> {
        match matcher {
            Matcher::PassBlock => self.find_pass_block(from),
            Matcher::Element { regex, kind, trim } => {
                let caps = regex.captures_at(self.text, from)?;
                let whole = caps.get(0)?;
                let inner = caps.get(1).map_or("", |m| m.as_str());
                Some(RegionMatch {
                    start: whole.start(),
                    end: whole.end(),
                    captured: if trim { inner.trim() } else { inner }.to_string(),
                    kind,
                })
            }
        }
    }

    /// An opening marker without a matching close after it is skipped.
    fn find_pass_block(&self, from: usize) -> Option<RegionMatch> {
        let mut pos = from;
        while let Some(caps) = TEMPLATE_OPEN_RE.captures_at(self.text, pos) {
            let open = caps.get(0)?;
            let name = caps.get(1).map_or("", |m| m.as_str());
            pos = open.end();

            if name.starts_with("end") {
                continue;
            }
            let Some(closes) = self.closes.get(name) else {
                continue;
            };
            let next = closes.partition_point(|&(start, _)| start < open.end());
            if let Some(&(_, end)) = closes.get(next) {
                return Some(RegionMatch {
                    start: open.start(),
                    end,
                    captured: self.text[open.start()..end].trim().to_string(),
                    kind: RegionKind::PassBlock,
                });
            }
        }
        None
    }
}

/// Ordered store of captured verbatim text, indexed by placeholder `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerbatimTable {
    entries: Vec<String>,
}

impl VerbatimTable {
    /// Create an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Store `content` and return its id.
    pub fn push(&mut self, content: String) -> usize {
        self.entries.push(content);
        self.entries.len() - 1
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no region was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cut every verbatim region out of `text`.
///
/// Scans left to right; at each step the earliest-starting match wins, ties
/// going to pass-through blocks, then `<pre>`, then inline code. Region
/// content is never scanned again.
///
/// ```
/// use html2creole_html::verbatim::extract;
///
/// let (text, table) = extract("<p>a</p><pre> x </pre>");
/// assert_eq!(text, r#"<p>a</p><blockdata type="pre" id="0" />"#);
/// assert_eq!(table.get(0), Some("x"));
/// ```
#[must_use]
pub fn extract(text: &str) -> (String, VerbatimTable) {
    let mut scanner = RegionScanner::new(text);
    let mut table = VerbatimTable::new();
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(region) = scanner.next_region(pos) {
        out.push_str(&text[pos..region.start]);
        let id = table.push(region.captured);
        out.push_str(&region.kind.placeholder(id));
        pos = region.end;
    }

    out.push_str(&text[pos..]);
    (out, table)
}

static LINE_BREAK_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>$").unwrap());

static LEADING_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^</?([A-Za-z][A-Za-z0-9]*)").unwrap());

fn starts_with_block_tag(line: &str) -> bool {
    LEADING_TAG_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .is_some_and(|name| is_block_tag(&name.as_str().to_ascii_lowercase()))
}

/// Collapse the whitespace of HTML source.
///
/// Every line is trimmed and its whitespace runs collapsed, empty lines are
/// dropped, and the lines are joined again: directly between `>` and `<`,
/// after a `<br>` or before a block-level tag, with one space otherwise.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous: Option<String> = None;

    for raw_line in text.trim().lines() {
        let line = raw_line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            continue;
        }
        if let Some(prev) = &previous {
            let join_directly = (prev.ends_with('>') && line.starts_with('<'))
                || LINE_BREAK_END_RE.is_match(prev)
                || starts_with_block_tag(&line);
            if !join_directly {
                out.push(' ');
            }
        }
        out.push_str(&line);
        previous = Some(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_pre_block_is_trimmed() {
        let (text, table) = extract("<pre>\n  code\n</pre>");
        assert_eq!(text, r#"<blockdata type="pre" id="0" />"#);
        assert_eq!(table.get(0), Some("code"));
    }

    #[test]
    fn test_inline_code_is_not_trimmed() {
        let (text, table) = extract("a <tt> x </tt> b <code>y</code>");
        assert_eq!(
            text,
            r#"a <inlinedata type="pre" id="0" /> b <inlinedata type="pre" id="1" />"#
        );
        assert_eq!(table.get(0), Some(" x "));
        assert_eq!(table.get(1), Some("y"));
    }

    #[test]
    fn test_tags_match_case_insensitively_with_attributes() {
        let (text, table) = extract(r#"<PRE class="x">a</Pre>"#);
        assert_eq!(text, r#"<blockdata type="pre" id="0" />"#);
        assert_eq!(table.get(0), Some("a"));
    }

    #[test]
    fn test_non_greedy_regions() {
        let (text, table) = extract("<pre>a</pre>b<pre>c</pre>");
        assert_eq!(table.len(), 2);
        assert_eq!(
            text,
            r#"<blockdata type="pre" id="0" />b<blockdata type="pre" id="1" />"#
        );
    }

    #[test]
    fn test_pass_block_keeps_markers() {
        let (text, table) = extract("<p>x</p>\n{% sourcecode py %}\nimport this\n{% endsourcecode %}\n");
        assert_eq!(
            text,
            "<p>x</p>\n<blockdata type=\"pass\" id=\"0\" />\n"
        );
        assert_eq!(
            table.get(0),
            Some("{% sourcecode py %}\nimport this\n{% endsourcecode %}")
        );
    }

    #[test]
    fn test_mismatched_pass_block_names_do_not_match() {
        let input = "{% foo %} x {% endbar %}";
        let (text, table) = extract(input);
        assert_eq!(text, input);
        assert!(table.is_empty());
    }

    #[test]
    fn test_single_tag_markers_are_left_in_place() {
        let (text, table) =
            extract("{% url 'a' %}<tt>x</tt>{% csrf_token %}{% if y %}z{% endif %}");
        assert_eq!(
            text,
            r#"{% url 'a' %}<inlinedata type="pre" id="0" />{% csrf_token %}<blockdata type="pass" id="1" />"#
        );
        assert_eq!(table.get(0), Some("x"));
        assert_eq!(table.get(1), Some("{% if y %}z{% endif %}"));
    }

    #[test]
    fn test_close_marker_is_matched_by_name() {
        let (_, table) = extract("{% if %}a{% endfor %}b{% endif %}{% endif %}");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0), Some("{% if %}a{% endfor %}b{% endif %}"));
    }

    #[test]
    fn test_many_template_markers_between_regions() {
        let count = 5000;
        let html: String = (0..count)
            .map(|i| format!("<p>{{% url 'v{i}' %}} <tt>c{i}</tt></p>"))
            .collect();
        let (text, table) = extract(&html);
        assert_eq!(table.len(), count);
        assert_eq!(table.get(count - 1), Some(format!("c{}", count - 1).as_str()));
        assert_eq!(text.matches("{% url").count(), count);
        assert!(text.ends_with(&format!(
            r#"{{% url 'v{}' %}} <inlinedata type="pre" id="{}" /></p>"#,
            count - 1,
            count - 1
        )));
    }

    #[test]
    fn test_earliest_region_wins_and_is_opaque() {
        let (text, table) = extract("<pre><tt>a</tt></pre><tt>b</tt>");
        assert_eq!(table.get(0), Some("<tt>a</tt>"));
        assert_eq!(table.get(1), Some("b"));
        assert_eq!(
            text,
            r#"<blockdata type="pre" id="0" /><inlinedata type="pre" id="1" />"#
        );
    }

    #[test]
    fn test_pass_block_swallows_inner_pre() {
        let (_, table) = extract("{% raw %}<pre>a</pre>{% endraw %}");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0), Some("{% raw %}<pre>a</pre>{% endraw %}"));
    }

    #[test]
    fn test_region_kind_markers() {
        assert_eq!(
            RegionKind::from_marker("blockdata", "pre"),
            Some(RegionKind::PreBlock)
        );
        assert_eq!(
            RegionKind::from_marker("blockdata", "pass"),
            Some(RegionKind::PassBlock)
        );
        assert_eq!(
            RegionKind::from_marker("inlinedata", "pre"),
            Some(RegionKind::InlineCode)
        );
        assert_eq!(RegionKind::from_marker("inlinedata", "pass"), None);
        assert!(RegionKind::is_placeholder_tag("inlinedata"));
        assert!(!RegionKind::is_placeholder_tag("pre"));
    }

    #[test]
    fn test_normalize_joins_tags_directly() {
        let html = "<ul>\n    <li>one</li>\n    <li>two</li>\n</ul>";
        assert_eq!(normalize_whitespace(html), "<ul><li>one</li><li>two</li></ul>");
    }

    #[test]
    fn test_normalize_keeps_a_space_between_words() {
        let html = "<p>first\n   second   line</p>";
        assert_eq!(normalize_whitespace(html), "<p>first second line</p>");
    }

    #[test]
    fn test_normalize_after_br_and_before_block() {
        assert_eq!(normalize_whitespace("a<br />\nb"), "a<br />b");
        assert_eq!(normalize_whitespace("text\n<p>para</p>"), "text<p>para</p>");
        assert_eq!(
            normalize_whitespace("text\n<strong>x</strong>"),
            "text <strong>x</strong>"
        );
    }

    #[test]
    fn test_normalize_drops_blank_lines() {
        assert_eq!(normalize_whitespace("\n\n  a  \n\n\n  b\n"), "a b");
        assert_eq!(normalize_whitespace("   \n  "), "");
    }

    /// Characters and fragments that exercise every matcher.
    const FRAGMENTS: &[&str] = &[
        "<pre>", "</pre>", "<tt>", "</tt>", "<code>", "</code>", "{% raw %}",
        "{% endraw %}", "{% end %}", "text", " ", "\n", "<p>", "&amp;",
    ];

    fn build(picks: &[u8]) -> String {
        picks
            .iter()
            .map(|&i| FRAGMENTS[usize::from(i) % FRAGMENTS.len()])
            .collect()
    }

    #[quickcheck]
    fn prop_reextraction_finds_nothing(picks: Vec<u8>) -> bool {
        let (once, _) = extract(&build(&picks));
        let (twice, table) = extract(&once);
        twice == once && table.is_empty()
    }

    #[quickcheck]
    fn prop_normalize_is_idempotent(picks: Vec<u8>) -> bool {
        let once = normalize_whitespace(&build(&picks));
        normalize_whitespace(&once) == once
    }
}
