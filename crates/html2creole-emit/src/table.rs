//! Column alignment for Creole tables.

/// Split a table row on `|`, ignoring pipes inside `[[...]]` and `{{...}}`.
///
/// A `[[` or `{{` without its closing pair on the same line is plain text.
/// The text before the first pipe and after the last one are returned as
/// cells too, so `"|= a | b|"` yields `["", "= a ", " b", ""]`.
#[must_use]
pub fn split_cells(line: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut start = 0;
    let mut pos = 0;

    while let Some(offset) = line[pos..].find(['|', '[', '{']) {
        let at = pos + offset;
        let rest = &line[at..];
        let close = if rest.starts_with("[[") {
            Some("]]")
        } else if rest.starts_with("{{") {
            Some("}}")
        } else {
            None
        };

        if let Some(close) = close {
            pos = rest[2..]
                .find(close)
                .map_or(at + 2, |inner| at + 2 + inner + close.len());
            continue;
        }
        if rest.starts_with('|') {
            cells.push(&line[start..at]);
            start = at + 1;
        }
        pos = at + 1;
    }
    cells.push(&line[start..]);
    cells
}

/// Pad every column to the width of its widest cell plus one.
///
/// Cells are right-trimmed before measuring, widths are counted in
/// characters, and every row is trimmed afterwards, so aligning an aligned
/// table changes nothing.
///
/// ```
/// use html2creole_emit::align_table;
///
/// let table = "|= Name|= Value|\n| a| longer value|\n";
/// assert_eq!(
///     align_table(table),
///     "|= Name |= Value       |\n| a     | longer value |"
/// );
/// ```
#[must_use]
pub fn align_table(text: &str) -> String {
    let rows: Vec<Vec<&str>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_cells(line).into_iter().map(str::trim_end).collect())
        .collect();

    let mut widths: Vec<usize> = Vec::new();
    for row in &rows {
        for (column, cell) in row.iter().enumerate() {
            let width = cell.chars().count();
            match widths.get_mut(column) {
                Some(max) => *max = (*max).max(width),
                None => widths.push(width),
            }
        }
    }

    rows.iter()
        .map(|row| {
            let padded: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<pad$}", pad = width + 1))
                .collect();
            padded.join("|").trim().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_split_cells_keeps_link_and_image_pipes() {
        assert_eq!(
            split_cells("| [[a|b]] | {{c.png|d}} |"),
            vec!["", " [[a|b]] ", " {{c.png|d}} ", ""]
        );
    }

    #[test]
    fn test_split_cells_with_unclosed_brackets() {
        assert_eq!(split_cells("| [[x | b|"), vec!["", " [[x ", " b", ""]);
        assert_eq!(split_cells("| {{x| [[y]] |"), vec!["", " {{x", " [[y]] ", ""]);
    }

    #[test]
    fn test_align_with_unclosed_link() {
        let table = "| a| [[x|\n| bb| y|\n";
        assert_eq!(align_table(table), "| a  | [[x |\n| bb | y   |");
    }

    #[test]
    fn test_align_header_and_body() {
        let table = "|= a |= b|\n| 1| 22222|\n";
        assert_eq!(align_table(table), "|= a |= b    |\n| 1  | 22222 |");
    }

    #[test]
    fn test_align_counts_characters() {
        let table = "| äöü| x|\n| abc| y|\n";
        assert_eq!(align_table(table), "| äöü | x |\n| abc | y |");
    }

    #[test]
    fn test_align_ragged_rows() {
        let table = "| a|\n| b| c|\n";
        assert_eq!(align_table(table), "| a |\n| b | c |");
    }

    /// Build a table from arbitrary cell text, keeping pipes and newlines out
    /// of the cells.
    fn build_table(rows: &[Vec<String>]) -> String {
        let mut out = String::new();
        for row in rows {
            for cell in row {
                let clean: String = cell
                    .chars()
                    .filter(|c| !matches!(c, '|' | '\n' | '\r' | '[' | ']' | '{' | '}'))
                    .collect();
                out.push_str("| ");
                out.push_str(clean.trim());
            }
            out.push_str("|\n");
        }
        out
    }

    #[quickcheck]
    fn prop_alignment_is_fixed_point(rows: Vec<Vec<String>>) -> bool {
        let once = align_table(&build_table(&rows));
        align_table(&once) == once
    }

    #[quickcheck]
    fn prop_column_width_is_max_plus_one(rows: Vec<Vec<String>>) -> bool {
        let table = build_table(&rows);
        let aligned = align_table(&table);
        let lines: Vec<&str> = aligned.lines().collect();
        let Some(first) = lines.first() else {
            return true;
        };
        let first_cells = split_cells(first);
        if first_cells.len() < 3 {
            return true;
        }
        // Column 1 is the first real cell; it is never the last column.
        let max = table
            .lines()
            .filter_map(|line| split_cells(line).get(1).map(|cell| cell.trim_end().chars().count()))
            .max()
            .unwrap_or(0);
        first_cells[1].chars().count() == max + 1
    }
}
