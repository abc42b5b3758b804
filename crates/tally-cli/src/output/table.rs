/// Layout options for [`render_entity_table`].
#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    /// Total line width to shrink columns into, if known.
    pub max_width: Option<usize>,
    pub color: bool,
}

const MIN_COLUMN: usize = 6;
const GAP: &str = "  ";

/// Render an aligned table for string rows.
///
/// Numeric cells are right-aligned. Progress buckets, priorities and
/// objective statuses are colored when `options.color` is set.
#[must_use]
pub fn render_entity_table(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths = column_widths(headers, rows);
    if let Some(max_width) = options.max_width {
        shrink_to(&mut widths, headers, max_width);
    }

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| pad(&truncate(header, *width), *width, Align::Left))
        .collect::<Vec<_>>()
        .join(GAP);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(header_line.trim_end().to_string());
    lines.push("-".repeat(header_line.trim_end().chars().count()));

    for row in rows {
        let cells = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = truncate(row.get(index).map_or("-", String::as_str), *width);
                let align = if is_numeric(&cell) {
                    Align::Right
                } else {
                    Align::Left
                };
                let padded = pad(&cell, *width, align);
                if options.color {
                    colorize(&cell, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>();
        lines.push(cells.join(GAP).trim_end().to_string());
    }
    lines.join("\n")
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .max(MIN_COLUMN)
        })
        .collect()
}

/// Narrow the widest shrinkable column one step at a time until the table
/// fits, never below its header or [`MIN_COLUMN`].
fn shrink_to(widths: &mut [usize], headers: &[&str], max_width: usize) {
    let gaps = widths.len().saturating_sub(1) * GAP.len();
    while widths.iter().sum::<usize>() + gaps > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(index, width)| **width > headers[*index].chars().count().max(MIN_COLUMN))
            .max_by_key(|(_, width)| **width)
            .map(|(index, _)| index);
        let Some(index) = widest else {
            break;
        };
        widths[index] -= 1;
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{value:<width$}"),
        Align::Right => format!("{value:>width$}"),
    }
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.parse::<f64>().is_ok()
}

/// Wrap an already padded cell in an ANSI color picked from its content.
fn colorize(cell: &str, padded: String) -> String {
    let code = match cell {
        "completed" | "on_track" | "active" => "32",
        "behind" | "draft" | "high" => "33",
        "at_risk" | "urgent" => "31",
        "not_started" | "archived" => "2",
        _ => return padded,
    };
    format!("\u{1b}[{code}m{padded}\u{1b}[0m")
}

#[cfg(test)]
mod tests {
    use super::{TableOptions, render_entity_table};

    fn rows() -> Vec<Vec<String>> {
        vec![
            vec!["Reduce churn across all enterprise accounts".into(), "at_risk".into()],
            vec!["Signups".into(), "completed".into()],
        ]
    }

    #[test]
    fn shrinks_widest_column_to_fit() {
        let table = render_entity_table(
            &["name", "bucket"],
            &rows(),
            TableOptions {
                max_width: Some(30),
                color: false,
            },
        );
        assert!(table.lines().all(|line| line.chars().count() <= 30));
        assert!(table.contains('…'));
    }

    #[test]
    fn colors_only_known_words() {
        let table = render_entity_table(
            &["name", "bucket"],
            &rows(),
            TableOptions {
                max_width: None,
                color: true,
            },
        );
        assert!(table.contains("\u{1b}[31m"));
        assert!(table.contains("\u{1b}[32m"));
        assert!(!table.lines().next().unwrap_or_default().contains('\u{1b}'));
    }

    #[test]
    fn missing_cells_render_as_dash() {
        let table = render_entity_table(
            &["a", "b"],
            &[vec!["x".into()]],
            TableOptions {
                max_width: None,
                color: false,
            },
        );
        assert!(table.lines().nth(2).is_some_and(|line| line.ends_with('-')));
    }
}
