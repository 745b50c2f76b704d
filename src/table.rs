use std::borrow::Cow;
use std::fmt::Write as _;

/// Cells longer than this are shortened with an ellipsis.
pub const MAX_CELL_WIDTH: usize = 40;

pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let cells = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip_cell(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers
        .iter()
        .map(|header| header.chars().count().max(3))
        .collect::<Vec<_>>();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers.iter().copied(), &widths));
    let rule = widths.iter().map(|width| "-".repeat(*width)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(rule.iter().map(String::as_str), &widths));
    for row in &cells {
        let _ = writeln!(output, "{}", format_row(row.iter().map(|cell| &**cell), &widths));
    }
    output
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_row<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = values
        .zip(widths.iter().copied())
        .map(|(value, width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn clip_cell(value: &str) -> Cow<'_, str> {
    let flattened = if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    };
    if flattened.chars().count() <= MAX_CELL_WIDTH {
        return flattened;
    }
    let mut clipped = flattened
        .chars()
        .take(MAX_CELL_WIDTH - 3)
        .collect::<String>();
    clipped.push_str("...");
    Cow::Owned(clipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_columns_and_trims_trailing_space() {
        let rendered = render_table(
            &["#", "Name"],
            &[
                vec!["0".to_string(), "FirstName".to_string()],
                vec!["1".to_string(), "DOB".to_string()],
            ],
        );
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "#    Name");
        assert_eq!(lines[1], "---  ---------");
        assert_eq!(lines[2], "0    FirstName");
        assert_eq!(lines[3], "1    DOB");
    }

    #[test]
    fn long_and_multiline_cells_are_flattened() {
        let long = "x".repeat(MAX_CELL_WIDTH + 10);
        let rendered = render_table(&["v"], &[vec![long], vec!["a\nb".to_string()]]);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[2].chars().count(), MAX_CELL_WIDTH);
        assert!(lines[2].ends_with("..."));
        assert_eq!(lines[3], "a b");
    }
}
