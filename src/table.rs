/// Group cells into rows of `column_size`, first row being the header.
/// A short final row is padded with empty cells.
pub fn group_rows(cells: Vec<String>, column_size: usize) -> Vec<Vec<String>> {
    if column_size == 0 {
        return Vec::new();
    }
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (i, cell) in cells.into_iter().enumerate() {
        let row = i / column_size;
        if rows.len() <= row {
            rows.push(Vec::with_capacity(column_size));
        }
        rows[row].push(cell);
    }
    if let Some(last) = rows.last_mut() {
        last.resize(column_size, String::new());
    }
    rows
}

/// Number of leading cells that fit the declared geometry; cells past
/// `row_size * column_size` are dropped. A zero `row_size` means undeclared.
pub fn visible_cells(cell_count: usize, column_size: usize, row_size: usize) -> usize {
    if column_size == 0 {
        0
    } else if row_size == 0 {
        cell_count
    } else {
        cell_count.min(row_size.saturating_mul(column_size))
    }
}

/// Format rows as a pipe table with padded columns.
pub fn format_table(rows: &[Vec<String>]) -> String {
    let Some(header) = rows.first() else {
        return String::new();
    };
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.replace('|', "\\|")).collect())
        .collect();

    let mut widths = vec![0; header.len()];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        out.push('|');
        for (cell, width) in row.iter().zip(&widths) {
            out.push(' ');
            out.push_str(cell);
            for _ in cell.chars().count()..*width {
                out.push(' ');
            }
            out.push_str(" |");
        }
        out.push('\n');

        if i == 0 {
            out.push('|');
            for width in &widths {
                out.push_str(&"-".repeat(width + 2));
                out.push('|');
            }
            out.push('\n');
        }
    }
    out
}
