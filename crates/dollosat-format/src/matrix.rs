//! Input matrix format.
//!
//! ```text
//! 5 # cells
//! 5 # mutations
//! 0 1 0 0 0
//! 0 0 1 0 1
//! 0 0 0 0 0
//! 0 0 0 0 0
//! 1 0 0 1 0
//! ```
//!
//! The first token of each of the two header lines is the row and column
//! count. Blank lines and lines starting with `#` are ignored everywhere.

use dollosat_base::{BitMatrix, Error, Result};
use std::fs;
use std::path::Path;

/// Reads a matrix file.
pub fn read_matrix(path: &Path) -> Result<BitMatrix> {
    let content = fs::read_to_string(path)?;
    let matrix = parse_matrix(&content)
        .map_err(|e| Error::MalformedInput(format!("{}: {e}", path.display())))?;
    tracing::debug!(
        "Loaded {}x{} matrix from {}",
        matrix.rows(),
        matrix.cols(),
        path.display()
    );
    Ok(matrix)
}

/// Parses a matrix from text.
pub fn parse_matrix(content: &str) -> Result<BitMatrix> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    let rows = header_value(lines.next(), "row count")?;
    let cols = header_value(lines.next(), "column count")?;

    rows.checked_mul(cols).ok_or_else(|| {
        Error::MalformedInput(format!("{rows}x{cols} matrix is too large"))
    })?;

    let mut bits = Vec::new();
    let mut seen_rows = 0;
    for (line_no, line) in lines {
        if seen_rows == rows {
            return Err(Error::MalformedInput(format!(
                "line {line_no}: more than the {rows} declared rows"
            )));
        }
        let before = bits.len();
        for token in line.split_whitespace() {
            match token {
                "0" => bits.push(false),
                "1" => bits.push(true),
                other => {
                    return Err(Error::MalformedInput(format!(
                        "line {line_no}: non-binary value '{other}'"
                    )))
                }
            }
        }
        if bits.len() - before != cols {
            return Err(Error::MalformedInput(format!(
                "line {line_no}: expected {cols} values, found {}",
                bits.len() - before
            )));
        }
        seen_rows += 1;
    }
    if seen_rows != rows {
        return Err(Error::MalformedInput(format!(
            "expected {rows} rows, found {seen_rows}"
        )));
    }

    BitMatrix::new(rows, cols, bits)
}

fn header_value(line: Option<(usize, &str)>, what: &str) -> Result<usize> {
    let (line_no, line) =
        line.ok_or_else(|| Error::MalformedInput(format!("missing {what} header line")))?;
    let token = line.split_whitespace().next().unwrap_or_default();
    token.parse().map_err(|_| {
        Error::MalformedInput(format!("line {line_no}: invalid {what} '{token}'"))
    })
}
