//! Allowed-losses file: one line of comma-separated column indices.

use dollosat_base::{AllowedLosses, Error, Result};
use std::fs;
use std::path::Path;

/// Reads the allowed losses for a matrix with `cols` columns.
///
/// No file means every column may be lost; an empty file means none may.
pub fn read_allowed_losses(path: Option<&Path>, cols: usize) -> Result<AllowedLosses> {
    match path {
        None => Ok(AllowedLosses::all(cols)),
        Some(path) => {
            let content = fs::read_to_string(path)?;
            parse_allowed_losses(&content, cols)
                .map_err(|e| Error::MalformedInput(format!("{}: {e}", path.display())))
        }
    }
}

/// Parses the first line of an allowed-losses file.
pub fn parse_allowed_losses(content: &str, cols: usize) -> Result<AllowedLosses> {
    let first = content.lines().next().unwrap_or_default().trim();
    if first.is_empty() {
        return Ok(AllowedLosses::none(cols));
    }
    let indices = first
        .split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<usize>().map_err(|_| {
                Error::MalformedInput(format!("invalid column index '{token}'"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    AllowedLosses::from_indices(cols, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let losses = parse_allowed_losses("0, 2,3\n", 5).unwrap();
        assert_eq!(losses.iter().collect::<Vec<_>>(), vec![0, 2, 3]);
    }

    #[test]
    fn test_empty_file_allows_nothing() {
        assert!(parse_allowed_losses("", 4).unwrap().is_empty());
    }

    #[test]
    fn test_no_file_allows_everything() {
        assert_eq!(read_allowed_losses(None, 4).unwrap().len(), 4);
    }

    #[test]
    fn test_out_of_range_index() {
        assert!(parse_allowed_losses("1,9", 4).is_err());
        assert!(parse_allowed_losses("a", 4).is_err());
    }
}
