use std::fmt;
use std::str::FromStr;

use super::types::GridCell;

/// Last addressable column (`XFD`), zero-based.
pub const MAX_COLUMN: u32 = 16_383;
/// Last addressable row, one-based.
pub const MAX_ROW: u32 = 1_048_576;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CellRefError {
    #[error("invalid cell reference '{0}': expected letters followed by a row number (e.g. 'G6', 'AA1')")]
    Malformed(String),
    #[error("cell reference '{0}' is outside the sheet (max column XFD, max row 1048576)")]
    OutOfRange(String),
}

/// Sheet column name for a zero-based column index: 0 -> `A`, 25 -> `Z`, 26 -> `AA`.
pub fn column_name(column: u32) -> String {
    let mut n = column + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Zero-based column index for a column name, case-insensitive.
pub fn column_index(name: &str) -> Option<u32> {
    if name.is_empty() || name.len() > 3 {
        return None;
    }
    let mut n: u32 = 0;
    for ch in name.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        n = n * 26 + digit;
    }
    Some(n - 1)
}

/// Parse an A1-style reference such as `G6`.
pub fn parse_cell(reference: &str) -> Result<GridCell, CellRefError> {
    let trimmed = reference.trim();
    let split = trimmed
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| CellRefError::Malformed(reference.to_string()))?;
    let (letters, digits) = trimmed.split_at(split);

    if letters.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CellRefError::Malformed(reference.to_string()));
    }

    let column =
        column_index(letters).ok_or_else(|| CellRefError::OutOfRange(reference.to_string()))?;
    let row: u32 = digits
        .parse()
        .map_err(|_| CellRefError::OutOfRange(reference.to_string()))?;

    if column > MAX_COLUMN || row == 0 || row > MAX_ROW {
        return Err(CellRefError::OutOfRange(reference.to_string()));
    }
    Ok(GridCell { column, row })
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.column), self.row)
    }
}

impl FromStr for GridCell {
    type Err = CellRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cell(s)
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn single_letter_columns() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(6), "G");
        assert_eq!(column_name(25), "Z");
    }

    #[test]
    fn multi_letter_columns() {
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
        assert_eq!(column_name(MAX_COLUMN), "XFD");
    }

    #[test]
    fn column_index_inverts_column_name() {
        for column in [0, 6, 25, 26, 51, 700, 701, 702, MAX_COLUMN] {
            assert_eq!(column_index(&column_name(column)), Some(column));
        }
    }

    #[test]
    fn parse_simple_reference() {
        assert_eq!(parse_cell("G6").unwrap(), GridCell::new(6, 6));
        assert_eq!(parse_cell("a1").unwrap(), GridCell::new(0, 1));
        assert_eq!(parse_cell(" AA12 ").unwrap(), GridCell::new(26, 12));
    }

    #[test]
    fn display_uses_sheet_names() {
        assert_eq!(GridCell::new(6, 6).to_string(), "G6");
        assert_eq!(GridCell::new(27, 3).to_string(), "AB3");
    }

    #[test]
    fn rejects_malformed_references() {
        for bad in ["", "6", "G", "G6X", "6G", "G-1", "G 6"] {
            assert!(parse_cell(bad).is_err(), "'{bad}' should not parse");
        }
    }

    #[test]
    fn rejects_out_of_range_references() {
        assert!(matches!(parse_cell("A0"), Err(CellRefError::OutOfRange(_))));
        assert!(matches!(parse_cell("XFE1"), Err(CellRefError::OutOfRange(_))));
        assert!(matches!(parse_cell("ABCD1"), Err(CellRefError::OutOfRange(_))));
        assert!(matches!(
            parse_cell("A1048577"),
            Err(CellRefError::OutOfRange(_))
        ));
    }
}
