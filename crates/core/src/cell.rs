//! Cell coordinates
//!
//! A [`Cell`] identifies one entry in a sparse table by its (column, row)
//! pair. Coordinates that hold no value behave as empty strings on read.

use serde::{Deserialize, Serialize};

/// A (column, row) coordinate identifying one table entry.
///
/// Cells are ordered row-major: row ascending, then column ascending within
/// a row. This is the order rows are streamed during an export, so the
/// ordering is part of the public contract, not an implementation detail.
///
/// # Examples
///
/// ```
/// use tabgrid_core::Cell;
///
/// let a = Cell::new(5, 0);
/// let b = Cell::new(0, 1);
/// assert!(a < b); // row 0 sorts before row 1 regardless of column
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Column index (x), zero-based
    pub column: u32,
    /// Row index (y), zero-based
    pub row: u32,
}

impl Cell {
    /// Create a cell coordinate from column and row indices.
    pub fn new(column: u32, row: u32) -> Self {
        Cell { column, row }
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Row-major: compare rows first, columns break ties.
        (self.row, self.column).cmp(&(other.row, other.column))
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_row_major_order() {
        let mut cells = vec![
            Cell::new(2, 1),
            Cell::new(0, 2),
            Cell::new(1, 0),
            Cell::new(0, 0),
            Cell::new(3, 1),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Cell::new(0, 0),
                Cell::new(1, 0),
                Cell::new(2, 1),
                Cell::new(3, 1),
                Cell::new(0, 2),
            ]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Cell::new(7, 3).to_string(), "(7, 3)");
    }

    #[test]
    fn test_serde_round_trip() {
        let cell = Cell::new(4, 9);
        let json = serde_json::to_string(&cell).unwrap();
        assert_eq!(serde_json::from_str::<Cell>(&json).unwrap(), cell);
    }

    proptest! {
        #[test]
        fn prop_order_is_total_and_row_major(
            a in (0u32..1000, 0u32..1000),
            b in (0u32..1000, 0u32..1000),
        ) {
            let x = Cell::new(a.0, a.1);
            let y = Cell::new(b.0, b.1);
            // Ordering agrees with comparing (row, column) tuples.
            prop_assert_eq!(x.cmp(&y), (a.1, a.0).cmp(&(b.1, b.0)));
        }
    }
}
