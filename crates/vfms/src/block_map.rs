use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use tracing::Level as LogLevel;

use crate::config_constants::{BLOCK_MAP_COLUMNS, BLOCK_MAP_ROWS};


/// The record stored in an occupied cell of a [`BlockMap`], identifying which directory and file
/// claimed the cell, and in which row ("block") it lies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribution {
    /// The name of the directory that was current when the cell was claimed.
    pub directory: String,
    pub file:      String,
    /// The one-based row index of the cell.
    pub block:     usize,
    /// The character whose write claimed this cell.
    pub character: char,
}

impl Display for Attribution {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}, {}, block {}", self.directory, self.file, self.block)
    }
}

/// A fixed grid of allocation cells, simulating a storage medium of constrained capacity.
///
/// Each cell is either free or holds an [`Attribution`]. Cells are claimed in row-major,
/// first-fit order, and are never released: the map models how much capacity has been consumed,
/// not where any file's content currently lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMap {
    rows:    usize,
    columns: usize,
    /// Row-major; always has exactly `rows * columns` cells.
    cells:   Vec<Option<Attribution>>,
}

impl BlockMap {
    /// Create a map of `rows * columns` free cells.
    #[must_use]
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![None; rows * columns],
        }
    }

    /// Rebuild a map from row-major cells, as recorded in a snapshot.
    ///
    /// Returns `None` if the number of cells is not `rows * columns`.
    #[must_use]
    pub(crate) fn from_cells(
        rows:    usize,
        columns: usize,
        cells:   Vec<Option<Attribution>>,
    ) -> Option<Self> {
        (rows.checked_mul(columns) == Some(cells.len()))
            .then_some(Self { rows, columns, cells })
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn columns(&self) -> usize {
        self.columns
    }

    /// The total number of cells, free or occupied.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    /// The number of free cells, counted by scanning the whole grid.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Every cell, in row-major order.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Option<Attribution>] {
        &self.cells
    }

    /// Iterate over the rows of the grid, top to bottom.
    pub fn render(&self) -> impl Iterator<Item = &[Option<Attribution>]> {
        // `chunks` panics on a chunk size of zero; with zero columns there are no cells anyway.
        self.cells.chunks(self.columns.max(1))
    }

    /// Claim one free cell for each character of `data`, in row-major first-fit order,
    /// attributing each to `directory` and `file`. Returns the number of cells claimed.
    ///
    /// If the map fills up before every character is placed, allocation stops silently; checking
    /// capacity beforehand is the caller's job.
    ///
    /// The scan starts from the first row on every call, and nothing is released, so calling this
    /// repeatedly for the same file keeps claiming more cells.
    pub fn allocate_for_write(&mut self, directory: &str, file: &str, data: &str) -> usize {
        let mut characters = data.chars();
        let mut claimed = 0;

        let free_cells = self.cells
            .chunks_mut(self.columns.max(1))
            .enumerate()
            .flat_map(|(row_idx, row)| {
                row.iter_mut()
                    .filter(|cell| cell.is_none())
                    .map(move |cell| (row_idx, cell))
            });

        for (row_idx, cell) in free_cells {
            let Some(character) = characters.next() else {
                return claimed;
            };

            *cell = Some(Attribution {
                directory: directory.to_owned(),
                file:      file.to_owned(),
                block:     row_idx + 1,
                character,
            });
            claimed += 1;
        }

        let unplaced = characters.count();
        if unplaced > 0 {
            tracing::event!(
                LogLevel::DEBUG,
                "block map full: {unplaced} character(s) of `{file}` in `{directory}` not placed",
            );
        }
        claimed
    }
}

impl Default for BlockMap {
    #[inline]
    fn default() -> Self {
        Self::new(BLOCK_MAP_ROWS, BLOCK_MAP_COLUMNS)
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    #[test]
    fn default_grid() {
        let map = BlockMap::default();
        assert_eq!(map.capacity(), 64);
        assert_eq!(map.free_count(), 64);
        assert_eq!(map.render().count(), 8);
        assert!(map.render().all(|row| row.len() == 8));
    }

    #[test]
    fn row_major_first_fit() {
        let mut map = BlockMap::new(2, 3);
        assert_eq!(map.allocate_for_write("root", "a", "abcd"), 4);
        assert_eq!(map.free_count(), 2);

        let rows = map.render().collect::<Vec<_>>();
        assert!(rows[0].iter().all(Option::is_some));
        assert_eq!(rows[1][0].as_ref().unwrap().character, 'd');
        assert_eq!(rows[1][0].as_ref().unwrap().block, 2);
        assert!(rows[1][1].is_none());

        assert_eq!(rows[0][0].as_ref().unwrap().to_string(), "root, a, block 1");
    }

    #[test]
    fn stops_silently_when_full() {
        let mut map = BlockMap::new(1, 3);
        assert_eq!(map.allocate_for_write("root", "a", "abcdef"), 3);
        assert_eq!(map.free_count(), 0);
        assert_eq!(map.allocate_for_write("root", "a", "g"), 0);
    }

    #[test]
    fn repeated_calls_accumulate() {
        let mut map = BlockMap::new(4, 4);
        map.allocate_for_write("root", "a", "hi");
        map.allocate_for_write("root", "a", "hi!");
        assert_eq!(map.free_count(), 16 - 5);

        let owners = map.cells()
            .iter()
            .flatten()
            .filter(|attribution| attribution.file == "a")
            .count();
        assert_eq!(owners, 5);
    }

    #[test]
    fn from_cells_checks_dimensions() {
        assert!(BlockMap::from_cells(2, 2, vec![None; 4]).is_some());
        assert!(BlockMap::from_cells(2, 2, vec![None; 3]).is_none());
    }

    #[test]
    fn zero_columns_has_no_rows() {
        let mut map = BlockMap::new(3, 0);
        assert_eq!(map.capacity(), 0);
        assert_eq!(map.render().count(), 0);
        assert_eq!(map.allocate_for_write("root", "a", "x"), 0);
    }
}
