//! Variable allocation.
//!
//! Every boolean unknown of the encoding gets a dense DIMACS index. The
//! categories are laid out as contiguous blocks in a fixed order:
//!
//! | category               | size        | index tuple         |
//! |------------------------|-------------|---------------------|
//! | `false_positive`       | `n·m`       | `(i, j)`            |
//! | `false_negative`       | `n·m`       | `(i, j)`            |
//! | `is_two`               | `n·m`       | `(i, j)`            |
//! | `acquired`             | `n·m`       | `(i, j)`            |
//! | `row_pair_equal_at_col`| `C(n,2)·m`  | `(pair(i, i'), j)`  |
//! | `col_pair_equal_at_row`| `C(m,2)·n`  | `(pair(j, j'), i)`  |
//! | `row_assign`           | `n·s`       | `(i, c)`            |
//! | `col_assign`           | `m·t`       | `(j, c)`            |
//!
//! Within a block, tuples are enumerated row-major. The resulting
//! [`VariableMap`] is the only contract between encoding and decoding, so it
//! is persisted next to the formula and reloaded verbatim.

use dollosat_base::utils::{pair_count, pair_index};
use dollosat_base::{BoolVar, Error, Result, VarId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// Problem dimensions a map is allocated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Observed rows (`n`).
    pub rows: usize,
    /// Observed columns (`m`).
    pub cols: usize,
    /// Row clusters (`s`).
    pub row_clusters: usize,
    /// Column clusters (`t`).
    pub col_clusters: usize,
}

/// A named block of variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    FalsePositive,
    FalseNegative,
    IsTwo,
    Acquired,
    RowPairEqualAtCol,
    ColPairEqualAtRow,
    RowAssign,
    ColAssign,
}

impl Category {
    /// All categories in allocation order.
    pub const ALL: [Category; 8] = [
        Category::FalsePositive,
        Category::FalseNegative,
        Category::IsTwo,
        Category::Acquired,
        Category::RowPairEqualAtCol,
        Category::ColPairEqualAtRow,
        Category::RowAssign,
        Category::ColAssign,
    ];

    /// Number of variables in this category for the given dimensions.
    pub fn block_len(self, dims: &Dimensions) -> usize {
        let cells = dims.rows * dims.cols;
        match self {
            Self::FalsePositive | Self::FalseNegative | Self::IsTwo | Self::Acquired => cells,
            Self::RowPairEqualAtCol => pair_count(dims.rows) * dims.cols,
            Self::ColPairEqualAtRow => pair_count(dims.cols) * dims.rows,
            Self::RowAssign => dims.rows * dims.row_clusters,
            Self::ColAssign => dims.cols * dims.col_clusters,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::FalsePositive => "false_positive",
            Self::FalseNegative => "false_negative",
            Self::IsTwo => "is_two",
            Self::Acquired => "acquired",
            Self::RowPairEqualAtCol => "row_pair_equal_at_col",
            Self::ColPairEqualAtRow => "col_pair_equal_at_row",
            Self::RowAssign => "row_assign",
            Self::ColAssign => "col_assign",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The contiguous index block of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRange {
    pub category: Category,
    /// First DIMACS index of the block.
    pub first: VarId,
    /// Number of variables in the block (may be zero).
    pub len: usize,
}

impl CategoryRange {
    /// One past the last index of the block.
    pub fn end(&self) -> VarId {
        self.first + self.len as VarId
    }

    /// Whether the block contains the variable.
    pub fn contains(&self, var: VarId) -> bool {
        var >= self.first && var < self.end()
    }
}

/// Deterministic mapping from semantic unknowns to DIMACS variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableMap {
    dimensions: Dimensions,
    num_vars: usize,
    ranges: Vec<CategoryRange>,
}

impl VariableMap {
    /// Allocates all categories for the given dimensions.
    pub fn allocate(dimensions: Dimensions) -> Self {
        let mut next: VarId = 1;
        let ranges = Category::ALL
            .iter()
            .map(|&category| {
                let len = category.block_len(&dimensions);
                let range = CategoryRange {
                    category,
                    first: next,
                    len,
                };
                next += len as VarId;
                range
            })
            .collect();

        Self {
            dimensions,
            num_vars: (next - 1) as usize,
            ranges,
        }
    }

    /// The dimensions this map was allocated for.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Total number of variables (the last index of `col_assign`).
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    /// The category blocks, in allocation order.
    pub fn ranges(&self) -> &[CategoryRange] {
        &self.ranges
    }

    /// The block of one category.
    pub fn range(&self, category: Category) -> &CategoryRange {
        &self.ranges[category as usize]
    }

    /// The category a variable belongs to, if any.
    pub fn category_of(&self, var: VarId) -> Option<Category> {
        self.ranges
            .iter()
            .find(|r| r.contains(var))
            .map(|r| r.category)
    }

    fn var(&self, category: Category, offset: usize) -> BoolVar {
        let range = self.range(category);
        debug_assert!(offset < range.len, "{category} offset {offset} out of range");
        BoolVar::new(range.first + offset as VarId)
    }

    fn cell(&self, category: Category, i: usize, j: usize) -> BoolVar {
        debug_assert!(i < self.dimensions.rows && j < self.dimensions.cols);
        self.var(category, i * self.dimensions.cols + j)
    }

    /// Observed 1 at `(i, j)` is wrong.
    pub fn false_positive(&self, i: usize, j: usize) -> BoolVar {
        self.cell(Category::FalsePositive, i, j)
    }

    /// Observed 0 at `(i, j)` is wrong.
    pub fn false_negative(&self, i: usize, j: usize) -> BoolVar {
        self.cell(Category::FalseNegative, i, j)
    }

    /// Corrected state at `(i, j)` is lost.
    pub fn is_two(&self, i: usize, j: usize) -> BoolVar {
        self.cell(Category::IsTwo, i, j)
    }

    /// Corrected state at `(i, j)` is present or lost.
    pub fn acquired(&self, i: usize, j: usize) -> BoolVar {
        self.cell(Category::Acquired, i, j)
    }

    /// Rows `a` and `b` agree at column `j`. The pair may be given in either order.
    pub fn row_pair_equal(&self, a: usize, b: usize, j: usize) -> BoolVar {
        let pair = pair_index(a, b, self.dimensions.rows);
        self.var(Category::RowPairEqualAtCol, pair * self.dimensions.cols + j)
    }

    /// Columns `a` and `b` agree at row `i`. The pair may be given in either order.
    pub fn col_pair_equal(&self, a: usize, b: usize, i: usize) -> BoolVar {
        let pair = pair_index(a, b, self.dimensions.cols);
        self.var(Category::ColPairEqualAtRow, pair * self.dimensions.rows + i)
    }

    /// Row `i` belongs to row cluster `c`.
    pub fn row_assign(&self, i: usize, c: usize) -> BoolVar {
        debug_assert!(c < self.dimensions.row_clusters);
        self.var(Category::RowAssign, i * self.dimensions.row_clusters + c)
    }

    /// Column `j` belongs to column cluster `c`.
    pub fn col_assign(&self, j: usize, c: usize) -> BoolVar {
        debug_assert!(c < self.dimensions.col_clusters);
        self.var(Category::ColAssign, j * self.dimensions.col_clusters + c)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Serializes the map as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Loads a map and checks that it is structurally sound.
    pub fn from_json(json: &str) -> Result<Self> {
        let map: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        map.validate()?;
        Ok(map)
    }

    /// Writes the pretty JSON form, with a trailing newline.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(self.to_json()?.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a map written by [`VariableMap::write_to`].
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<()> {
        if self.ranges.len() != Category::ALL.len() {
            return Err(Error::AllocatorMappingMismatch(format!(
                "expected {} categories, found {}",
                Category::ALL.len(),
                self.ranges.len()
            )));
        }

        let mut next: VarId = 1;
        for (range, &expected) in self.ranges.iter().zip(Category::ALL.iter()) {
            if range.category != expected {
                return Err(Error::AllocatorMappingMismatch(format!(
                    "category {} found where {} was expected",
                    range.category, expected
                )));
            }
            if range.first != next {
                return Err(Error::AllocatorMappingMismatch(format!(
                    "{} starts at {}, expected {}",
                    range.category, range.first, next
                )));
            }
            let len = expected.block_len(&self.dimensions);
            if range.len != len {
                return Err(Error::AllocatorMappingMismatch(format!(
                    "{} holds {} variables, dimensions imply {}",
                    range.category, range.len, len
                )));
            }
            next = range.end();
        }

        if self.num_vars as VarId != next - 1 {
            return Err(Error::AllocatorMappingMismatch(format!(
                "num_vars is {}, blocks end at {}",
                self.num_vars,
                next - 1
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn dims(rows: usize, cols: usize, row_clusters: usize, col_clusters: usize) -> Dimensions {
        Dimensions {
            rows,
            cols,
            row_clusters,
            col_clusters,
        }
    }

    fn all_lookups(map: &VariableMap) -> Vec<VarId> {
        let d = map.dimensions();
        let mut ids = Vec::new();
        for i in 0..d.rows {
            for j in 0..d.cols {
                ids.push(map.false_positive(i, j).id());
                ids.push(map.false_negative(i, j).id());
                ids.push(map.is_two(i, j).id());
                ids.push(map.acquired(i, j).id());
            }
        }
        for a in 0..d.rows {
            for b in a + 1..d.rows {
                for j in 0..d.cols {
                    ids.push(map.row_pair_equal(a, b, j).id());
                }
            }
        }
        for a in 0..d.cols {
            for b in a + 1..d.cols {
                for i in 0..d.rows {
                    ids.push(map.col_pair_equal(a, b, i).id());
                }
            }
        }
        for i in 0..d.rows {
            for c in 0..d.row_clusters {
                ids.push(map.row_assign(i, c).id());
            }
        }
        for j in 0..d.cols {
            for c in 0..d.col_clusters {
                ids.push(map.col_assign(j, c).id());
            }
        }
        ids
    }

    #[test]
    fn test_block_layout() {
        let map = VariableMap::allocate(dims(4, 3, 2, 2));
        let lens: Vec<usize> = map.ranges().iter().map(|r| r.len).collect();
        assert_eq!(lens, vec![12, 12, 12, 12, 18, 12, 8, 6]);
        assert_eq!(map.num_vars(), 92);
        assert_eq!(map.false_positive(0, 0).id(), 1);
        assert_eq!(map.false_negative(0, 0).id(), 13);
        assert_eq!(map.col_assign(2, 1).id(), 92);
    }

    #[test]
    fn test_lookups_unique_and_contiguous() {
        let map = VariableMap::allocate(dims(4, 3, 3, 2));
        let ids = all_lookups(&map);
        assert_eq!(ids.len(), map.num_vars());
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(*ids.iter().min().unwrap(), 1);
        assert_eq!(*ids.iter().max().unwrap(), map.num_vars() as VarId);
    }

    #[test]
    fn test_pair_order_normalized() {
        let map = VariableMap::allocate(dims(4, 4, 2, 2));
        assert_eq!(map.row_pair_equal(1, 3, 2), map.row_pair_equal(3, 1, 2));
        assert_eq!(map.col_pair_equal(0, 2, 1), map.col_pair_equal(2, 0, 1));
    }

    #[test]
    fn test_single_row_has_no_pairs() {
        let map = VariableMap::allocate(dims(1, 3, 1, 2));
        assert_eq!(map.range(Category::RowPairEqualAtCol).len, 0);
        assert_eq!(
            map.range(Category::RowPairEqualAtCol).first,
            map.range(Category::ColPairEqualAtRow).first
        );
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let a = VariableMap::allocate(dims(5, 4, 2, 3));
        let b = VariableMap::allocate(dims(5, 4, 2, 3));
        assert_eq!(a, b);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_json_round_trip_is_byte_identical() {
        let map = VariableMap::allocate(dims(3, 3, 2, 2));
        let json = map.to_json().unwrap();
        let loaded = VariableMap::from_json(&json).unwrap();
        assert_eq!(loaded, map);
        assert_eq!(loaded.to_json().unwrap(), json);

        let mut buf = Vec::new();
        map.write_to(&mut buf).unwrap();
        assert_eq!(VariableMap::read_from(buf.as_slice()).unwrap(), map);
    }

    #[test]
    fn test_tampered_length_rejected() {
        let mut map = VariableMap::allocate(dims(3, 3, 2, 2));
        map.dimensions.row_clusters = 3;
        let json = serde_json::to_string_pretty(&map).unwrap();
        let err = VariableMap::from_json(&json).unwrap_err();
        assert!(matches!(err, Error::AllocatorMappingMismatch(_)));
    }

    #[test]
    fn test_reordered_categories_rejected() {
        let mut map = VariableMap::allocate(dims(3, 3, 2, 2));
        map.ranges.swap(0, 1);
        let json = serde_json::to_string_pretty(&map).unwrap();
        assert!(matches!(
            VariableMap::from_json(&json),
            Err(Error::AllocatorMappingMismatch(_))
        ));
    }

    #[test]
    fn test_garbage_json_is_serialization_error() {
        assert!(matches!(
            VariableMap::from_json("{ not json"),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_category_of() {
        let map = VariableMap::allocate(dims(2, 2, 1, 1));
        assert_eq!(map.category_of(1), Some(Category::FalsePositive));
        assert_eq!(map.category_of(map.num_vars() as VarId), Some(Category::ColAssign));
        assert_eq!(map.category_of(map.num_vars() as VarId + 1), None);
    }
}
