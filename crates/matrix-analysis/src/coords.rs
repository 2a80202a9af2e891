//! Block coordinate bookkeeping for annotating plots of the `L` matrix.

use serde::{Deserialize, Serialize};

/// Half-open extent `[start, start + len)` along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpan {
    pub start: usize,
    pub len: usize,
}

impl BlockSpan {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// One past the last index
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inclusive `[first, last]` pair, `None` for an empty span
    pub fn inclusive(&self) -> Option<(usize, usize)> {
        if self.is_empty() {
            None
        } else {
            Some((self.start, self.end() - 1))
        }
    }

    /// True if `self` lies entirely within `outer`
    pub fn is_within(&self, outer: &BlockSpan) -> bool {
        self.start >= outer.start && self.end() <= outer.end()
    }
}

/// Extent of one row-group of `L`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainBlock {
    pub rows: BlockSpan,
    pub cols: BlockSpan,
}

/// Extent of one sub-block inside a row-group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubBlock {
    /// Index of the parent row-group (0-based)
    pub parent: usize,
    pub rows: BlockSpan,
    pub cols: BlockSpan,
}

/// Coordinates of every row-group and sub-block of an assembled matrix.
///
/// `hlines` holds the cumulative heights of all row-groups but the last, and
/// `vlines` the cumulative widths of the column segments, both on the same
/// axis scale as the matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCoordinateMap {
    pub main_blocks: Vec<MainBlock>,
    pub sub_blocks: Vec<SubBlock>,
    pub hlines: Vec<usize>,
    pub vlines: Vec<usize>,
}

impl BlockCoordinateMap {
    /// Derive the map from the shapes of an assembly.
    ///
    /// `groups[g]` lists `(height, width)` of every sub-block of row-group `g`
    /// in column order; `segment_widths` are the logical column segments.
    pub fn from_shapes(groups: &[Vec<(usize, usize)>], segment_widths: &[usize]) -> Self {
        let mut map = Self::default();

        let mut row_start = 0;
        for (parent, sub_shapes) in groups.iter().enumerate() {
            let height = sub_shapes.first().map_or(0, |&(h, _)| h);
            let width: usize = sub_shapes.iter().map(|&(_, w)| w).sum();
            let rows = BlockSpan::new(row_start, height);

            map.main_blocks.push(MainBlock {
                rows,
                cols: BlockSpan::new(0, width),
            });

            let mut col_start = 0;
            for &(_, sub_width) in sub_shapes {
                map.sub_blocks.push(SubBlock {
                    parent,
                    rows,
                    cols: BlockSpan::new(col_start, sub_width),
                });
                col_start += sub_width;
            }

            row_start += height;
        }

        map.hlines = cumulative(
            map.main_blocks
                .iter()
                .take(map.main_blocks.len().saturating_sub(1))
                .map(|b| b.rows.len),
        );
        map.vlines = cumulative(segment_widths.iter().copied());
        map
    }

    /// Total row count covered by the row-groups
    pub fn total_rows(&self) -> usize {
        self.main_blocks.last().map_or(0, |b| b.rows.end())
    }

    /// Sub-blocks belonging to row-group `parent`
    pub fn sub_blocks_of(&self, parent: usize) -> impl Iterator<Item = &SubBlock> {
        self.sub_blocks.iter().filter(move |s| s.parent == parent)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn cumulative(values: impl Iterator<Item = usize>) -> Vec<usize> {
    values
        .scan(0usize, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_inclusive() {
        assert_eq!(BlockSpan::new(3, 4).inclusive(), Some((3, 6)));
        assert_eq!(BlockSpan::new(3, 0).inclusive(), None);
        assert!(BlockSpan::new(3, 0).is_within(&BlockSpan::new(0, 3)));
        assert!(!BlockSpan::new(2, 2).is_within(&BlockSpan::new(0, 3)));
    }

    #[test]
    fn test_from_shapes() {
        let groups = vec![vec![(2, 3), (2, 1)], vec![(1, 1), (1, 3)]];
        let map = BlockCoordinateMap::from_shapes(&groups, &[3, 1]);

        assert_eq!(map.main_blocks.len(), 2);
        assert_eq!(map.main_blocks[1].rows, BlockSpan::new(2, 1));
        assert_eq!(map.main_blocks[1].cols, BlockSpan::new(0, 4));
        assert_eq!(map.sub_blocks.len(), 4);
        assert_eq!(map.sub_blocks[3].parent, 1);
        assert_eq!(map.sub_blocks[3].cols, BlockSpan::new(1, 3));
        assert_eq!(map.hlines, vec![2]);
        assert_eq!(map.vlines, vec![3, 4]);
        assert_eq!(map.total_rows(), 3);
        assert_eq!(map.sub_blocks_of(0).count(), 2);
    }

    #[test]
    fn test_json_roundtrip() {
        let map = BlockCoordinateMap::from_shapes(&[vec![(1, 2)]], &[2]);
        let json = map.to_json().unwrap();
        let back: BlockCoordinateMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
