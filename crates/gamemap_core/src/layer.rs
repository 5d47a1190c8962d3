//! Grid layers: flat cell storage with position/index mapping

use crate::tile::TileId;
use serde::{Deserialize, Serialize};

/// A single grid of cell values.
///
/// Cells are stored row by row from the bottom-left corner; `None` is an
/// empty cell, `Some(id)` refers to a tile in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayer {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Option<TileId>>,
}

impl GridLayer {
    /// Create an empty layer of the given size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    /// Grid index of the cell at (x, y). Inputs are not validated.
    #[inline]
    pub fn position_to_index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) outside layer");
        y as usize * self.width as usize + x as usize
    }

    /// Position of the cell at `index`. Inputs are not validated.
    #[inline]
    pub fn index_to_position(&self, index: usize) -> (u32, u32) {
        debug_assert!(index < self.cells.len(), "index {index} outside layer");
        let width = self.width as usize;
        ((index % width) as u32, (index / width) as u32)
    }

    /// Check if (x, y) lies inside the layer
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Get the cell at (x, y), None when empty or outside the layer
    pub fn get(&self, x: u32, y: u32) -> Option<TileId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[self.position_to_index(x, y)]
    }

    /// Set the cell at (x, y) and return the previous value.
    /// Writes outside the layer are ignored.
    pub fn set(&mut self, x: u32, y: u32, tile: Option<TileId>) -> Option<TileId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.position_to_index(x, y);
        std::mem::replace(&mut self.cells[idx], tile)
    }

    /// Set every cell to empty without resizing
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Build a copy of this layer at a new size.
    ///
    /// Cells inside both rectangles keep their value (origin aligned),
    /// everything else is empty.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let mut layer = Self::new(width, height);
        let copy_w = width.min(self.width) as usize;
        for y in 0..height.min(self.height) {
            let src = y as usize * self.width as usize;
            let dst = y as usize * width as usize;
            layer.cells[dst..dst + copy_w].copy_from_slice(&self.cells[src..src + copy_w]);
        }
        layer
    }

    /// Number of non-empty cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Check if the cell storage matches the declared size
    pub fn is_consistent(&self) -> bool {
        self.cells.len() == self.width as usize * self.height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layer_is_empty() {
        let layer = GridLayer::new(10, 10);
        assert_eq!(layer.cells.len(), 100);
        assert!(layer.cells.iter().all(|c| c.is_none()));
        assert!(layer.is_consistent());
    }

    #[test]
    fn test_position_index_round_trip() {
        let layer = GridLayer::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                let idx = layer.position_to_index(x, y);
                assert_eq!(layer.index_to_position(idx), (x, y));
            }
        }
        assert_eq!(layer.position_to_index(1, 2), 9);
        assert_eq!(layer.index_to_position(7), (3, 1));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_index_math_past_u32_range() {
        // Index math only, no cell storage
        let layer = GridLayer {
            width: 70_000,
            height: 70_000,
            cells: Vec::new(),
        };
        let idx = layer.position_to_index(69_999, 69_999);
        assert_eq!(idx, 69_999 * 70_000 + 69_999);
        assert!(idx > u32::MAX as usize);
    }

    #[test]
    fn test_get_set() {
        let mut layer = GridLayer::new(3, 3);
        assert_eq!(layer.set(2, 1, Some(5)), None);
        assert_eq!(layer.get(2, 1), Some(5));
        assert_eq!(layer.set(2, 1, None), Some(5));
        assert_eq!(layer.set(3, 0, Some(1)), None);
        assert_eq!(layer.get(3, 0), None);
        assert_eq!(layer.filled_count(), 0);
    }

    #[test]
    fn test_resized_keeps_overlap() {
        let mut layer = GridLayer::new(3, 2);
        layer.set(0, 0, Some(1));
        layer.set(2, 1, Some(2));
        layer.set(1, 1, Some(3));

        let grown = layer.resized(4, 4);
        assert_eq!(grown.get(0, 0), Some(1));
        assert_eq!(grown.get(2, 1), Some(2));
        assert_eq!(grown.get(1, 1), Some(3));
        assert_eq!(grown.filled_count(), 3);

        let shrunk = layer.resized(2, 1);
        assert_eq!(shrunk.cells, vec![Some(1), None]);
    }
}
