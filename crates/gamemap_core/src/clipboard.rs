//! Tile selection and clipboard for copy/paste/delete of marked cells

use crate::map::GameMap;
use crate::tile::TileId;
use crate::MapError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A single changed cell: (x, y) -> (old_tile, new_tile)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileChange {
    pub x: u32,
    pub y: u32,
    pub old: Option<TileId>,
    pub new: Option<TileId>,
}

/// Cells marked on one layer of a map
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TileSelection {
    pub layer: usize,
    pub cells: BTreeSet<(u32, u32)>,
}

impl TileSelection {
    pub fn new(layer: usize) -> Self {
        Self {
            layer,
            cells: BTreeSet::new(),
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn select_tile(&mut self, x: u32, y: u32, add_to_selection: bool) {
        if !add_to_selection {
            self.clear();
        }
        self.cells.insert((x, y));
    }

    pub fn select_rectangle(&mut self, x1: u32, y1: u32, x2: u32, y2: u32, add_to_selection: bool) {
        if !add_to_selection {
            self.clear();
        }
        for y in y1.min(y2)..=y1.max(y2) {
            for x in x1.min(x2)..=x1.max(x2) {
                self.cells.insert((x, y));
            }
        }
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.cells.contains(&(x, y))
    }

    /// Lower-left corner of the selection bounds
    fn min_corner(&self) -> Option<(u32, u32)> {
        let min_x = self.cells.iter().map(|&(x, _)| x).min()?;
        let min_y = self.cells.iter().map(|&(_, y)| y).min()?;
        Some((min_x, min_y))
    }
}

/// Copied cells, stored relative to the selection's lower-left corner
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardContent {
    pub width: u32,
    pub height: u32,
    /// Cells as (relative_x, relative_y, tile_id)
    pub tiles: Vec<(u32, u32, Option<TileId>)>,
}

impl ClipboardContent {
    /// Copy the selected cells of a map. Cells outside the map are skipped.
    pub fn copy(map: &GameMap, selection: &TileSelection) -> Option<Self> {
        let (min_x, min_y) = selection.min_corner()?;
        let layer = map.layer(selection.layer)?;

        let mut width = 0;
        let mut height = 0;
        let mut tiles = Vec::with_capacity(selection.len());
        for &(x, y) in &selection.cells {
            if x >= map.width() || y >= map.height() {
                continue;
            }
            let (rx, ry) = (x - min_x, y - min_y);
            width = width.max(rx + 1);
            height = height.max(ry + 1);
            tiles.push((rx, ry, layer.get(x, y)));
        }

        Some(Self {
            width,
            height,
            tiles,
        })
    }

    /// Paste with the lower-left corner at (x, y).
    /// Cells that would land outside the map are dropped.
    pub fn paste(
        &self,
        map: &mut GameMap,
        layer: usize,
        x: u32,
        y: u32,
    ) -> Result<Vec<TileChange>, MapError> {
        let count = map.layer_count();
        let (width, height) = (map.width(), map.height());
        let grid = map
            .layer_mut(layer)
            .ok_or(MapError::LayerOutOfRange { layer, count })?;

        let mut changes = Vec::new();
        for &(rx, ry, tile) in &self.tiles {
            let (Some(tx), Some(ty)) = (x.checked_add(rx), y.checked_add(ry)) else {
                continue;
            };
            if tx >= width || ty >= height {
                continue;
            }
            let old = grid.set(tx, ty, tile);
            if old != tile {
                changes.push(TileChange {
                    x: tx,
                    y: ty,
                    old,
                    new: tile,
                });
            }
        }
        Ok(changes)
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

impl GameMap {
    /// Empty every selected cell
    pub fn delete_selection(&mut self, selection: &TileSelection) -> Result<Vec<TileChange>, MapError> {
        let count = self.layer_count();
        let layer = selection.layer;
        let grid = self
            .layer_mut(layer)
            .ok_or(MapError::LayerOutOfRange { layer, count })?;

        Ok(selection
            .cells
            .iter()
            .filter_map(|&(x, y)| {
                let old = grid.set(x, y, None);
                old.map(|_| TileChange { x, y, old, new: None })
            })
            .collect())
    }
}
