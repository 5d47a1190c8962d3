//! Maps: a base layer plus extra layers that always share one size

use crate::layer::GridLayer;
use crate::tile::TileId;
use crate::MapError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Identifier of a map within its collection
pub type MapId = u32;

/// Neighbor offsets, starting north and going clockwise.
/// Y-up coordinates: +Y is above.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),   // N
    (1, 1),   // NE
    (1, 0),   // E
    (1, -1),  // SE
    (0, -1),  // S
    (-1, -1), // SW
    (-1, 0),  // W
    (-1, 1),  // NW
];

/// A neighboring cell. Both fields are None for positions outside the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbor {
    pub tile: Option<TileId>,
    pub index: Option<usize>,
}

impl Neighbor {
    pub const OUTSIDE: Self = Neighbor {
        tile: None,
        index: None,
    };

    /// Check if this neighbor lies outside the map
    pub fn is_outside(&self) -> bool {
        self.index.is_none()
    }
}

/// A non-empty cell yielded by [`GameMap::placed_tiles`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedTile {
    pub layer: usize,
    pub x: u32,
    pub y: u32,
    pub index: usize,
    pub tile: TileId,
}

/// A grid map. (0, 0) is the bottom-left cell.
///
/// Layer 0 is `base`, layer `k > 0` is `extra_layers[k - 1]`. Every layer
/// holds exactly `width * height` cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    pub id: MapId,
    pub name: String,
    width: u32,
    height: u32,
    base: GridLayer,
    #[serde(default)]
    extra_layers: Vec<GridLayer>,
}

impl GameMap {
    /// Create a map with one empty base layer. Sizes below 1 become 1.
    pub fn new(id: MapId, name: impl Into<String>, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            id,
            name: name.into(),
            width,
            height,
            base: GridLayer::new(width, height),
            extra_layers: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Grid index of (x, y). Inputs are not validated.
    #[inline]
    pub fn position_to_index(&self, x: u32, y: u32) -> usize {
        self.base.position_to_index(x, y)
    }

    /// Position of a grid index. Inputs are not validated.
    #[inline]
    pub fn index_to_position(&self, index: usize) -> (u32, u32) {
        self.base.index_to_position(index)
    }

    /// Check if (x, y) lies inside the map
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.base.in_bounds(x, y)
    }

    /// Base layer plus extra layers
    pub fn layer_count(&self) -> usize {
        self.extra_layers.len() + 1
    }

    pub fn layer(&self, layer: usize) -> Option<&GridLayer> {
        match layer {
            0 => Some(&self.base),
            n => self.extra_layers.get(n - 1),
        }
    }

    pub fn layer_mut(&mut self, layer: usize) -> Option<&mut GridLayer> {
        match layer {
            0 => Some(&mut self.base),
            n => self.extra_layers.get_mut(n - 1),
        }
    }

    fn checked_layer_mut(&mut self, layer: usize) -> Result<&mut GridLayer, MapError> {
        let count = self.layer_count();
        self.layer_mut(layer)
            .ok_or(MapError::LayerOutOfRange { layer, count })
    }

    /// Cell data of a layer, for runtime hosts that instantiate visuals
    pub fn layer_data(&self, layer: usize) -> Option<&[Option<TileId>]> {
        self.layer(layer).map(|l| l.cells.as_slice())
    }

    /// All layers from the base upward
    pub fn layers(&self) -> impl Iterator<Item = &GridLayer> {
        std::iter::once(&self.base).chain(self.extra_layers.iter())
    }

    fn layers_mut(&mut self) -> impl Iterator<Item = &mut GridLayer> {
        std::iter::once(&mut self.base).chain(self.extra_layers.iter_mut())
    }

    /// Get the cell at (x, y) on a layer
    pub fn get_tile(&self, layer: usize, x: u32, y: u32) -> Option<TileId> {
        self.layer(layer)?.get(x, y)
    }

    /// Set the cell at (x, y) on a layer and return the previous value
    pub fn set_tile(
        &mut self,
        layer: usize,
        x: u32,
        y: u32,
        tile: Option<TileId>,
    ) -> Result<Option<TileId>, MapError> {
        if x >= self.width || y >= self.height {
            return Err(MapError::OutOfBounds { x, y });
        }
        Ok(self.checked_layer_mut(layer)?.set(x, y, tile))
    }

    /// Resize every layer, keeping cells that lie inside both the old and new size
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        let base = self.base.resized(width, height);
        let extra: Vec<GridLayer> = self
            .extra_layers
            .iter()
            .map(|l| l.resized(width, height))
            .collect();
        self.base = base;
        self.extra_layers = extra;
        self.width = width;
        self.height = height;
        debug!(map = self.id, width, height, "resized map");
    }

    /// Reallocate every layer at a new size, discarding all cell data
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        let (w, h) = (self.width, self.height);
        for layer in self.layers_mut() {
            *layer = GridLayer::new(w, h);
        }
        debug!(map = self.id, width = w, height = h, "set map size");
    }

    /// Empty every cell of every layer
    pub fn clear_all(&mut self) {
        for layer in self.layers_mut() {
            layer.clear();
        }
    }

    /// Reallocate one layer at the map size, discarding its contents
    pub fn init_layer(&mut self, layer: usize) -> Result<(), MapError> {
        let (w, h) = (self.width, self.height);
        *self.checked_layer_mut(layer)? = GridLayer::new(w, h);
        Ok(())
    }

    /// Empty every cell of one layer
    pub fn clear_layer(&mut self, layer: usize) -> Result<(), MapError> {
        self.checked_layer_mut(layer)?.clear();
        Ok(())
    }

    /// Append an empty extra layer and return its layer index
    pub fn add_layer(&mut self) -> usize {
        self.extra_layers
            .push(GridLayer::new(self.width, self.height));
        debug!(map = self.id, layers = self.layer_count(), "added layer");
        self.layer_count() - 1
    }

    /// Remove an extra layer by its layer index (1 or higher)
    pub fn remove_layer(&mut self, layer: usize) -> Result<GridLayer, MapError> {
        if layer == 0 {
            return Err(MapError::CannotRemoveBaseLayer);
        }
        if layer >= self.layer_count() {
            return Err(MapError::LayerOutOfRange {
                layer,
                count: self.layer_count(),
            });
        }
        debug!(map = self.id, layer, "removed layer");
        Ok(self.extra_layers.remove(layer - 1))
    }

    /// The 4 direct neighbors of (x, y): N, E, S, W
    pub fn neighbors4(&self, x: u32, y: u32, layer: usize) -> [Neighbor; 4] {
        let mut result = [Neighbor::OUTSIDE; 4];
        for (slot, offset) in result.iter_mut().zip(NEIGHBOR_OFFSETS.iter().step_by(2)) {
            *slot = self.neighbor_at(x, y, *offset, layer);
        }
        result
    }

    /// The 8 surrounding neighbors of (x, y): N, NE, E, SE, S, SW, W, NW
    pub fn neighbors8(&self, x: u32, y: u32, layer: usize) -> [Neighbor; 8] {
        let mut result = [Neighbor::OUTSIDE; 8];
        for (slot, offset) in result.iter_mut().zip(NEIGHBOR_OFFSETS.iter()) {
            *slot = self.neighbor_at(x, y, *offset, layer);
        }
        result
    }

    /// Neighbors of (x, y), north first and clockwise.
    /// Always 4 entries, or 8 with `include_diagonal`.
    pub fn neighbors(&self, x: u32, y: u32, include_diagonal: bool, layer: usize) -> Vec<Neighbor> {
        if include_diagonal {
            self.neighbors8(x, y, layer).to_vec()
        } else {
            self.neighbors4(x, y, layer).to_vec()
        }
    }

    fn neighbor_at(&self, x: u32, y: u32, (dx, dy): (i32, i32), layer: usize) -> Neighbor {
        let nx = x as i32 + dx;
        let ny = y as i32 + dy;
        if !self.in_bounds(nx, ny) {
            return Neighbor::OUTSIDE;
        }
        let index = self.position_to_index(nx as u32, ny as u32);
        Neighbor {
            tile: self.layer(layer).and_then(|l| l.cells[index]),
            index: Some(index),
        }
    }

    /// Every non-empty cell, base layer first, cell index ascending
    pub fn placed_tiles(&self) -> impl Iterator<Item = PlacedTile> + '_ {
        self.layers().enumerate().flat_map(move |(layer, grid)| {
            grid.cells.iter().enumerate().filter_map(move |(index, cell)| {
                let tile = (*cell)?;
                let (x, y) = grid.index_to_position(index);
                Some(PlacedTile {
                    layer,
                    x,
                    y,
                    index,
                    tile,
                })
            })
        })
    }

    /// Check that every layer matches the map size
    pub fn validate(&self) -> Result<(), MapError> {
        for (layer, grid) in self.layers().enumerate() {
            if grid.width != self.width || grid.height != self.height || !grid.is_consistent() {
                return Err(MapError::LayerSizeMismatch {
                    map: self.name.clone(),
                    layer,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for GameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
