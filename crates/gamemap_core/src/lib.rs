//! Core data structures for gamemap
//!
//! This crate provides the fundamental types for representing layered tile maps:
//! - `TileRegistry` - Tile definitions and auto-tile groups with stable ids
//! - `GridLayer` - A flat grid of cell values with position/index mapping
//! - `GameMap` - A named map with a base layer and extra layers
//! - `MapCollection` - The maps of a project plus the registry they share
//! - `TileSelection` / `ClipboardContent` - Marked cells and copy/paste
//!
//! # Example
//!
//! ```rust
//! use gamemap_core::{AutoTileTopology, MapCollection};
//!
//! let mut collection = MapCollection::default();
//! let floor = collection.registry_mut().add_tile();
//! let _walls = collection.registry_mut().add_auto_tile_group(AutoTileTopology::Eight);
//!
//! let id = collection.add_map();
//! let map = collection.get_map_mut(id).unwrap();
//! map.set_tile(0, 2, 3, Some(floor)).unwrap();
//! assert_eq!(map.get_tile(0, 2, 3), Some(floor));
//! ```

mod clipboard;
mod collection;
mod layer;
mod map;
mod registry;
mod tile;

pub use clipboard::{ClipboardContent, TileChange, TileSelection};
pub use collection::{MapCollection, DEFAULT_MAP_SIZE};
pub use layer::GridLayer;
pub use map::{GameMap, MapId, Neighbor, PlacedTile, NEIGHBOR_OFFSETS};
pub use registry::{AutoTileGroup, AutoTileTopology, TileRegistry};
pub use tile::{
    Color, DefaultPreview, GroupId, PreviewDescriptor, TileDefinition, TileId, TileKind,
    TilePreview, TileProperties,
};

use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Errors raised by map and registry operations
#[derive(Debug, Error)]
pub enum MapError {
    #[error("layer {layer} out of range (map has {count} layers)")]
    LayerOutOfRange { layer: usize, count: usize },
    #[error("the base layer cannot be removed")]
    CannotRemoveBaseLayer,
    #[error("cell ({x}, {y}) is outside the map")]
    OutOfBounds { x: u32, y: u32 },
    #[error("a map named '{0}' already exists")]
    DuplicateMapName(String),
    #[error("map {0} not found")]
    MapNotFound(MapId),
    #[error("auto-tile group {group} has {found} variants, expected {expected}")]
    MalformedGroup {
        group: GroupId,
        expected: usize,
        found: usize,
    },
    #[error("tile {tile} is not tagged with auto-tile group {group}")]
    UntaggedVariant { group: GroupId, tile: TileId },
    #[error("tile id {0} is used more than once")]
    DuplicateTileId(TileId),
    #[error("tile id {0} is not below the registry's next id")]
    IdCounterBehind(TileId),
    #[error("auto-tile group id {0} is used more than once")]
    DuplicateGroupId(GroupId),
    #[error("auto-tile group id {0} is not below the registry's next group id")]
    GroupCounterBehind(GroupId),
    #[error("layer {layer} of map '{map}' does not match the map size")]
    LayerSizeMismatch { map: String, layer: usize },
    #[error("map '{map}' layer {layer} cell ({x}, {y}) refers to unknown tile {tile}")]
    DanglingTile {
        map: String,
        layer: usize,
        x: u32,
        y: u32,
        tile: TileId,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a map collection from a JSON string
pub fn parse_collection(json: &str) -> Result<MapCollection, MapError> {
    let mut collection: MapCollection = serde_json::from_str(json)?;
    collection.restore();
    if let Err(e) = collection.validate() {
        warn!("rejected map collection: {}", e);
        return Err(e);
    }
    Ok(collection)
}

/// Load a map collection from a JSON file
pub fn load_collection(path: &Path) -> Result<MapCollection, MapError> {
    let content = std::fs::read_to_string(path)?;
    parse_collection(&content)
}

/// Save a map collection to a JSON file
pub fn save_collection(collection: &MapCollection, path: &Path) -> Result<(), MapError> {
    std::fs::write(path, collection.to_json()?)?;
    Ok(())
}
