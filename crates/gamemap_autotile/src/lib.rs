//! Bitmask auto-tiling for gamemap
//!
//! This crate picks the variant of an auto-tile group to place in a cell from
//! the solidity of its neighbors, and keeps the surrounding cells in sync
//! after every paint.
//!
//! # Features
//! - 16-tile edge layout (4 neighbors)
//! - 47-tile blob layout (8 neighbors, corners only count between solid edges)
//! - One-ring neighbor propagation on paint and erase
//! - Configurable "outside the map is solid" policy
//!
//! # Example
//!
//! ```rust
//! use gamemap_autotile::{AutoTileResolver, AutotileConfig};
//! use gamemap_core::{AutoTileTopology, GameMap, TileRegistry};
//!
//! let mut registry = TileRegistry::new();
//! let walls = registry.add_auto_tile_group(AutoTileTopology::Eight);
//! let config = AutotileConfig::default();
//!
//! let mut map = GameMap::new(1, "Dungeon", 8, 8);
//! let resolver = AutoTileResolver::new(&registry, &config);
//! let changes = resolver.paint(&mut map, 0, 3, 3, walls)?;
//! assert_eq!(changes.len(), 1);
//! # Ok::<(), gamemap_autotile::AutotileError>(())
//! ```

pub mod config;
pub mod mask;
pub mod resolver;

// Re-export main types at crate root
pub use config::{AutotileConfig, ConfigError};
pub use mask::{blob_index, blob_mask, edge_mask, optimize_bitmask, BLOB_47};
pub use resolver::{dense_blob_index, AutoTileResolver};

// Re-export gamemap_core
pub use gamemap_core;

use gamemap_core::GroupId;
use thiserror::Error;

/// Errors raised while resolving or painting auto-tiles
#[derive(Debug, Error)]
pub enum AutotileError {
    /// A blob mask outside the 47-entry table. The table or the corner rule
    /// is inconsistent; the paint is aborted.
    #[error("blob mask {raw:#010b} has no entry in the 47-tile table")]
    UnmappedMask { raw: u8 },
    #[error("auto-tile group {0} not found")]
    UnknownGroup(GroupId),
    #[error("auto-tile group {group} has no variant {index}")]
    VariantMissing { group: GroupId, index: usize },
    #[error("cell ({x}, {y}) is outside the map")]
    OutOfBounds { x: u32, y: u32 },
    #[error("layer {layer} out of range (map has {count} layers)")]
    LayerOutOfRange { layer: usize, count: usize },
}
