//! Tile registry: plain tiles and auto-tile groups with stable identifiers

use crate::tile::{GroupId, TileDefinition, TileId, TileProperties};
use crate::MapError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Neighbor topology of an auto-tile group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AutoTileTopology {
    /// 4 direct neighbors (N, W, E, S), 16 variants
    #[default]
    Four,
    /// 8 neighbors with corner validity, 47 variants
    Eight,
}

impl AutoTileTopology {
    /// Number of variants a group of this topology must have
    pub fn variant_count(&self) -> usize {
        match self {
            AutoTileTopology::Four => 16,
            AutoTileTopology::Eight => 47,
        }
    }

    /// Number of neighbors sampled when resolving a variant
    pub fn neighbor_count(&self) -> usize {
        match self {
            AutoTileTopology::Four => 4,
            AutoTileTopology::Eight => 8,
        }
    }
}

/// A set of tile variants selected automatically from neighbor solidity.
///
/// `variants[0]` is the main tile and the source of shared metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoTileGroup {
    pub id: GroupId,
    pub topology: AutoTileTopology,
    pub variants: Vec<TileDefinition>,
}

impl AutoTileGroup {
    /// The representative tile (variant 0)
    pub fn main(&self) -> &TileDefinition {
        &self.variants[0]
    }

    /// Get a variant by its dense index
    pub fn variant(&self, index: usize) -> Option<&TileDefinition> {
        self.variants.get(index)
    }

    /// Check if `tile` is one of this group's variants
    pub fn contains(&self, tile: TileId) -> bool {
        self.variants.iter().any(|v| v.id == tile)
    }

    /// Copy variant 0's properties into every other variant.
    /// Ids and sprites are left untouched.
    pub fn sync_variants(&mut self) {
        let Some((main, rest)) = self.variants.split_first_mut() else {
            return;
        };
        for variant in rest {
            variant.properties.clone_from(&main.properties);
        }
    }

    /// Check variant count and group tags
    pub fn validate(&self) -> Result<(), MapError> {
        let expected = self.topology.variant_count();
        if self.variants.len() != expected {
            return Err(MapError::MalformedGroup {
                group: self.id,
                expected,
                found: self.variants.len(),
            });
        }
        if let Some(stray) = self.variants.iter().find(|v| !v.belongs_to(self.id)) {
            return Err(MapError::UntaggedVariant {
                group: self.id,
                tile: stray.id,
            });
        }
        Ok(())
    }
}

/// Where a tile id lives inside the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TileSlot {
    Plain(usize),
    Variant { group: usize, variant: usize },
}

/// Owns all tile definitions and auto-tile groups used by a map collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileRegistry {
    #[serde(default)]
    tiles: Vec<TileDefinition>,
    #[serde(default)]
    groups: Vec<AutoTileGroup>,
    next_tile_id: TileId,
    next_group_id: GroupId,
    /// Tile id -> location. Rebuilt after every structural change.
    #[serde(skip)]
    index: HashMap<TileId, TileSlot>,
}

impl Default for TileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TileRegistry {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            groups: Vec::new(),
            next_tile_id: 1,
            next_group_id: 1,
            index: HashMap::new(),
        }
    }

    /// Add a plain tile definition and return its id
    pub fn add_tile(&mut self) -> TileId {
        let id = self.allocate_tile_id();
        self.tiles.push(TileDefinition::new(id));
        self.index.insert(id, TileSlot::Plain(self.tiles.len() - 1));
        debug!(tile = id, "added tile");
        id
    }

    /// Add an auto-tile group with 16 or 47 fresh variants and return its id
    pub fn add_auto_tile_group(&mut self, topology: AutoTileTopology) -> GroupId {
        let group_id = self.next_group_id;
        self.next_group_id += 1;

        let variants = (0..topology.variant_count())
            .map(|_| TileDefinition::new_variant(self.allocate_tile_id(), group_id))
            .collect();
        self.groups.push(AutoTileGroup {
            id: group_id,
            topology,
            variants,
        });
        self.rebuild_index();
        debug!(group = group_id, ?topology, "added auto-tile group");
        group_id
    }

    /// Remove a plain tile. Unknown ids and group variants are ignored.
    pub fn remove_tile(&mut self, id: TileId) -> Option<TileDefinition> {
        let Some(TileSlot::Plain(pos)) = self.index.get(&id).copied() else {
            return None;
        };
        let removed = self.tiles.remove(pos);
        self.after_removal();
        debug!(tile = id, "removed tile");
        Some(removed)
    }

    /// Remove an auto-tile group and all of its variants. Unknown ids are ignored.
    pub fn remove_auto_tile_group(&mut self, group: GroupId) -> Option<AutoTileGroup> {
        let pos = self.groups.iter().position(|g| g.id == group)?;
        let removed = self.groups.remove(pos);
        if self.groups.is_empty() {
            self.next_group_id = 1;
        }
        self.after_removal();
        debug!(group, "removed auto-tile group");
        Some(removed)
    }

    /// Resolve a tile id. A miss means "no tile", never an error.
    pub fn get_tile(&self, id: TileId) -> Option<&TileDefinition> {
        match *self.index.get(&id)? {
            TileSlot::Plain(pos) => self.tiles.get(pos),
            TileSlot::Variant { group, variant } => self.groups.get(group)?.variants.get(variant),
        }
    }

    /// Resolve an optional cell value
    pub fn get_cell_tile(&self, cell: Option<TileId>) -> Option<&TileDefinition> {
        cell.and_then(|id| self.get_tile(id))
    }

    /// Check if an id resolves
    pub fn contains(&self, id: TileId) -> bool {
        self.index.contains_key(&id)
    }

    /// Group membership of a tile, if it resolves and is a variant
    pub fn group_of(&self, id: TileId) -> Option<GroupId> {
        self.get_tile(id)?.group
    }

    /// Get a group by id
    pub fn get_group(&self, group: GroupId) -> Option<&AutoTileGroup> {
        self.groups.iter().find(|g| g.id == group)
    }

    /// Plain tiles in palette order
    pub fn tiles(&self) -> &[TileDefinition] {
        &self.tiles
    }

    /// Auto-tile groups in creation order
    pub fn groups(&self) -> &[AutoTileGroup] {
        &self.groups
    }

    /// Number of resolvable tile ids (plain tiles plus all variants)
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.groups.is_empty()
    }

    /// Mutate a tile definition.
    ///
    /// Afterwards the owning group is re-synchronised: edits to variant 0
    /// propagate to every variant, and the shared properties of any other
    /// variant are restored from variant 0. The id cannot be changed.
    pub fn edit_tile<F>(&mut self, id: TileId, edit: F) -> bool
    where
        F: FnOnce(&mut TileDefinition),
    {
        let Some(slot) = self.index.get(&id).copied() else {
            return false;
        };
        match slot {
            TileSlot::Plain(pos) => {
                let tile = &mut self.tiles[pos];
                edit(tile);
                tile.id = id;
                tile.group = None;
            }
            TileSlot::Variant { group, variant } => {
                let group = &mut self.groups[group];
                let tile = &mut group.variants[variant];
                edit(tile);
                tile.id = id;
                tile.group = Some(group.id);
                group.sync_variants();
            }
        }
        true
    }

    /// Change only the visual asset reference of a tile
    pub fn set_sprite(&mut self, id: TileId, sprite: Option<String>) -> bool {
        self.edit_tile(id, |tile| tile.sprite = sprite)
    }

    /// Replace the shared properties of a group (variant 0) and propagate them
    pub fn set_group_properties(&mut self, group: GroupId, properties: TileProperties) -> bool {
        let Some(group) = self.groups.iter_mut().find(|g| g.id == group) else {
            return false;
        };
        let Some(main) = group.variants.first_mut() else {
            return false;
        };
        main.properties = properties;
        group.sync_variants();
        true
    }

    /// Move a plain tile to a new position in the palette order
    pub fn move_tile(&mut self, id: TileId, position: usize) -> bool {
        let Some(TileSlot::Plain(from)) = self.index.get(&id).copied() else {
            return false;
        };
        let tile = self.tiles.remove(from);
        let to = position.min(self.tiles.len());
        self.tiles.insert(to, tile);
        self.rebuild_index();
        true
    }

    /// Rebuild the id -> location map from the tile and group lists.
    /// Also re-applies variant 0 metadata to every group.
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for (pos, tile) in self.tiles.iter().enumerate() {
            self.index.insert(tile.id, TileSlot::Plain(pos));
        }
        for (group_pos, group) in self.groups.iter_mut().enumerate() {
            group.sync_variants();
            for (variant, tile) in group.variants.iter().enumerate() {
                self.index.insert(
                    tile.id,
                    TileSlot::Variant {
                        group: group_pos,
                        variant,
                    },
                );
            }
        }
    }

    /// Check group shapes and id uniqueness (used after deserialization)
    pub fn validate(&self) -> Result<(), MapError> {
        let mut seen = HashSet::new();
        let mut seen_groups = HashSet::new();
        for group in &self.groups {
            group.validate()?;
            if !seen_groups.insert(group.id) {
                return Err(MapError::DuplicateGroupId(group.id));
            }
            if group.id >= self.next_group_id {
                return Err(MapError::GroupCounterBehind(group.id));
            }
        }
        let all_ids = self
            .tiles
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.variants.iter()))
            .map(|t| t.id);
        for id in all_ids {
            if !seen.insert(id) {
                return Err(MapError::DuplicateTileId(id));
            }
            if id >= self.next_tile_id {
                return Err(MapError::IdCounterBehind(id));
            }
        }
        if let Some(tile) = self.tiles.iter().find(|t| t.group.is_some()) {
            return Err(MapError::UntaggedVariant {
                group: tile.group.unwrap_or_default(),
                tile: tile.id,
            });
        }
        Ok(())
    }

    fn allocate_tile_id(&mut self) -> TileId {
        let id = self.next_tile_id;
        self.next_tile_id += 1;
        id
    }

    fn after_removal(&mut self) {
        if self.is_empty() {
            self.next_tile_id = 1;
        }
        self.rebuild_index();
    }
}
