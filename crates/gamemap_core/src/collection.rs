//! Map collections: the maps of a project plus the tile registry they share

use crate::map::{GameMap, MapId};
use crate::registry::TileRegistry;
use crate::MapError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default size of maps created with [`MapCollection::add_map`]
pub const DEFAULT_MAP_SIZE: u32 = 10;

/// An ordered list of uniquely named maps and the registry their cells refer to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapCollection {
    #[serde(default)]
    maps: Vec<GameMap>,
    #[serde(default)]
    registry: TileRegistry,
    next_map_id: MapId,
}

impl Default for MapCollection {
    fn default() -> Self {
        Self::new(TileRegistry::new())
    }
}

impl MapCollection {
    pub fn new(registry: TileRegistry) -> Self {
        Self {
            maps: Vec::new(),
            registry,
            next_map_id: 1,
        }
    }

    /// Add a 10x10 map named "Map N" and return its id
    pub fn add_map(&mut self) -> MapId {
        let id = self.allocate_map_id();
        let mut name = format!("Map {id}");
        let mut suffix = 1;
        while self.find_map(&name).is_some() {
            suffix += 1;
            name = format!("Map {id} ({suffix})");
        }
        self.maps
            .push(GameMap::new(id, name, DEFAULT_MAP_SIZE, DEFAULT_MAP_SIZE));
        debug!(map = id, "added map");
        id
    }

    /// Add a map with a specific name and size
    pub fn add_map_named(
        &mut self,
        name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<MapId, MapError> {
        let name = name.into();
        if self.find_map(&name).is_some() {
            return Err(MapError::DuplicateMapName(name));
        }
        let id = self.allocate_map_id();
        self.maps.push(GameMap::new(id, name, width, height));
        debug!(map = id, "added map");
        Ok(id)
    }

    /// Rename a map. Names must stay unique.
    pub fn rename_map(&mut self, id: MapId, name: impl Into<String>) -> Result<(), MapError> {
        let name = name.into();
        if self.maps.iter().any(|m| m.id != id && m.name == name) {
            return Err(MapError::DuplicateMapName(name));
        }
        let map = self.get_map_mut(id).ok_or(MapError::MapNotFound(id))?;
        map.name = name;
        Ok(())
    }

    /// Remove a map by id
    pub fn remove_map(&mut self, id: MapId) -> Option<GameMap> {
        let pos = self.maps.iter().position(|m| m.id == id)?;
        let removed = self.maps.remove(pos);
        if self.maps.is_empty() {
            self.next_map_id = 1;
        }
        debug!(map = id, "removed map");
        Some(removed)
    }

    /// Move the map at position `from` to position `to`
    pub fn move_map(&mut self, from: usize, to: usize) -> bool {
        if from >= self.maps.len() {
            return false;
        }
        let map = self.maps.remove(from);
        let to = to.min(self.maps.len());
        self.maps.insert(to, map);
        true
    }

    pub fn maps(&self) -> &[GameMap] {
        &self.maps
    }

    pub fn get_map(&self, id: MapId) -> Option<&GameMap> {
        self.maps.iter().find(|m| m.id == id)
    }

    pub fn get_map_mut(&mut self, id: MapId) -> Option<&mut GameMap> {
        self.maps.iter_mut().find(|m| m.id == id)
    }

    /// Find a map by name
    pub fn find_map(&self, name: &str) -> Option<&GameMap> {
        self.maps.iter().find(|m| m.name == name)
    }

    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TileRegistry {
        &mut self.registry
    }

    /// Borrow a map mutably together with the registry, for painting
    pub fn map_with_registry_mut(&mut self, id: MapId) -> Option<(&mut GameMap, &TileRegistry)> {
        let map = self.maps.iter_mut().find(|m| m.id == id)?;
        Some((map, &self.registry))
    }

    /// Check names, layer sizes, registry shape and that every cell resolves
    pub fn validate(&self) -> Result<(), MapError> {
        self.registry.validate()?;
        for (i, map) in self.maps.iter().enumerate() {
            if self.maps[..i].iter().any(|m| m.name == map.name) {
                return Err(MapError::DuplicateMapName(map.name.clone()));
            }
            map.validate()?;
            if let Some(placed) = map
                .placed_tiles()
                .find(|p| !self.registry.contains(p.tile))
            {
                return Err(MapError::DanglingTile {
                    map: map.name.clone(),
                    layer: placed.layer,
                    x: placed.x,
                    y: placed.y,
                    tile: placed.tile,
                });
            }
        }
        Ok(())
    }

    /// Rebuild derived state after deserialization
    pub(crate) fn restore(&mut self) {
        self.registry.rebuild_index();
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn allocate_map_id(&mut self) -> MapId {
        let id = self.next_map_id;
        self.next_map_id += 1;
        id
    }
}
