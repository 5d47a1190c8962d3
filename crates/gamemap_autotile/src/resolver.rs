//! Auto-tile resolution and paint propagation
//!
//! A cell painted with an auto-tile group gets the variant matching which of
//! its neighbors are "solid" (belong to the same group). After a paint, the
//! one ring of surrounding cells from the same group is recomputed so their
//! edges line up with the new cell.

use crate::config::AutotileConfig;
use crate::mask::{blob_index, blob_mask, edge_mask};
use crate::AutotileError;
use gamemap_core::{
    AutoTileGroup, AutoTileTopology, GameMap, GroupId, TileChange, TileId, TileRegistry,
    NEIGHBOR_OFFSETS,
};
use tracing::{debug, error, trace};

/// Map a raw blob mask to its dense variant index
pub fn dense_blob_index(raw: u8) -> Result<usize, AutotileError> {
    match blob_index(raw) {
        Some(dense) => Ok(dense as usize),
        None => {
            error!(raw, "blob mask missing from the 47-tile table");
            Err(AutotileError::UnmappedMask { raw })
        }
    }
}

/// Resolves auto-tile variants against a tile registry
#[derive(Debug, Clone, Copy)]
pub struct AutoTileResolver<'a> {
    registry: &'a TileRegistry,
    config: &'a AutotileConfig,
}

impl<'a> AutoTileResolver<'a> {
    pub fn new(registry: &'a TileRegistry, config: &'a AutotileConfig) -> Self {
        Self { registry, config }
    }

    fn group(&self, group: GroupId) -> Result<&'a AutoTileGroup, AutotileError> {
        self.registry
            .get_group(group)
            .ok_or(AutotileError::UnknownGroup(group))
    }

    fn check_target(&self, map: &GameMap, layer: usize, x: u32, y: u32) -> Result<(), AutotileError> {
        if layer >= map.layer_count() {
            return Err(AutotileError::LayerOutOfRange {
                layer,
                count: map.layer_count(),
            });
        }
        if x >= map.width() || y >= map.height() {
            return Err(AutotileError::OutOfBounds { x, y });
        }
        Ok(())
    }

    /// Whether the cell at (x, y) counts as solid for `group`
    fn is_solid(&self, map: &GameMap, layer: usize, x: i32, y: i32, group: GroupId) -> bool {
        if !map.in_bounds(x, y) {
            return self.config.outside_is_solid;
        }
        map.get_tile(layer, x as u32, y as u32)
            .and_then(|id| self.registry.get_tile(id))
            .is_some_and(|tile| tile.belongs_to(group))
    }

    /// Solidity of the 8 neighbors of (x, y), clockwise from north
    pub fn sample(&self, map: &GameMap, layer: usize, x: u32, y: u32, group: GroupId) -> [bool; 8] {
        let mut solid = [false; 8];
        for (slot, (dx, dy)) in solid.iter_mut().zip(NEIGHBOR_OFFSETS) {
            *slot = self.is_solid(map, layer, x as i32 + dx, y as i32 + dy, group);
        }
        solid
    }

    /// Dense variant index for the cell at (x, y)
    fn variant_index(
        &self,
        map: &GameMap,
        layer: usize,
        x: u32,
        y: u32,
        group: &AutoTileGroup,
    ) -> Result<usize, AutotileError> {
        let solid = self.sample(map, layer, x, y, group.id);
        match group.topology {
            AutoTileTopology::Four => {
                // N, W, E, S
                Ok(edge_mask([solid[0], solid[6], solid[2], solid[4]]) as usize)
            }
            AutoTileTopology::Eight => dense_blob_index(blob_mask(solid)),
        }
    }

    fn resolve_in(
        &self,
        map: &GameMap,
        layer: usize,
        x: u32,
        y: u32,
        group: &AutoTileGroup,
    ) -> Result<TileId, AutotileError> {
        let index = self.variant_index(map, layer, x, y, group)?;
        let tile = group
            .variant(index)
            .map(|v| v.id)
            .ok_or(AutotileError::VariantMissing {
                group: group.id,
                index,
            })?;
        trace!(x, y, group = group.id, index, tile, "resolved auto-tile");
        Ok(tile)
    }

    /// The variant id that painting `group` at (x, y) would place
    pub fn resolve(
        &self,
        map: &GameMap,
        layer: usize,
        x: u32,
        y: u32,
        group: GroupId,
    ) -> Result<TileId, AutotileError> {
        self.check_target(map, layer, x, y)?;
        let group = self.group(group)?;
        self.resolve_in(map, layer, x, y, group)
    }

    /// Surrounding cells that belong to `group` and must be recomputed
    /// after (x, y) changes
    pub fn affected_neighbors(
        &self,
        map: &GameMap,
        layer: usize,
        x: u32,
        y: u32,
        group: GroupId,
    ) -> Vec<(u32, u32)> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|(dx, dy)| (x as i32 + dx, y as i32 + dy))
            .filter(|&(nx, ny)| map.in_bounds(nx, ny))
            .map(|(nx, ny)| (nx as u32, ny as u32))
            .filter(|&(nx, ny)| {
                map.get_tile(layer, nx, ny)
                    .and_then(|id| self.registry.get_tile(id))
                    .is_some_and(|tile| tile.belongs_to(group))
            })
            .collect()
    }

    /// Recompute the given cells of `group` and collect the writes that differ
    fn recompute(
        &self,
        map: &GameMap,
        layer: usize,
        cells: &[(u32, u32)],
        group: &AutoTileGroup,
    ) -> Result<Vec<TileChange>, AutotileError> {
        let mut updates = Vec::new();
        for &(x, y) in cells {
            let new = self.resolve_in(map, layer, x, y, group)?;
            let old = map.get_tile(layer, x, y);
            if old != Some(new) {
                updates.push(TileChange {
                    x,
                    y,
                    old,
                    new: Some(new),
                });
            }
        }
        Ok(updates)
    }

    /// Paint `group` at (x, y) and recompute the surrounding cells of the
    /// same group. Returns every cell that changed; an empty list means the
    /// map was not modified.
    ///
    /// On error the map is left untouched.
    pub fn paint(
        &self,
        map: &mut GameMap,
        layer: usize,
        x: u32,
        y: u32,
        group: GroupId,
    ) -> Result<Vec<TileChange>, AutotileError> {
        self.check_target(map, layer, x, y)?;
        let group = self.group(group)?;

        let new = self.resolve_in(map, layer, x, y, group)?;
        let old = write_cell(map, layer, x, y, Some(new));

        let neighbors = self.affected_neighbors(map, layer, x, y, group.id);
        let updates = match self.recompute(map, layer, &neighbors, group) {
            Ok(updates) => updates,
            Err(e) => {
                write_cell(map, layer, x, y, old);
                return Err(e);
            }
        };

        let mut changes = Vec::with_capacity(updates.len() + 1);
        if old != Some(new) {
            changes.push(TileChange {
                x,
                y,
                old,
                new: Some(new),
            });
        }
        for change in updates {
            write_cell(map, layer, change.x, change.y, change.new);
            changes.push(change);
        }
        debug!(x, y, group = group.id, changed = changes.len(), "painted auto-tile");
        Ok(changes)
    }

    /// Clear the cell at (x, y). If it held an auto-tile variant, the
    /// surrounding cells of that group are recomputed.
    pub fn erase(
        &self,
        map: &mut GameMap,
        layer: usize,
        x: u32,
        y: u32,
    ) -> Result<Vec<TileChange>, AutotileError> {
        self.check_target(map, layer, x, y)?;
        let Some(old) = map.get_tile(layer, x, y) else {
            return Ok(Vec::new());
        };

        write_cell(map, layer, x, y, None);
        let mut changes = vec![TileChange {
            x,
            y,
            old: Some(old),
            new: None,
        }];

        let Some(group) = self.registry.group_of(old) else {
            return Ok(changes);
        };
        let group = match self.group(group) {
            Ok(group) => group,
            Err(e) => {
                write_cell(map, layer, x, y, Some(old));
                return Err(e);
            }
        };

        let neighbors = self.affected_neighbors(map, layer, x, y, group.id);
        let updates = match self.recompute(map, layer, &neighbors, group) {
            Ok(updates) => updates,
            Err(e) => {
                write_cell(map, layer, x, y, Some(old));
                return Err(e);
            }
        };
        for change in updates {
            write_cell(map, layer, change.x, change.y, change.new);
            changes.push(change);
        }
        debug!(x, y, group = group.id, changed = changes.len(), "erased auto-tile");
        Ok(changes)
    }

    /// Recompute every cell of `group` inside a rectangle, e.g. after a
    /// paste or resize. The rectangle is clipped to the map.
    pub fn refresh_region(
        &self,
        map: &mut GameMap,
        layer: usize,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        group: GroupId,
    ) -> Result<Vec<TileChange>, AutotileError> {
        if layer >= map.layer_count() {
            return Err(AutotileError::LayerOutOfRange {
                layer,
                count: map.layer_count(),
            });
        }
        let group = self.group(group)?;

        let max_x = x.saturating_add(width).min(map.width());
        let max_y = y.saturating_add(height).min(map.height());
        let mut cells = Vec::new();
        for cy in y..max_y {
            for cx in x..max_x {
                let in_group = map
                    .get_tile(layer, cx, cy)
                    .and_then(|id| self.registry.get_tile(id))
                    .is_some_and(|tile| tile.belongs_to(group.id));
                if in_group {
                    cells.push((cx, cy));
                }
            }
        }

        let updates = self.recompute(map, layer, &cells, group)?;
        for change in &updates {
            write_cell(map, layer, change.x, change.y, change.new);
        }
        Ok(updates)
    }

    /// The changes painting `group` at (x, y) would make, without modifying the map
    pub fn preview(
        &self,
        map: &GameMap,
        layer: usize,
        x: u32,
        y: u32,
        group: GroupId,
    ) -> Result<Vec<TileChange>, AutotileError> {
        let mut scratch = map.clone();
        self.paint(&mut scratch, layer, x, y, group)
    }
}

/// Write a cell whose position and layer were already validated
fn write_cell(map: &mut GameMap, layer: usize, x: u32, y: u32, tile: Option<TileId>) -> Option<TileId> {
    map.layer_mut(layer).and_then(|grid| grid.set(x, y, tile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamemap_core::AutoTileTopology;

    fn setup(topology: AutoTileTopology) -> (TileRegistry, GroupId) {
        let mut registry = TileRegistry::new();
        let group = registry.add_auto_tile_group(topology);
        (registry, group)
    }

    fn variant(registry: &TileRegistry, group: GroupId, index: usize) -> TileId {
        registry.get_group(group).unwrap().variants[index].id
    }

    fn solid_outside() -> AutotileConfig {
        AutotileConfig::new().with_outside_is_solid(true)
    }

    fn open_outside() -> AutotileConfig {
        AutotileConfig::new().with_outside_is_solid(false)
    }

    #[test]
    fn test_isolated_cell_is_variant_zero() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = solid_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let map = GameMap::new(1, "Empty", 3, 3);

        assert_eq!(
            resolver.resolve(&map, 0, 1, 1, group).unwrap(),
            variant(&registry, group, 0)
        );
    }

    #[test]
    fn test_outside_policy_on_single_cell_map() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let map = GameMap::new(1, "Tiny", 1, 1);

        let config = solid_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        assert_eq!(
            resolver.resolve(&map, 0, 0, 0, group).unwrap(),
            variant(&registry, group, 15)
        );

        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        assert_eq!(
            resolver.resolve(&map, 0, 0, 0, group).unwrap(),
            variant(&registry, group, 0)
        );
    }

    #[test]
    fn test_four_neighbor_bit_weights() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let any = variant(&registry, group, 0);

        // (dx, dy, expected variant) for N, W, E, S
        for (dx, dy, expected) in [(0i32, 1i32, 1usize), (-1, 0, 2), (1, 0, 4), (0, -1, 8)] {
            let mut map = GameMap::new(1, "Bits", 3, 3);
            map.set_tile(0, (1 + dx) as u32, (1 + dy) as u32, Some(any)).unwrap();
            assert_eq!(
                resolver.resolve(&map, 0, 1, 1, group).unwrap(),
                variant(&registry, group, expected)
            );
        }
    }

    #[test]
    fn test_four_neighbor_edge_of_map() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = solid_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let map = GameMap::new(1, "Edge", 3, 3);

        // W and S are outside the map
        assert_eq!(
            resolver.resolve(&map, 0, 0, 0, group).unwrap(),
            variant(&registry, group, 2 + 8)
        );
    }

    #[test]
    fn test_paint_center_ignores_outside_policy() {
        let (mut registry, group) = setup(AutoTileTopology::Four);
        let plain = registry.add_tile();
        let config = solid_outside();
        let resolver = AutoTileResolver::new(&registry, &config);

        let mut map = GameMap::new(1, "Center", 3, 3);
        map.set_tile(0, 0, 0, Some(plain)).unwrap();
        let before = map.clone();

        let changes = resolver.paint(&mut map, 0, 1, 1, group).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(map.get_tile(0, 1, 1), Some(variant(&registry, group, 0)));
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) != (1, 1) {
                    assert_eq!(map.get_tile(0, x, y), before.get_tile(0, x, y));
                }
            }
        }
    }

    #[test]
    fn test_paint_propagates_to_same_group_neighbors() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Row", 3, 3);

        resolver.paint(&mut map, 0, 1, 1, group).unwrap();
        let changes = resolver.paint(&mut map, 0, 2, 1, group).unwrap();

        // (2,1) sees W, (1,1) now sees E
        assert_eq!(map.get_tile(0, 2, 1), Some(variant(&registry, group, 2)));
        assert_eq!(map.get_tile(0, 1, 1), Some(variant(&registry, group, 4)));
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().any(|c| (c.x, c.y) == (1, 1)
            && c.old == Some(variant(&registry, group, 0))));
    }

    #[test]
    fn test_paint_is_one_ring_deep() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Ring", 5, 1);

        // Stale variant two cells away must not be touched
        let stale = variant(&registry, group, 0);
        map.set_tile(0, 0, 0, Some(stale)).unwrap();
        map.set_tile(0, 1, 0, Some(stale)).unwrap();
        resolver.paint(&mut map, 0, 2, 0, group).unwrap();

        assert_eq!(map.get_tile(0, 2, 0), Some(variant(&registry, group, 2)));
        assert_eq!(map.get_tile(0, 1, 0), Some(variant(&registry, group, 2 + 4)));
        assert_eq!(map.get_tile(0, 0, 0), Some(stale));
    }

    #[test]
    fn test_paint_skips_other_groups() {
        let (mut registry, group) = setup(AutoTileTopology::Four);
        let other = registry.add_auto_tile_group(AutoTileTopology::Four);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Mixed", 3, 3);

        let foreign = variant(&registry, other, 0);
        map.set_tile(0, 1, 2, Some(foreign)).unwrap();
        resolver.paint(&mut map, 0, 1, 1, group).unwrap();

        assert_eq!(map.get_tile(0, 1, 1), Some(variant(&registry, group, 0)));
        assert_eq!(map.get_tile(0, 1, 2), Some(foreign));
    }

    #[test]
    fn test_repaint_same_variant_reports_no_change() {
        let (registry, group) = setup(AutoTileTopology::Eight);
        let config = solid_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Again", 3, 3);

        assert_eq!(resolver.paint(&mut map, 0, 1, 1, group).unwrap().len(), 1);
        assert!(resolver.paint(&mut map, 0, 1, 1, group).unwrap().is_empty());
    }

    #[test]
    fn test_eight_neighbor_full_block() {
        let (registry, group) = setup(AutoTileTopology::Eight);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Block", 3, 3);

        for y in 0..3 {
            for x in 0..3 {
                resolver.paint(&mut map, 0, x, y, group).unwrap();
            }
        }

        assert_eq!(map.get_tile(0, 1, 1), Some(variant(&registry, group, 46)));
        // bottom-left corner sees N, NE, E -> raw 7
        assert_eq!(map.get_tile(0, 0, 0), Some(variant(&registry, group, 9)));
        // top-right corner sees S, SW, W -> raw 112
        assert_eq!(map.get_tile(0, 2, 2), Some(variant(&registry, group, 11)));
    }

    #[test]
    fn test_eight_neighbor_outside_solid_corner() {
        let (registry, group) = setup(AutoTileTopology::Eight);
        let config = solid_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Corner", 2, 2);

        for y in 0..2 {
            for x in 0..2 {
                resolver.paint(&mut map, 0, x, y, group).unwrap();
            }
        }
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(map.get_tile(0, x, y), Some(variant(&registry, group, 46)));
            }
        }
    }

    #[test]
    fn test_eight_neighbor_corner_needs_both_edges() {
        let (registry, group) = setup(AutoTileTopology::Eight);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let any = variant(&registry, group, 0);
        let mut map = GameMap::new(1, "Corner", 3, 3);

        // N and NE solid, E empty
        map.set_tile(0, 1, 2, Some(any)).unwrap();
        map.set_tile(0, 2, 2, Some(any)).unwrap();
        assert_eq!(
            resolver.resolve(&map, 0, 1, 1, group).unwrap(),
            variant(&registry, group, 1)
        );

        // E solid too: NE now counts
        map.set_tile(0, 2, 1, Some(any)).unwrap();
        assert_eq!(
            resolver.resolve(&map, 0, 1, 1, group).unwrap(),
            variant(&registry, group, 9)
        );
    }

    #[test]
    fn test_erase_updates_neighbors() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Erase", 3, 1);

        resolver.paint(&mut map, 0, 0, 0, group).unwrap();
        resolver.paint(&mut map, 0, 1, 0, group).unwrap();
        assert_eq!(map.get_tile(0, 0, 0), Some(variant(&registry, group, 4)));

        let changes = resolver.erase(&mut map, 0, 1, 0).unwrap();
        assert_eq!(map.get_tile(0, 1, 0), None);
        assert_eq!(map.get_tile(0, 0, 0), Some(variant(&registry, group, 0)));
        assert_eq!(changes.len(), 2);

        assert!(resolver.erase(&mut map, 0, 2, 0).unwrap().is_empty());
    }

    #[test]
    fn test_preview_does_not_modify() {
        let (registry, group) = setup(AutoTileTopology::Eight);
        let config = solid_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Preview", 4, 4);
        resolver.paint(&mut map, 0, 1, 1, group).unwrap();
        let before = map.clone();

        let preview = resolver.preview(&map, 0, 2, 1, group).unwrap();
        assert_eq!(map, before);

        let applied = resolver.paint(&mut map, 0, 2, 1, group).unwrap();
        assert_eq!(preview, applied);
    }

    #[test]
    fn test_refresh_region_after_plain_writes() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let any = variant(&registry, group, 0);
        let mut map = GameMap::new(1, "Refresh", 3, 1);
        for x in 0..3 {
            map.set_tile(0, x, 0, Some(any)).unwrap();
        }

        let changes = resolver
            .refresh_region(&mut map, 0, 0, 0, 10, 10, group)
            .unwrap();
        assert_eq!(changes.len(), 3);
        assert_eq!(map.get_tile(0, 0, 0), Some(variant(&registry, group, 4)));
        assert_eq!(map.get_tile(0, 1, 0), Some(variant(&registry, group, 6)));
        assert_eq!(map.get_tile(0, 2, 0), Some(variant(&registry, group, 2)));
    }

    #[test]
    fn test_layers_are_independent() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Layers", 3, 3);
        let upper = map.add_layer();

        resolver.paint(&mut map, 0, 1, 2, group).unwrap();
        resolver.paint(&mut map, upper, 1, 1, group).unwrap();
        assert_eq!(map.get_tile(upper, 1, 1), Some(variant(&registry, group, 0)));
        assert_eq!(
            resolver.affected_neighbors(&map, 0, 1, 1, group),
            vec![(1, 2)]
        );
    }

    #[test]
    fn test_rejected_paints() {
        let (registry, group) = setup(AutoTileTopology::Four);
        let config = open_outside();
        let resolver = AutoTileResolver::new(&registry, &config);
        let mut map = GameMap::new(1, "Errors", 2, 2);

        assert!(matches!(
            resolver.paint(&mut map, 0, 2, 0, group),
            Err(AutotileError::OutOfBounds { x: 2, y: 0 })
        ));
        assert!(matches!(
            resolver.paint(&mut map, 1, 0, 0, group),
            Err(AutotileError::LayerOutOfRange { layer: 1, count: 1 })
        ));
        assert!(matches!(
            resolver.paint(&mut map, 0, 0, 0, group + 1),
            Err(AutotileError::UnknownGroup(_))
        ));
        assert_eq!(map.placed_tiles().count(), 0);
    }

    #[test]
    fn test_unmapped_mask_is_an_error() {
        assert!(matches!(
            dense_blob_index(0b0000_0010),
            Err(AutotileError::UnmappedMask { raw: 2 })
        ));
        assert_eq!(dense_blob_index(255).unwrap(), 46);
    }
}
