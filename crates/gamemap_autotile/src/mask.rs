//! Neighbor bitmasks for the 16-tile edge and 47-tile blob layouts

/// Bit weights of the 4-neighbor (16 variant) layout.
/// The mask value is the variant index.
pub mod edge {
    pub const N: u8 = 0b0001; // North
    pub const W: u8 = 0b0010; // West
    pub const E: u8 = 0b0100; // East
    pub const S: u8 = 0b1000; // South
}

/// Bit weights of the 8-neighbor (47 variant) layout, clockwise from north
pub mod blob {
    pub const N: u8 = 0b0000_0001; // North
    pub const NE: u8 = 0b0000_0010; // Northeast (corner)
    pub const E: u8 = 0b0000_0100; // East
    pub const SE: u8 = 0b0000_1000; // Southeast (corner)
    pub const S: u8 = 0b0001_0000; // South
    pub const SW: u8 = 0b0010_0000; // Southwest (corner)
    pub const W: u8 = 0b0100_0000; // West
    pub const NW: u8 = 0b1000_0000; // Northwest (corner)

    /// Weights in sampling order: N, NE, E, SE, S, SW, W, NW
    pub const ORDER: [u8; 8] = [N, NE, E, SE, S, SW, W, NW];
}

/// Raw blob mask -> dense variant index. Exactly the 47 masks reachable
/// under the corner rule; order defines the variant layout of a group.
#[rustfmt::skip]
pub const BLOB_47: [(u8, u8); 47] = [
    (0, 0),
    (1, 1), (4, 2), (16, 3), (64, 4),
    (5, 5), (20, 6), (80, 7), (65, 8),
    (7, 9), (28, 10), (112, 11), (193, 12),
    (17, 13), (68, 14),
    (21, 15), (84, 16), (81, 17), (69, 18),
    (23, 19), (92, 20), (113, 21), (197, 22),
    (29, 23), (116, 24), (209, 25), (71, 26),
    (31, 27), (124, 28), (241, 29), (199, 30),
    (85, 31),
    (87, 32), (93, 33), (117, 34), (213, 35),
    (95, 36), (125, 37), (245, 38), (215, 39),
    (119, 40), (221, 41),
    (127, 42), (253, 43), (247, 44), (223, 45),
    (255, 46),
];

const fn build_blob_lookup() -> [Option<u8>; 256] {
    let mut lookup = [None; 256];
    let mut i = 0;
    while i < BLOB_47.len() {
        let (raw, dense) = BLOB_47[i];
        lookup[raw as usize] = Some(dense);
        i += 1;
    }
    lookup
}

static BLOB_LOOKUP: [Option<u8>; 256] = build_blob_lookup();

/// Dense variant index for a raw blob mask, None if the mask is not in the table
pub fn blob_index(raw: u8) -> Option<u8> {
    BLOB_LOOKUP[raw as usize]
}

/// Clear every corner bit whose two bordering edges are not both set
pub fn optimize_bitmask(bitmask: u8) -> u8 {
    use blob::*;

    let mut result = bitmask;

    // NE corner requires N and E
    if (bitmask & (N | E)) != (N | E) {
        result &= !NE;
    }
    // SE corner requires S and E
    if (bitmask & (S | E)) != (S | E) {
        result &= !SE;
    }
    // SW corner requires S and W
    if (bitmask & (S | W)) != (S | W) {
        result &= !SW;
    }
    // NW corner requires N and W
    if (bitmask & (N | W)) != (N | W) {
        result &= !NW;
    }

    result
}

/// 4-neighbor mask from solidity sampled in N, W, E, S order
pub fn edge_mask(solid: [bool; 4]) -> u8 {
    [edge::N, edge::W, edge::E, edge::S]
        .iter()
        .zip(solid)
        .filter(|(_, s)| *s)
        .fold(0u8, |mask, (bit, _)| mask | *bit)
}

/// Raw 8-neighbor mask from solidity sampled clockwise from north,
/// with the corner rule applied
pub fn blob_mask(solid: [bool; 8]) -> u8 {
    let bitmask = blob::ORDER
        .iter()
        .zip(solid)
        .filter(|(_, s)| *s)
        .fold(0u8, |mask, (bit, _)| mask | *bit);
    optimize_bitmask(bitmask)
}
