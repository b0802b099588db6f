use serde::{Deserialize, Serialize};

/// Integer world position in block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    #[must_use]
    pub fn dist_sq(&self, other: &BlockPos) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        let dz = f64::from(self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    #[must_use]
    pub fn dist(&self, other: &BlockPos) -> f64 {
        self.dist_sq(other).sqrt()
    }

    /// Distance ignoring the vertical axis, used for annulus sampling.
    #[must_use]
    pub fn horizontal_dist(&self, other: &BlockPos) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dz = f64::from(self.z - other.z);
        (dx * dx + dz * dz).sqrt()
    }
}

/// Fixed-size spatial bucket used to rate-limit structure density.
///
/// Derived from world X/Z by euclidean division so that negative
/// coordinates bucket consistently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub cx: i32,
    pub cz: i32,
}

impl CellKey {
    #[must_use]
    pub fn of(pos: BlockPos, cell_size: i32) -> Self {
        Self {
            cx: pos.x.div_euclid(cell_size),
            cz: pos.z.div_euclid(cell_size),
        }
    }
}
