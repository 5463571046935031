use std::fmt;

use crate::bitfield;

bitfield! {
    /// A block position packed into one 64-bit integer:
    /// x in the top 26 bits, z in the next 26, y in the low 12.
    pub struct BlockPos(u64) {
        x, set_x: signed i32 = 38, 26;
        z, set_z: signed i32 = 12, 26;
        y, set_y: signed i32 = 0, 12;
    }
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        let mut pos = Self::default();
        pos.set_x(x);
        pos.set_y(y);
        pos.set_z(z);
        pos
    }

    pub fn as_long(&self) -> i64 {
        self.0.raw() as i64
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x(), self.y(), self.z())
    }
}
