use serde::{Deserialize, Serialize};

/// A category of mover with its own passability rule per cell.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementClass {
    Infantry = 0,
    Vehicle = 1,
    Naval = 2,
    Air = 3,
}

impl MovementClass {
    pub const ALL: [MovementClass; 4] = [
        MovementClass::Infantry,
        MovementClass::Vehicle,
        MovementClass::Naval,
        MovementClass::Air,
    ];

    #[inline]
    pub fn bit(self) -> u8 {
        1 << (self as u8)
    }

    #[inline]
    pub fn mask(self) -> Passability {
        Passability(self.bit())
    }
}

/// Bitset over [`MovementClass`], one bit per class.
///
/// Used both as a cell's passability flags and as the query mask handed to
/// searches. A query mask of [`Passability::NONE`] matches no cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Passability(pub u8);

impl Passability {
    pub const NONE: Self = Self(0);
    pub const INFANTRY: Self = Self(1 << 0);
    pub const VEHICLE: Self = Self(1 << 1);
    pub const NAVAL: Self = Self(1 << 2);
    pub const AIR: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub fn contains(self, class: MovementClass) -> bool {
        self.0 & class.bit() != 0
    }

    /// True when the two sets share at least one class. Empty masks never match.
    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<MovementClass> for Passability {
    fn from(class: MovementClass) -> Self {
        class.mask()
    }
}

impl std::ops::BitOr for Passability {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}
