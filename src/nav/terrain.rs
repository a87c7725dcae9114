//! Terrain input and the fixed terrain → (cost, passability) policy.
//!
//! The terrain kinds are closed domain knowledge, so the mapping is a lookup
//! table indexed by the kind's discriminant rather than anything dispatched at
//! runtime.

use serde::{Deserialize, Serialize};

use super::fixed_math::FixedNum;
use super::movement::Passability;

#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    #[default]
    Grass = 0,
    Dirt = 1,
    Road = 2,
    Bridge = 3,
    Sand = 4,
    Forest = 5,
    Rock = 6,
    Water = 7,
    DeepWater = 8,
    Cliff = 9,
    /// Passable by nothing (map border, chasm).
    Void = 10,
}

/// Movement cost and passability flags of one terrain kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainProfile {
    pub cost: f32,
    pub passability: Passability,
}

const LAND: Passability = Passability::INFANTRY
    .union(Passability::VEHICLE)
    .union(Passability::NAVAL)
    .union(Passability::AIR);
const SEA: Passability = Passability::NAVAL.union(Passability::AIR);
const ROCKY: Passability = Passability::INFANTRY.union(Passability::AIR);

/// Indexed by `TerrainKind as usize`.
const PROFILES: [TerrainProfile; 11] = [
    TerrainProfile { cost: 1.0, passability: LAND },               // Grass
    TerrainProfile { cost: 1.0, passability: LAND },               // Dirt
    TerrainProfile { cost: 0.7, passability: LAND },               // Road
    TerrainProfile { cost: 0.7, passability: LAND },               // Bridge
    TerrainProfile { cost: 1.3, passability: LAND },               // Sand
    TerrainProfile { cost: 1.5, passability: LAND },               // Forest
    TerrainProfile { cost: 2.0, passability: ROCKY },              // Rock
    TerrainProfile { cost: 1.0, passability: SEA },                // Water
    TerrainProfile { cost: 1.0, passability: SEA },                // DeepWater
    TerrainProfile { cost: 1.0, passability: Passability::AIR },   // Cliff
    TerrainProfile { cost: 0.0, passability: Passability::NONE },  // Void
];

impl TerrainKind {
    pub fn profile(self) -> TerrainProfile {
        PROFILES[self as usize]
    }
}

/// One cell of terrain as supplied by the map owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainCell {
    pub kind: TerrainKind,
    /// A structure stands on this cell.
    #[serde(default)]
    pub occupied: bool,
}

impl TerrainCell {
    pub fn new(kind: TerrainKind) -> Self {
        Self { kind, occupied: false }
    }

    pub fn passability(&self) -> Passability {
        self.kind.profile().passability
    }

    /// Traversal cost. Zero when no class can enter or a structure stands here.
    pub fn cost(&self) -> FixedNum {
        let profile = self.kind.profile();
        if self.occupied || profile.passability.is_empty() {
            return FixedNum::ZERO;
        }
        FixedNum::from_num(profile.cost)
    }
}

/// Row-major terrain description (`index = y * width + x`).
///
/// `cells.len() == width * height` holds for every value, deserialized ones
/// included.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TerrainMapData")]
pub struct TerrainMap {
    width: usize,
    height: usize,
    cells: Vec<TerrainCell>,
}

/// Unchecked wire shape of [`TerrainMap`].
#[derive(Deserialize)]
struct TerrainMapData {
    width: usize,
    height: usize,
    cells: Vec<TerrainCell>,
}

impl TryFrom<TerrainMapData> for TerrainMap {
    type Error = String;

    fn try_from(data: TerrainMapData) -> Result<Self, Self::Error> {
        let TerrainMapData { width, height, cells } = data;
        let count = cells.len();
        Self::new(width, height, cells)
            .ok_or_else(|| format!("terrain map is {}x{} but has {} cells", width, height, count))
    }
}

impl TerrainMap {
    /// Returns `None` if `cells` does not hold exactly `width * height` entries.
    pub fn new(width: usize, height: usize, cells: Vec<TerrainCell>) -> Option<Self> {
        if width.checked_mul(height)? != cells.len() {
            return None;
        }
        Some(Self { width, height, cells })
    }

    pub fn filled(width: usize, height: usize, kind: TerrainKind) -> Self {
        Self {
            width,
            height,
            cells: vec![TerrainCell::new(kind); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[TerrainCell] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&TerrainCell> {
        if x < self.width && y < self.height {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Overwrite one cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, cell: TerrainCell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// Parse a terrain map from RON (test fixtures, scenario files).
    pub fn from_ron(source: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let map: TerrainMap = ron::from_str(source)?;
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::movement::MovementClass;

    #[test]
    fn test_profile_costs_match_policy() {
        let cost = |kind: TerrainKind| TerrainCell::new(kind).cost();
        assert_eq!(cost(TerrainKind::Grass), FixedNum::from_num(1.0));
        assert_eq!(cost(TerrainKind::Road), FixedNum::from_num(0.7));
        assert_eq!(cost(TerrainKind::Bridge), FixedNum::from_num(0.7));
        assert_eq!(cost(TerrainKind::Sand), FixedNum::from_num(1.3));
        assert_eq!(cost(TerrainKind::Forest), FixedNum::from_num(1.5));
        assert_eq!(cost(TerrainKind::Rock), FixedNum::from_num(2.0));
        assert_eq!(cost(TerrainKind::Void), FixedNum::ZERO);
    }

    #[test]
    fn test_water_only_naval_and_air() {
        for kind in [TerrainKind::Water, TerrainKind::DeepWater] {
            let flags = TerrainCell::new(kind).passability();
            assert!(flags.contains(MovementClass::Naval));
            assert!(flags.contains(MovementClass::Air));
            assert!(!flags.contains(MovementClass::Infantry));
            assert!(!flags.contains(MovementClass::Vehicle));
        }
    }

    #[test]
    fn test_cliff_and_rock_flags() {
        let cliff = TerrainCell::new(TerrainKind::Cliff).passability();
        assert_eq!(cliff, Passability::AIR);

        let rock = TerrainCell::new(TerrainKind::Rock).passability();
        assert!(rock.contains(MovementClass::Infantry));
        assert!(rock.contains(MovementClass::Air));
        assert!(!rock.contains(MovementClass::Vehicle));
        assert!(!rock.contains(MovementClass::Naval));
    }

    #[test]
    fn test_structure_zeroes_cost() {
        let cell = TerrainCell { kind: TerrainKind::Grass, occupied: true };
        assert_eq!(cell.cost(), FixedNum::ZERO);
        assert_eq!(cell.passability(), Passability::ALL);
    }

    #[test]
    fn test_new_rejects_wrong_cell_count() {
        assert!(TerrainMap::new(3, 3, vec![TerrainCell::default(); 8]).is_none());
        assert!(TerrainMap::new(3, 3, vec![TerrainCell::default(); 9]).is_some());
    }

    #[test]
    fn test_from_ron_parses_and_validates() {
        let source = r#"(
            width: 2,
            height: 1,
            cells: [
                (kind: Grass),
                (kind: Water, occupied: false),
            ],
        )"#;
        let map = TerrainMap::from_ron(source).expect("valid terrain");
        assert_eq!(map.get(1, 0).map(|c| c.kind), Some(TerrainKind::Water));

        let bad = r#"(width: 2, height: 2, cells: [(kind: Grass)])"#;
        assert!(TerrainMap::from_ron(bad).is_err());
    }

    #[test]
    fn test_deserialize_rejects_short_cell_list() {
        let short = "(width: 4, height: 4, cells: [(kind: Grass)])";
        assert!(ron::from_str::<TerrainMap>(short).is_err());

        let exact = "(width: 2, height: 1, cells: [(kind: Grass), (kind: Rock)])";
        let map = ron::from_str::<TerrainMap>(exact).expect("cell count matches");
        assert_eq!(map.cells().len(), 2);
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let huge = format!("(width: {}, height: 2, cells: [])", usize::MAX);
        assert!(TerrainMap::from_ron(&huge).is_err());
        assert!(TerrainMap::new(usize::MAX, 2, Vec::new()).is_none());
    }
}
