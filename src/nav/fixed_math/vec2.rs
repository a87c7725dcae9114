use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use fixed::types::I96F32;

use super::FixedNum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec2 {
    pub x: FixedNum,
    pub y: FixedNum,
}

impl FixedVec2 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO };

    pub fn new(x: FixedNum, y: FixedNum) -> Self {
        Self { x, y }
    }

    pub fn from_f32(x: f32, y: f32) -> Self {
        Self {
            x: FixedNum::from_num(x),
            y: FixedNum::from_num(y),
        }
    }

    /// Render-side conversion. Never feed the result back into navigation.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x.to_num(), self.y.to_num())
    }

    /// Squares in I96F32: in I48F16 any component below ~0.004 squares to zero.
    pub fn length(self) -> FixedNum {
        let len_sq: I96F32 = self.x.wide_mul(self.x) + self.y.wide_mul(self.y);
        if len_sq == I96F32::ZERO {
            return FixedNum::ZERO;
        }
        FixedNum::saturating_from_num(len_sq.sqrt())
    }

    pub fn length_squared(self) -> FixedNum {
        self.x * self.x + self.y * self.y
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == FixedNum::ZERO {
            Self::ZERO
        } else {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        }
    }

    /// Uniformly rescale to `max` if longer, keeping direction.
    pub fn clamp_length(self, max: FixedNum) -> Self {
        if max <= FixedNum::ZERO {
            return Self::ZERO;
        }
        if self.length() > max {
            self.normalize() * max
        } else {
            self
        }
    }

    pub fn distance(self, other: Self) -> FixedNum {
        (self - other).length()
    }
}

impl std::ops::Add for FixedVec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for FixedVec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for FixedVec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<FixedNum> for FixedVec2 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Div<FixedNum> for FixedVec2 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs }
    }
}

impl std::ops::Neg for FixedVec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: FixedNum, b: f32) -> bool {
        (a.to_num::<f32>() - b).abs() < 0.001
    }

    #[test]
    fn test_normalize_zero_stays_zero() {
        assert_eq!(FixedVec2::ZERO.normalize(), FixedVec2::ZERO);
    }

    #[test]
    fn test_normalize_has_unit_length() {
        let v = FixedVec2::from_f32(3.0, 4.0).normalize();
        assert!(approx(v.length(), 1.0), "got {}", v.length());
        assert!(approx(v.x, 0.6));
        assert!(approx(v.y, 0.8));
    }

    #[test]
    fn test_length_of_tiny_vectors() {
        let v = FixedVec2::from_f32(0.002, 0.0);
        assert_eq!(v.length(), v.x);

        let diag = FixedVec2::from_f32(0.003, 0.004);
        assert!(approx(diag.length(), 0.005), "got {}", diag.length());
        assert!(diag.length() > FixedNum::ZERO);
    }

    #[test]
    fn test_clamp_length_preserves_direction() {
        let v = FixedVec2::from_f32(6.0, 8.0).clamp_length(FixedNum::from_num(5));
        assert!(approx(v.length(), 5.0));
        assert!(approx(v.x, 3.0));
        assert!(approx(v.y, 4.0));

        let short = FixedVec2::from_f32(0.5, 0.0);
        assert_eq!(short.clamp_length(FixedNum::from_num(5)), short);
    }
}
