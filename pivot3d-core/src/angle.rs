/// Angles and rotation axes
use std::f64::consts::TAU;
use std::ops::{Add, Neg, Sub};

/// A rotation axis in the scene's fixed coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Index into per-axis angle storage.
    pub(crate) fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// An angle stored in radians, normalized to `[0, 2π)`.
///
/// Construction and arithmetic always re-normalize, so two angles that
/// differ by a full turn compare equal and `degrees()` / `radians()`
/// views stay in agreement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    radians: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { radians: 0.0 };

    pub fn new(radians: f64) -> Self {
        Self {
            radians: radians.rem_euclid(TAU),
        }
    }

    pub fn from_degrees(degrees: f64) -> Self {
        Self::new(degrees.to_radians())
    }

    pub fn radians(self) -> f64 {
        self.radians
    }

    pub fn degrees(self) -> f64 {
        self.radians.to_degrees()
    }

    pub fn cos(self) -> f64 {
        self.radians.cos()
    }

    pub fn sin(self) -> f64 {
        self.radians.sin()
    }
}

impl Default for Angle {
    fn default() -> Self {
        Angle::ZERO
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::new(self.radians + rhs.radians)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle::new(self.radians - rhs.radians)
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle::new(-self.radians)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_normalization() {
        assert!((Angle::new(TAU + 1.0).radians() - 1.0).abs() < 1e-12);
        assert!((Angle::new(-PI / 2.0).radians() - 3.0 * PI / 2.0).abs() < 1e-12);
        assert_eq!(Angle::new(TAU).radians(), 0.0);
    }

    #[test]
    fn test_degree_views_agree() {
        let a = Angle::from_degrees(90.0);
        assert!((a.radians() - PI / 2.0).abs() < 1e-12);
        assert!((a.degrees() - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_arithmetic_normalizes() {
        let a = Angle::from_degrees(270.0) + Angle::from_degrees(180.0);
        assert!((a.degrees() - 90.0).abs() < 1e-9);

        let b = Angle::from_degrees(45.0) - Angle::from_degrees(90.0);
        assert!((b.degrees() - 315.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let a = Angle::from_degrees(30.0);
        let back = a + Angle::from_degrees(100.0) - Angle::from_degrees(100.0);
        assert!((back.radians() - a.radians()).abs() < 1e-9);
    }
}
