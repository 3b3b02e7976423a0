//! Unit conventions shared by the two solver formats.
//!
//! The evaporation (geometry) format stores coordinates in metres, the relaxation
//! format in Ångström. Every conversion between the two goes through this module.

use nalgebra::Point3;

/// Ångström per metre.
pub const ANGSTROM_PER_METER: f64 = 1e10;
/// Metres per Ångström.
pub const METER_PER_ANGSTROM: f64 = 1e-10;
/// Padding applied to every face of the relaxation cell, in Ångström.
pub const CELL_PADDING_ANGSTROM: f64 = 10.0;

/// Converts a geometry-format position (metres) to relaxation units (Ångström).
#[inline]
pub fn to_relaxation_units(point: &Point3<f64>) -> Point3<f64> {
    *point * ANGSTROM_PER_METER
}

/// Converts a relaxation-format position (Ångström) back to metres.
#[inline]
pub fn to_geometry_units(point: &Point3<f64>) -> Point3<f64> {
    *point * METER_PER_ANGSTROM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metres_scale_to_angstrom() {
        let p = to_relaxation_units(&Point3::new(1.5e-10, -2.0e-9, 0.0));
        assert!((p.x - 1.5).abs() < 1e-12);
        assert!((p.y + 20.0).abs() < 1e-12);
        assert_eq!(p.z, 0.0);
    }

    #[test]
    fn angstrom_scale_back_to_metres() {
        let original = Point3::new(3.2e-10, 1.0e-9, -4.4e-10);
        let back = to_geometry_units(&to_relaxation_units(&original));
        assert!((back - original).norm() < 1e-22);
    }
}
