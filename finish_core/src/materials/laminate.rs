//! Laminate flooring sold by the pack.

use serde::{Deserialize, Serialize};

use super::{validate_name, validate_price, DetailValue, MaterialDetails};
use crate::errors::{CalcError, CalcResult};
use crate::units::Meters;
use crate::validation::{check_count, check_coverage, check_dimension};

/// Typical plank width (193 mm)
pub const DEFAULT_PLANK_WIDTH_M: f64 = 0.193;
/// Typical plank length (1380 mm)
pub const DEFAULT_PLANK_LENGTH_M: f64 = 1.380;
pub const MAX_PLANK_WIDTH_M: f64 = 1.0;
pub const MAX_PLANK_LENGTH_M: f64 = 3.0;
pub const MAX_PLANKS_PER_PACK: u32 = 100;

/// Laminate priced per pack; one pack covers
/// `plank_width × plank_length × planks_per_pack`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LaminateFields")]
pub struct Laminate {
    name: String,
    price_per_unit: f64,
    planks_per_pack: u32,
    plank_width: f64,
    plank_length: f64,
}

impl Laminate {
    /// Create a pack of 0.193 × 1.380 m planks.
    pub fn new(name: impl Into<String>, price_per_pack: f64, planks_per_pack: u32) -> CalcResult<Self> {
        Self::with_dimensions(
            name,
            price_per_pack,
            planks_per_pack,
            DEFAULT_PLANK_WIDTH_M,
            DEFAULT_PLANK_LENGTH_M,
        )
    }

    pub fn with_dimensions(
        name: impl Into<String>,
        price_per_pack: f64,
        planks_per_pack: u32,
        plank_width: f64,
        plank_length: f64,
    ) -> CalcResult<Self> {
        let laminate = Laminate {
            name: validate_name(&name.into())?,
            price_per_unit: validate_price(price_per_pack)?,
            planks_per_pack: check_planks_per_pack(planks_per_pack)?,
            plank_width: check_plank_width(plank_width)?,
            plank_length: check_plank_length(plank_length)?,
        };
        check_coverage(laminate.unit_coverage())?;
        Ok(laminate)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price_per_unit(&self) -> f64 {
        self.price_per_unit
    }

    pub fn planks_per_pack(&self) -> u32 {
        self.planks_per_pack
    }

    pub fn plank_width(&self) -> f64 {
        self.plank_width
    }

    pub fn plank_length(&self) -> f64 {
        self.plank_length
    }

    /// Face area of a single plank (m²)
    pub fn plank_area(&self) -> f64 {
        (Meters(self.plank_width) * Meters(self.plank_length)).value()
    }

    /// Area one pack covers (m²)
    pub fn unit_coverage(&self) -> f64 {
        pack_coverage(self.plank_width, self.plank_length, self.planks_per_pack)
    }

    pub fn set_name(&mut self, name: &str) -> CalcResult<()> {
        self.name = validate_name(name)?;
        Ok(())
    }

    pub fn set_price_per_unit(&mut self, price: f64) -> CalcResult<()> {
        self.price_per_unit = validate_price(price)?;
        Ok(())
    }

    pub fn set_planks_per_pack(&mut self, count: u32) -> CalcResult<()> {
        let count = check_planks_per_pack(count)?;
        check_coverage(pack_coverage(self.plank_width, self.plank_length, count))?;
        self.planks_per_pack = count;
        Ok(())
    }

    pub fn set_plank_width(&mut self, width: f64) -> CalcResult<()> {
        let width = check_plank_width(width)?;
        check_coverage(pack_coverage(width, self.plank_length, self.planks_per_pack))?;
        self.plank_width = width;
        Ok(())
    }

    pub fn set_plank_length(&mut self, length: f64) -> CalcResult<()> {
        let length = check_plank_length(length)?;
        check_coverage(pack_coverage(self.plank_width, length, self.planks_per_pack))?;
        self.plank_length = length;
        Ok(())
    }

    pub(crate) fn geometry_details(&self, details: &mut MaterialDetails) {
        details.insert("planks_per_pack", DetailValue::Count(self.planks_per_pack));
        details.insert("plank_width", DetailValue::Number(self.plank_width));
        details.insert("plank_length", DetailValue::Number(self.plank_length));
        details.insert("plank_area", DetailValue::Number(self.plank_area()));
    }

    pub(crate) fn geometry_label(&self) -> String {
        format!(
            "{} pcs, {}×{} m",
            self.planks_per_pack, self.plank_width, self.plank_length
        )
    }
}

fn pack_coverage(width: f64, length: f64, count: u32) -> f64 {
    ((Meters(width) * Meters(length)) * f64::from(count))
        .normalized()
        .value()
}

fn check_planks_per_pack(count: u32) -> CalcResult<u32> {
    check_count("planks_per_pack", count, MAX_PLANKS_PER_PACK, "Planks per pack")
}

fn check_plank_width(width: f64) -> CalcResult<f64> {
    check_dimension("plank_width", width, MAX_PLANK_WIDTH_M, "Plank width")
}

fn check_plank_length(length: f64) -> CalcResult<f64> {
    check_dimension("plank_length", length, MAX_PLANK_LENGTH_M, "Plank length")
}

#[derive(Deserialize)]
struct LaminateFields {
    name: String,
    price_per_unit: f64,
    planks_per_pack: u32,
    #[serde(default = "default_plank_width")]
    plank_width: f64,
    #[serde(default = "default_plank_length")]
    plank_length: f64,
}

fn default_plank_width() -> f64 {
    DEFAULT_PLANK_WIDTH_M
}

fn default_plank_length() -> f64 {
    DEFAULT_PLANK_LENGTH_M
}

impl TryFrom<LaminateFields> for Laminate {
    type Error = CalcError;

    fn try_from(fields: LaminateFields) -> CalcResult<Self> {
        Laminate::with_dimensions(
            fields.name,
            fields.price_per_unit,
            fields.planks_per_pack,
            fields.plank_width,
            fields.plank_length,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pack_coverage() {
        let lam = Laminate::new("Oak 33", 1500.0, 8).unwrap();
        assert_eq!(lam.unit_coverage(), 2.13072);
    }

    #[test]
    fn test_bounds() {
        assert!(Laminate::new("L", 1500.0, 0).is_err());
        assert!(Laminate::new("L", 1500.0, 101).is_err());
        assert!(Laminate::with_dimensions("L", 1500.0, 8, 1.01, 1.38).is_err());
        assert!(Laminate::with_dimensions("L", 1500.0, 8, 0.2, 3.01).is_err());
        assert!(Laminate::with_dimensions("L", 1500.0, 100, 1.0, 3.0).is_ok());
    }

    #[test]
    fn test_setters() {
        let mut lam = Laminate::new("Oak 33", 1500.0, 8).unwrap();
        lam.set_plank_width(0.25).unwrap();
        lam.set_plank_length(2.0).unwrap();
        lam.set_planks_per_pack(10).unwrap();
        assert_eq!(lam.unit_coverage(), 5.0);
        assert_eq!(lam.plank_area(), 0.5);

        assert!(lam.set_plank_length(0.0).is_err());
        assert_eq!(lam.plank_length(), 2.0);
    }
}
