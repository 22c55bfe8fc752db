//! # Calculation Result
//!
//! One computed outcome: how many units of a material to buy for an area and
//! what they cost. Validated once at construction and read-only afterwards.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::{CalcError, CalcResult};
use crate::materials::Material;
use crate::validation::{check_non_negative, check_percent, check_positive};

/// Result of a material calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "material": { "type": "Wallpaper", "name": "Vinyl", "price_per_unit": 1200.0, "roll_width": 0.53, "roll_length": 10.05 },
///   "area": 25.0,
///   "units_needed": 6,
///   "total_cost": 7200.0,
///   "reserve_percent": 10.0
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResult {
    material: Arc<Material>,
    area: f64,
    units_needed: u64,
    total_cost: f64,
    reserve_percent: f64,
}

impl CalculationResult {
    /// Build a result, rejecting non-positive area or unit count, negative
    /// cost, and a reserve outside `[0, 100]`.
    pub fn new(
        material: Arc<Material>,
        area: f64,
        units_needed: u64,
        total_cost: f64,
        reserve_percent: f64,
    ) -> CalcResult<Self> {
        check_positive("area", area, "Area")?;
        if units_needed == 0 {
            return Err(CalcError::invalid_input(
                "units_needed",
                "0",
                "Units needed must be positive",
            ));
        }
        check_non_negative("total_cost", total_cost, "Total cost")?;
        check_percent("reserve_percent", reserve_percent)?;

        Ok(CalculationResult {
            material,
            area,
            units_needed,
            total_cost,
            reserve_percent,
        })
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Covered area without reserve (m²)
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn units_needed(&self) -> u64 {
        self.units_needed
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn reserve_percent(&self) -> f64 {
        self.reserve_percent
    }

    /// Area including the reserve (m²)
    pub fn area_with_reserve(&self) -> f64 {
        self.area * (1.0 + self.reserve_percent / 100.0)
    }

    /// Unit noun of the material ("roll", "box", "pack")
    pub fn unit_label(&self) -> &'static str {
        self.material.unit_type()
    }

    /// Compare by total cost, cheapest first.
    pub fn cmp_by_cost(&self, other: &CalculationResult) -> Ordering {
        self.total_cost.total_cmp(&other.total_cost)
    }
}

impl PartialEq for CalculationResult {
    fn eq(&self, other: &Self) -> bool {
        *self.material == *other.material
            && self.area == other.area
            && self.units_needed == other.units_needed
    }
}

impl std::fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {:.2} m² -> {} {} for {:.2}",
            self.material.display_name(),
            self.area,
            self.units_needed,
            self.unit_label(),
            self.total_cost
        )
    }
}
