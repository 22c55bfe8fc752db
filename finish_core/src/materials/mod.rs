//! # Finishing Materials
//!
//! Material definitions and the coverage geometry of each purchasable unit.
//!
//! ## Material Types
//!
//! - **Wallpaper**: sold by the roll, coverage = width × length
//! - **Tile**: sold by the box, coverage = tile width × tile height × tiles per box
//! - **Laminate**: sold by the pack, coverage = plank width × plank length × planks per pack
//!
//! Coverage is always derived from the current geometry and is never set
//! directly. Every constructor and setter validates its inputs and leaves the
//! material unchanged on failure.
//!
//! ## Example
//!
//! ```rust
//! use finish_core::materials::{Material, Tile, Wallpaper};
//!
//! let wallpaper = Material::from(Wallpaper::new("Vinyl Beige", 1200.0).unwrap());
//! let tile = Material::from(Tile::new("Metro White", 2500.0, 10).unwrap());
//!
//! assert_eq!(wallpaper.unit_type(), "roll");
//! assert_eq!(tile.unit_coverage(), 0.9);
//! println!("{:.2} per m²", tile.cost_per_sqm());
//! ```

pub mod laminate;
pub mod tile;
pub mod wallpaper;

pub use laminate::Laminate;
pub use tile::Tile;
pub use wallpaper::Wallpaper;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::validation::{check_positive, check_text};

/// Flat key/value snapshot of a material, for the store and for reports.
pub type MaterialDetails = BTreeMap<&'static str, DetailValue>;

/// One value in a [`MaterialDetails`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailValue {
    Text(String),
    Count(u32),
    Number(f64),
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        DetailValue::Number(value)
    }
}

/// Unified material enum for all finishing materials.
///
/// ## JSON Serialization
///
/// Materials serialize with a "type" discriminator:
///
/// ```json
/// { "type": "Wallpaper", "name": "Vinyl", "price_per_unit": 1200.0, "roll_width": 0.53, "roll_length": 10.05 }
/// { "type": "Tile", "name": "Metro", "price_per_unit": 2500.0, "tiles_per_box": 10, "tile_width": 0.3, "tile_height": 0.3 }
/// { "type": "Laminate", "name": "Oak", "price_per_unit": 1500.0, "planks_per_pack": 8, "plank_width": 0.193, "plank_length": 1.38 }
/// ```
///
/// ## Equality and ordering
///
/// Two materials are equal when name, price and coverage match, whatever
/// their variant. Cheapest-first ordering by cost per m² is available through
/// [`Material::cmp_cost_per_sqm`]; `PartialOrd` is deliberately not
/// implemented because it could not agree with that equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Material {
    /// Wallpaper sold by the roll
    Wallpaper(Wallpaper),
    /// Tile sold by the box
    Tile(Tile),
    /// Laminate sold by the pack
    Laminate(Laminate),
}

impl Material {
    pub fn name(&self) -> &str {
        match self {
            Material::Wallpaper(m) => m.name(),
            Material::Tile(m) => m.name(),
            Material::Laminate(m) => m.name(),
        }
    }

    /// Price of one purchasable unit
    pub fn price_per_unit(&self) -> f64 {
        match self {
            Material::Wallpaper(m) => m.price_per_unit(),
            Material::Tile(m) => m.price_per_unit(),
            Material::Laminate(m) => m.price_per_unit(),
        }
    }

    /// Area one purchasable unit covers (m²), derived from the geometry
    pub fn unit_coverage(&self) -> f64 {
        match self {
            Material::Wallpaper(m) => m.unit_coverage(),
            Material::Tile(m) => m.unit_coverage(),
            Material::Laminate(m) => m.unit_coverage(),
        }
    }

    /// Noun for one purchasable unit, for display
    pub fn unit_type(&self) -> &'static str {
        match self {
            Material::Wallpaper(_) => "roll",
            Material::Tile(_) => "box",
            Material::Laminate(_) => "pack",
        }
    }

    /// Lower-case type key used in the store
    pub fn material_type(&self) -> &'static str {
        match self {
            Material::Wallpaper(_) => "wallpaper",
            Material::Tile(_) => "tile",
            Material::Laminate(_) => "laminate",
        }
    }

    /// Human-readable type name
    pub fn type_label(&self) -> &'static str {
        match self {
            Material::Wallpaper(_) => "Wallpaper",
            Material::Tile(_) => "Tile",
            Material::Laminate(_) => "Laminate",
        }
    }

    /// Get display name for this material
    pub fn display_name(&self) -> String {
        format!("{} '{}'", self.type_label(), self.name())
    }

    /// Price per square metre of covered surface
    pub fn cost_per_sqm(&self) -> f64 {
        self.price_per_unit() / self.unit_coverage()
    }

    /// Compare by cost per m², cheapest first.
    ///
    /// ```rust
    /// use finish_core::materials::{Material, Wallpaper};
    ///
    /// let mut list = vec![
    ///     Material::from(Wallpaper::new("Premium", 3000.0).unwrap()),
    ///     Material::from(Wallpaper::new("Budget", 600.0).unwrap()),
    /// ];
    /// list.sort_by(Material::cmp_cost_per_sqm);
    /// assert_eq!(list[0].name(), "Budget");
    /// ```
    pub fn cmp_cost_per_sqm(&self, other: &Material) -> Ordering {
        self.cost_per_sqm().total_cmp(&other.cost_per_sqm())
    }

    /// Snapshot of every attribute plus the derived coverage and cost per m².
    pub fn detailed_info(&self) -> MaterialDetails {
        let mut details = MaterialDetails::new();
        details.insert("type", self.type_label().into());
        details.insert("name", self.name().into());
        details.insert("price", self.price_per_unit().into());
        details.insert("unit", self.unit_type().into());
        match self {
            Material::Wallpaper(m) => m.geometry_details(&mut details),
            Material::Tile(m) => m.geometry_details(&mut details),
            Material::Laminate(m) => m.geometry_details(&mut details),
        }
        details.insert("coverage", self.unit_coverage().into());
        details.insert("cost_per_sqm", self.cost_per_sqm().into());
        details
    }

    pub fn set_name(&mut self, name: &str) -> CalcResult<()> {
        match self {
            Material::Wallpaper(m) => m.set_name(name),
            Material::Tile(m) => m.set_name(name),
            Material::Laminate(m) => m.set_name(name),
        }
    }

    pub fn set_price_per_unit(&mut self, price: f64) -> CalcResult<()> {
        match self {
            Material::Wallpaper(m) => m.set_price_per_unit(price),
            Material::Tile(m) => m.set_price_per_unit(price),
            Material::Laminate(m) => m.set_price_per_unit(price),
        }
    }

    fn geometry_label(&self) -> String {
        match self {
            Material::Wallpaper(m) => m.geometry_label(),
            Material::Tile(m) => m.geometry_label(),
            Material::Laminate(m) => m.geometry_label(),
        }
    }
}

impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.price_per_unit() == other.price_per_unit()
            && self.unit_coverage() == other.unit_coverage()
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {:.2} per {} ({}, covers {:.2} m²)",
            self.display_name(),
            self.price_per_unit(),
            self.unit_type(),
            self.geometry_label(),
            self.unit_coverage()
        )
    }
}

// Convenience conversions
impl From<Wallpaper> for Material {
    fn from(mat: Wallpaper) -> Self {
        Material::Wallpaper(mat)
    }
}

impl From<Tile> for Material {
    fn from(mat: Tile) -> Self {
        Material::Tile(mat)
    }
}

impl From<Laminate> for Material {
    fn from(mat: Laminate) -> Self {
        Material::Laminate(mat)
    }
}

pub(crate) fn validate_name(name: &str) -> CalcResult<String> {
    check_text("name", name, "Material name")
}

pub(crate) fn validate_price(price: f64) -> CalcResult<f64> {
    check_positive("price_per_unit", price, "Price")
}
