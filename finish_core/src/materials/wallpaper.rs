//! Wallpaper sold by the roll.
//!
//! Coverage of one roll is `roll_width × roll_length`. The standard Russian
//! roll (0.53 m × 10.05 m) is used when no dimensions are given.

use serde::{Deserialize, Serialize};

use super::{validate_name, validate_price, DetailValue, MaterialDetails};
use crate::errors::{CalcError, CalcResult};
use crate::units::Meters;
use crate::validation::{check_coverage, check_dimension};

/// Standard roll width in metres
pub const DEFAULT_ROLL_WIDTH_M: f64 = 0.53;
/// Standard roll length in metres
pub const DEFAULT_ROLL_LENGTH_M: f64 = 10.05;
/// Widest roll accepted
pub const MAX_ROLL_WIDTH_M: f64 = 5.0;
/// Longest roll accepted
pub const MAX_ROLL_LENGTH_M: f64 = 50.0;

/// Wallpaper priced per roll.
///
/// ## JSON Example
///
/// ```json
/// {
///   "name": "Vinyl Beige",
///   "price_per_unit": 1200.0,
///   "roll_width": 0.53,
///   "roll_length": 10.05
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "WallpaperFields")]
pub struct Wallpaper {
    name: String,
    price_per_unit: f64,
    roll_width: f64,
    roll_length: f64,
}

impl Wallpaper {
    /// Create wallpaper with the standard 0.53 × 10.05 m roll.
    pub fn new(name: impl Into<String>, price_per_roll: f64) -> CalcResult<Self> {
        Self::with_dimensions(name, price_per_roll, DEFAULT_ROLL_WIDTH_M, DEFAULT_ROLL_LENGTH_M)
    }

    /// Create wallpaper with custom roll dimensions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use finish_core::materials::Wallpaper;
    ///
    /// let wide = Wallpaper::with_dimensions("Fleece", 2100.0, 1.06, 10.05).unwrap();
    /// assert_eq!(wide.unit_coverage(), 10.653);
    /// assert!(Wallpaper::with_dimensions("Fleece", 2100.0, 6.0, 10.05).is_err());
    /// ```
    pub fn with_dimensions(
        name: impl Into<String>,
        price_per_roll: f64,
        roll_width: f64,
        roll_length: f64,
    ) -> CalcResult<Self> {
        let wallpaper = Wallpaper {
            name: validate_name(&name.into())?,
            price_per_unit: validate_price(price_per_roll)?,
            roll_width: check_roll_width(roll_width)?,
            roll_length: check_roll_length(roll_length)?,
        };
        check_coverage(wallpaper.unit_coverage())?;
        Ok(wallpaper)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price_per_unit(&self) -> f64 {
        self.price_per_unit
    }

    pub fn roll_width(&self) -> f64 {
        self.roll_width
    }

    pub fn roll_length(&self) -> f64 {
        self.roll_length
    }

    /// Area one roll covers (m²)
    pub fn unit_coverage(&self) -> f64 {
        roll_coverage(self.roll_width, self.roll_length)
    }

    pub fn set_name(&mut self, name: &str) -> CalcResult<()> {
        self.name = validate_name(name)?;
        Ok(())
    }

    pub fn set_price_per_unit(&mut self, price: f64) -> CalcResult<()> {
        self.price_per_unit = validate_price(price)?;
        Ok(())
    }

    pub fn set_roll_width(&mut self, width: f64) -> CalcResult<()> {
        let width = check_roll_width(width)?;
        check_coverage(roll_coverage(width, self.roll_length))?;
        self.roll_width = width;
        Ok(())
    }

    pub fn set_roll_length(&mut self, length: f64) -> CalcResult<()> {
        let length = check_roll_length(length)?;
        check_coverage(roll_coverage(self.roll_width, length))?;
        self.roll_length = length;
        Ok(())
    }

    pub(crate) fn geometry_details(&self, details: &mut MaterialDetails) {
        details.insert("roll_width", DetailValue::Number(self.roll_width));
        details.insert("roll_length", DetailValue::Number(self.roll_length));
    }

    pub(crate) fn geometry_label(&self) -> String {
        format!("{}×{} m", self.roll_width, self.roll_length)
    }
}

fn roll_coverage(width: f64, length: f64) -> f64 {
    (Meters(width) * Meters(length)).normalized().value()
}

fn check_roll_width(width: f64) -> CalcResult<f64> {
    check_dimension("roll_width", width, MAX_ROLL_WIDTH_M, "Roll width")
}

fn check_roll_length(length: f64) -> CalcResult<f64> {
    check_dimension("roll_length", length, MAX_ROLL_LENGTH_M, "Roll length")
}

/// Unvalidated wire shape; deserialization goes through the constructor.
#[derive(Deserialize)]
struct WallpaperFields {
    name: String,
    price_per_unit: f64,
    #[serde(default = "default_roll_width")]
    roll_width: f64,
    #[serde(default = "default_roll_length")]
    roll_length: f64,
}

fn default_roll_width() -> f64 {
    DEFAULT_ROLL_WIDTH_M
}

fn default_roll_length() -> f64 {
    DEFAULT_ROLL_LENGTH_M
}

impl TryFrom<WallpaperFields> for Wallpaper {
    type Error = CalcError;

    fn try_from(fields: WallpaperFields) -> CalcResult<Self> {
        Wallpaper::with_dimensions(
            fields.name,
            fields.price_per_unit,
            fields.roll_width,
            fields.roll_length,
        )
    }
}
