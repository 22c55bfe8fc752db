//! # Calculator Settings
//!
//! Configuration for [`MaterialCalculator`](crate::calculations::MaterialCalculator),
//! loadable from a TOML file. Missing keys take their defaults.
//!
//! ```toml
//! reserve_percent = 15.0
//! min_area = 0.5
//! max_area = 500.0
//! precision = 0
//! currency = "€"
//! auto_save = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::units::MAX_PRECISION;
use crate::validation::{check_non_negative, check_percent, check_text};

/// Calculator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Extra area added for cuts and waste, percent of the raw area
    pub reserve_percent: f64,

    /// Smallest area accepted (m²)
    pub min_area: f64,

    /// Largest area accepted (m²)
    pub max_area: f64,

    /// Decimal digits kept in costs
    pub precision: u32,

    /// Currency symbol, display only
    pub currency: String,

    /// Record results in history and forward them to the store
    pub auto_save: bool,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        CalculatorSettings {
            reserve_percent: 10.0,
            min_area: 0.1,
            max_area: 10_000.0,
            precision: 2,
            currency: "₽".to_string(),
            auto_save: true,
        }
    }
}

impl CalculatorSettings {
    /// Check every field and the `min_area <= max_area` relation.
    pub fn validate(&self) -> CalcResult<()> {
        check_percent("reserve_percent", self.reserve_percent)?;
        check_non_negative("min_area", self.min_area, "Minimum area")?;
        check_non_negative("max_area", self.max_area, "Maximum area")?;
        if self.min_area > self.max_area {
            return Err(CalcError::invalid_input(
                "min_area",
                self.min_area.to_string(),
                format!("Minimum area cannot exceed maximum area ({})", self.max_area),
            ));
        }
        check_precision(self.precision)?;
        check_text("currency", &self.currency, "Currency")?;
        Ok(())
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> CalcResult<Self> {
        let settings: CalculatorSettings =
            toml::from_str(text).map_err(|e| CalcError::SerializationError {
                reason: format!("Invalid settings: {}", e),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read", path.display().to_string(), e.to_string()))?;
        Self::from_toml_str(&text)
    }
}

pub(crate) fn check_precision(precision: u32) -> CalcResult<u32> {
    if precision > MAX_PRECISION {
        return Err(CalcError::invalid_input(
            "precision",
            precision.to_string(),
            format!("Precision must be between 0 and {MAX_PRECISION}"),
        ));
    }
    Ok(precision)
}
