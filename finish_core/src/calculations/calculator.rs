//! # Material Calculator
//!
//! Turns a material and an area into a unit count and a rounded cost.
//!
//! ## Formula
//!
//! ```text
//! area_with_reserve = area × (1 + reserve_percent / 100)
//! units_needed      = ceil(area_with_reserve / unit_coverage)
//! total_cost        = round(units_needed × price_per_unit, precision)
//! ```
//!
//! Units always round up: a buyer can't purchase part of a roll.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use finish_core::calculations::MaterialCalculator;
//! use finish_core::materials::{Material, Wallpaper};
//!
//! let mut calc = MaterialCalculator::new();
//! let wallpaper = Arc::new(Material::from(Wallpaper::new("Vinyl", 1200.0).unwrap()));
//!
//! let result = calc.calculate(&wallpaper, 25.0).unwrap();
//! assert_eq!(result.units_needed(), 6);
//! assert_eq!(result.total_cost(), 7200.0);
//! assert_eq!(calc.history_count(), 1);
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use super::result::CalculationResult;
use super::room::RoomDimensions;
use super::CalculationKind;
use crate::errors::{CalcError, CalcResult};
use crate::materials::Material;
use crate::settings::{check_precision, CalculatorSettings};
use crate::store::{CalculationStore, NullStore};
use crate::units::round_to_precision;
use crate::validation::{check_non_negative, check_percent, check_text};

/// Calculator holding its configuration, the in-memory history and an
/// optional store that completed results are forwarded to.
///
/// All mutating operations take `&mut self`; share one instance across
/// threads behind a single `Mutex`.
pub struct MaterialCalculator {
    settings: CalculatorSettings,
    history: Vec<CalculationResult>,
    store: Box<dyn CalculationStore>,
}

impl Default for MaterialCalculator {
    fn default() -> Self {
        MaterialCalculator {
            settings: CalculatorSettings::default(),
            history: Vec::new(),
            store: Box::new(NullStore),
        }
    }
}

impl std::fmt::Debug for MaterialCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterialCalculator")
            .field("settings", &self.settings)
            .field("history_count", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl MaterialCalculator {
    /// Calculator with default settings and no store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator with validated settings.
    pub fn with_settings(settings: CalculatorSettings) -> CalcResult<Self> {
        settings.validate()?;
        Ok(MaterialCalculator {
            settings,
            ..Self::default()
        })
    }

    /// Attach a store; completed results are forwarded to it when auto-save is on.
    pub fn with_store(mut self, store: Box<dyn CalculationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    // ------------------------------------------------------------------------
    // Calculation
    // ------------------------------------------------------------------------

    /// Calculate units and cost of `material` for `area` m².
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if area is not a finite number
    /// - `OutOfRange` if area is outside `[min_area, max_area]`
    pub fn calculate(&mut self, material: &Arc<Material>, area: f64) -> CalcResult<CalculationResult> {
        self.calculate_with_context(material, area, CalculationKind::Simple, None)
    }

    pub(crate) fn calculate_with_context(
        &mut self,
        material: &Arc<Material>,
        area: f64,
        kind: CalculationKind,
        room: Option<&RoomDimensions>,
    ) -> CalcResult<CalculationResult> {
        if !area.is_finite() {
            return Err(CalcError::invalid_input(
                "area",
                area.to_string(),
                "Area must be a number",
            ));
        }
        if area < self.settings.min_area || area > self.settings.max_area {
            return Err(CalcError::out_of_range(
                "area",
                area,
                self.settings.min_area,
                self.settings.max_area,
            ));
        }

        let area_with_reserve = area * (1.0 + self.settings.reserve_percent / 100.0);
        let units = (area_with_reserve / material.unit_coverage()).ceil();
        // 2^64 is the first value that no longer fits in a u64
        if !units.is_finite() || units >= u64::MAX as f64 {
            return Err(CalcError::invalid_argument(
                "material",
                format!(
                    "Coverage of {} is too small for {} m²",
                    material.display_name(),
                    area
                ),
            ));
        }
        let units_needed = units as u64;
        let total_cost = round_to_precision(
            units_needed as f64 * material.price_per_unit(),
            self.settings.precision,
        );
        if !total_cost.is_finite() {
            return Err(CalcError::invalid_argument(
                "material",
                format!("Total cost of {} is not representable", material.display_name()),
            ));
        }

        let result = CalculationResult::new(
            Arc::clone(material),
            area,
            units_needed,
            total_cost,
            self.settings.reserve_percent,
        )?;

        debug!(
            material = material.name(),
            area,
            units_needed,
            total_cost,
            kind = kind.as_str(),
            "calculated material demand"
        );

        if self.settings.auto_save {
            self.history.push(result.clone());
            if let Err(e) = self.store.save_calculation(&result, kind, room) {
                warn!(error = %e, material = material.name(), "failed to save calculation");
            }
        }

        Ok(result)
    }

    /// Calculate every material for the same area, cheapest total first.
    ///
    /// Ties keep the input order.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `materials` is empty
    /// - any error of [`calculate`](Self::calculate)
    pub fn compare_materials(
        &mut self,
        materials: &[Arc<Material>],
        area: f64,
    ) -> CalcResult<Vec<CalculationResult>> {
        if materials.is_empty() {
            return Err(CalcError::invalid_argument(
                "materials",
                "Material list for comparison is empty",
            ));
        }

        let mut results = materials
            .iter()
            .map(|material| self.calculate(material, area))
            .collect::<CalcResult<Vec<_>>>()?;
        results.sort_by(CalculationResult::cmp_by_cost);
        Ok(results)
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    pub fn reserve_percent(&self) -> f64 {
        self.settings.reserve_percent
    }

    pub fn set_reserve_percent(&mut self, percent: f64) -> CalcResult<()> {
        self.settings.reserve_percent = check_percent("reserve_percent", percent)?;
        Ok(())
    }

    pub fn min_area(&self) -> f64 {
        self.settings.min_area
    }

    pub fn set_min_area(&mut self, min_area: f64) -> CalcResult<()> {
        check_non_negative("min_area", min_area, "Minimum area")?;
        if min_area > self.settings.max_area {
            return Err(CalcError::invalid_input(
                "min_area",
                min_area.to_string(),
                format!(
                    "Minimum area cannot exceed maximum area ({})",
                    self.settings.max_area
                ),
            ));
        }
        self.settings.min_area = min_area;
        Ok(())
    }

    pub fn max_area(&self) -> f64 {
        self.settings.max_area
    }

    pub fn set_max_area(&mut self, max_area: f64) -> CalcResult<()> {
        check_non_negative("max_area", max_area, "Maximum area")?;
        if max_area < self.settings.min_area {
            return Err(CalcError::invalid_input(
                "max_area",
                max_area.to_string(),
                format!(
                    "Maximum area cannot be below minimum area ({})",
                    self.settings.min_area
                ),
            ));
        }
        self.settings.max_area = max_area;
        Ok(())
    }

    pub fn precision(&self) -> u32 {
        self.settings.precision
    }

    pub fn set_precision(&mut self, precision: u32) -> CalcResult<()> {
        self.settings.precision = check_precision(precision)?;
        Ok(())
    }

    pub fn currency(&self) -> &str {
        &self.settings.currency
    }

    pub fn set_currency(&mut self, currency: &str) -> CalcResult<()> {
        self.settings.currency = check_text("currency", currency, "Currency")?;
        Ok(())
    }

    pub fn auto_save(&self) -> bool {
        self.settings.auto_save
    }

    pub fn set_auto_save(&mut self, enabled: bool) {
        self.settings.auto_save = enabled;
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    /// Copy of the history, oldest first.
    pub fn history(&self) -> Vec<CalculationResult> {
        self.history.clone()
    }

    pub fn history_count(&self) -> usize {
        self.history.len()
    }

    /// Sum of `total_cost` over the history.
    pub fn total_cost_sum(&self) -> f64 {
        self.history.iter().map(CalculationResult::total_cost).sum()
    }

    /// Empty the in-memory history. The store is not touched.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn get(&self, index: usize) -> Option<&CalculationResult> {
        self.history.get(index)
    }

    pub fn contains(&self, result: &CalculationResult) -> bool {
        self.history.contains(result)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalculationResult> {
        self.history.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl<'a> IntoIterator for &'a MaterialCalculator {
    type Item = &'a CalculationResult;
    type IntoIter = std::slice::Iter<'a, CalculationResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Laminate, Tile, Wallpaper};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn wallpaper(price: f64) -> Arc<Material> {
        Arc::new(Wallpaper::new("Vinyl", price).unwrap().into())
    }

    fn tile() -> Arc<Material> {
        Arc::new(Tile::new("Metro", 2500.0, 10).unwrap().into())
    }

    struct FailingStore;

    impl CalculationStore for FailingStore {
        fn save_calculation(
            &mut self,
            _result: &CalculationResult,
            _kind: CalculationKind,
            _room: Option<&RoomDimensions>,
        ) -> CalcResult<i64> {
            Err(CalcError::persistence("save_calculation", "database is locked"))
        }
    }

    struct CountingStore(Arc<AtomicUsize>);

    impl CalculationStore for CountingStore {
        fn save_calculation(
            &mut self,
            _result: &CalculationResult,
            _kind: CalculationKind,
            _room: Option<&RoomDimensions>,
        ) -> CalcResult<i64> {
            Ok(self.0.fetch_add(1, Ordering::SeqCst) as i64 + 1)
        }
    }

    #[test]
    fn test_wallpaper_scenario() {
        let mut calc = MaterialCalculator::new();
        let result = calc.calculate(&wallpaper(1200.0), 25.0).unwrap();
        assert_eq!(result.units_needed(), 6);
        assert_eq!(result.total_cost(), 7200.0);
        assert_eq!(result.reserve_percent(), 10.0);
    }

    #[test]
    fn test_tile_exact_multiple_without_reserve() {
        let mut calc = MaterialCalculator::new();
        calc.set_reserve_percent(0.0).unwrap();
        let result = calc.calculate(&tile(), 9.0).unwrap();
        assert_eq!(result.units_needed(), 10);
        assert_eq!(result.total_cost(), 25000.0);
    }

    #[test]
    fn test_just_over_multiple_rounds_up() {
        let mut calc = MaterialCalculator::new();
        calc.set_reserve_percent(0.0).unwrap();
        let result = calc.calculate(&tile(), 9.01).unwrap();
        assert_eq!(result.units_needed(), 11);
    }

    #[test]
    fn test_area_bounds() {
        let mut calc = MaterialCalculator::new();
        let err = calc.calculate(&wallpaper(1200.0), 0.05).unwrap_err();
        assert_eq!(err.error_code(), "OUT_OF_RANGE");
        assert!(calc.is_empty());

        let result = calc.calculate(&wallpaper(1200.0), 0.1).unwrap();
        assert_eq!(result.units_needed(), 1);

        assert!(calc.calculate(&wallpaper(1200.0), 10_000.0).is_ok());
        assert!(calc.calculate(&wallpaper(1200.0), 10_000.1).is_err());
        let err = calc.calculate(&wallpaper(1200.0), f64::NAN).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(calc.history_count(), 2);
    }

    #[test]
    fn test_compare_cheaper_material_first() {
        let mut calc = MaterialCalculator::new();
        let laminate: Arc<Material> = Arc::new(
            Laminate::with_dimensions("Oak", 1000.0, 10, 0.5, 1.2).unwrap().into(),
        );
        let materials = vec![wallpaper(1200.0), laminate];

        let results = calc.compare_materials(&materials, 25.0).unwrap();
        assert_eq!(results[0].total_cost(), 5000.0);
        assert_eq!(results[0].material().name(), "Oak");
        assert_eq!(results[1].total_cost(), 7200.0);
    }

    #[test]
    fn test_compare_sorted_by_cost() {
        let mut calc = MaterialCalculator::new();
        let materials = vec![wallpaper(1500.0), wallpaper(1000.0)];
        let results = calc.compare_materials(&materials, 20.0).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].total_cost(), 5000.0);
        assert_eq!(results[1].total_cost(), 7500.0);
    }

    #[test]
    fn test_compare_stable_on_ties() {
        let mut calc = MaterialCalculator::new();
        let first: Arc<Material> = Arc::new(Wallpaper::new("First", 1000.0).unwrap().into());
        let second: Arc<Material> = Arc::new(Wallpaper::new("Second", 1000.0).unwrap().into());
        let results = calc
            .compare_materials(&[first, second], 20.0)
            .unwrap();
        assert_eq!(results[0].material().name(), "First");
        assert_eq!(results[1].material().name(), "Second");
    }

    #[test]
    fn test_compare_empty_list() {
        let mut calc = MaterialCalculator::new();
        let err = calc.compare_materials(&[], 20.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_monotonic_in_area_and_reserve() {
        let mut calc = MaterialCalculator::new();
        let laminate: Arc<Material> = Arc::new(Laminate::new("Oak", 1500.0, 8).unwrap().into());

        let (mut previous_units, mut previous_cost) = (0, 0.0);
        for step in 1..200 {
            let area = step as f64 * 0.37;
            let result = calc.calculate(&laminate, area).unwrap();
            assert!(result.units_needed() >= previous_units);
            assert!(result.total_cost() >= previous_cost);
            previous_units = result.units_needed();
            previous_cost = result.total_cost();
        }

        let (mut previous_units, mut previous_cost) = (0, 0.0);
        for reserve in 0..=100 {
            calc.set_reserve_percent(reserve as f64).unwrap();
            let result = calc.calculate(&laminate, 30.0).unwrap();
            assert!(result.units_needed() >= previous_units);
            assert!(result.total_cost() >= previous_cost);
            previous_units = result.units_needed();
            previous_cost = result.total_cost();
        }
    }

    #[test]
    fn test_tiny_tiles_still_cover_area() {
        let mut calc = MaterialCalculator::new();
        calc.set_reserve_percent(0.0).unwrap();
        let mosaic: Arc<Material> =
            Arc::new(Tile::with_dimensions("Mosaic", 100.0, 1, 0.0005, 0.0005).unwrap().into());

        let result = calc.calculate(&mosaic, 1.0).unwrap();
        let covered = result.units_needed() as f64 * mosaic.unit_coverage();
        assert!(covered >= 1.0);
        assert!(result.units_needed() <= 4_000_001);
        assert!(result.total_cost().is_finite());
    }

    #[test]
    fn test_unit_count_overflow_rejected() {
        let mut calc = MaterialCalculator::new();
        let dust: Arc<Material> =
            Arc::new(Tile::with_dimensions("Dust", 1.0, 1, 1e-160, 1e-160).unwrap().into());
        assert!(dust.unit_coverage() > 0.0);

        let err = calc.calculate(&dust, 1.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
        assert!(calc.is_empty());
    }

    #[test]
    fn test_units_cover_area_with_reserve() {
        let mut calc = MaterialCalculator::new();
        let material = tile();
        for area in [0.1, 1.0, 4.5, 9.0, 17.3, 250.0] {
            let result = calc.calculate(&material, area).unwrap();
            let covered = result.units_needed() as f64 * material.unit_coverage();
            assert!(covered >= result.area_with_reserve() - 1e-9);
        }
    }

    #[test]
    fn test_precision_affects_cost_not_units() {
        let material: Arc<Material> = Arc::new(Wallpaper::new("Odd", 1234.5678).unwrap().into());
        let mut calc = MaterialCalculator::new();
        let two = calc.calculate(&material, 25.0).unwrap();
        assert_eq!(two.total_cost(), 7407.41);

        calc.set_precision(0).unwrap();
        let zero = calc.calculate(&material, 25.0).unwrap();
        assert_eq!(zero.total_cost(), 7407.0);
        assert_eq!(zero.units_needed(), two.units_needed());
    }

    #[test]
    fn test_settings_validation() {
        let mut calc = MaterialCalculator::new();
        assert!(calc.set_reserve_percent(0.0).is_ok());
        assert!(calc.set_reserve_percent(100.0).is_ok());
        assert!(calc.set_reserve_percent(-1.0).is_err());
        assert!(calc.set_reserve_percent(101.0).is_err());
        assert_eq!(calc.reserve_percent(), 100.0);

        assert!(calc.set_min_area(20_000.0).is_err());
        assert!(calc.set_max_area(0.05).is_err());
        assert!(calc.set_min_area(-1.0).is_err());
        assert!(calc.set_max_area(50.0).is_ok());
        assert!(calc.set_min_area(50.0).is_ok());

        assert!(calc.set_precision(10).is_ok());
        assert!(calc.set_precision(11).is_err());
        assert!(calc.set_currency("").is_err());
        calc.set_currency("€").unwrap();
        assert_eq!(calc.currency(), "€");
    }

    #[test]
    fn test_with_settings_rejects_invalid() {
        let settings = CalculatorSettings {
            min_area: 5.0,
            max_area: 1.0,
            ..CalculatorSettings::default()
        };
        assert!(MaterialCalculator::with_settings(settings).is_err());
    }

    #[test]
    fn test_history_operations() {
        let mut calc = MaterialCalculator::new();
        let first = calc.calculate(&wallpaper(1200.0), 25.0).unwrap();
        calc.calculate(&tile(), 9.0).unwrap();

        assert_eq!(calc.history_count(), 2);
        assert_eq!(calc.get(0), Some(&first));
        assert!(calc.contains(&first));
        assert_eq!(calc.total_cost_sum(), 7200.0 + 27500.0);
        assert_eq!(calc.iter().count(), 2);

        let snapshot = calc.history();
        calc.clear_history();
        assert!(calc.is_empty());
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_auto_save_disabled_skips_history_and_store() {
        let saved = Arc::new(AtomicUsize::new(0));
        let mut calc =
            MaterialCalculator::new().with_store(Box::new(CountingStore(Arc::clone(&saved))));
        calc.set_auto_save(false);

        calc.calculate(&wallpaper(1200.0), 25.0).unwrap();
        assert!(calc.is_empty());
        assert_eq!(saved.load(Ordering::SeqCst), 0);

        calc.set_auto_save(true);
        calc.calculate(&wallpaper(1200.0), 25.0).unwrap();
        assert_eq!(calc.history_count(), 1);
        assert_eq!(saved.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_store_failure_does_not_fail_calculation() {
        let mut calc = MaterialCalculator::new().with_store(Box::new(FailingStore));
        let result = calc.calculate(&wallpaper(1200.0), 25.0).unwrap();
        assert_eq!(result.units_needed(), 6);
        assert_eq!(calc.history_count(), 1);
    }
}
