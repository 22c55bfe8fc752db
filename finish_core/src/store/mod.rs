//! # Calculation Store
//!
//! Persistence for completed calculations. The calculator only needs
//! [`CalculationStore::save_calculation`]; [`SqliteStore`] additionally keeps
//! saved materials and export history and answers the read-back and
//! statistics queries used by the console.
//!
//! ## Example
//!
//! ```rust,no_run
//! use finish_core::calculations::MaterialCalculator;
//! use finish_core::store::SqliteStore;
//!
//! let store = SqliteStore::open("data/materials_calculator.db")?;
//! let calc = MaterialCalculator::new().with_store(Box::new(store.clone()));
//! println!("{} calculations stored", store.statistics()?.total_calculations);
//! # Ok::<(), finish_core::errors::CalcError>(())
//! ```

pub mod sqlite;

pub use sqlite::{
    CalculationRecord, DatabaseInfo, ExportRecord, MaterialRecord, RecentSummary, SqliteStore,
    Statistics, TypeDistribution,
};

use crate::calculations::{CalculationKind, CalculationResult, RoomDimensions};
use crate::errors::CalcResult;

/// Destination for completed calculations.
pub trait CalculationStore: Send {
    /// Persist one result and return its row id.
    fn save_calculation(
        &mut self,
        result: &CalculationResult,
        kind: CalculationKind,
        room: Option<&RoomDimensions>,
    ) -> CalcResult<i64>;
}

/// Store that keeps nothing; the calculator default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl CalculationStore for NullStore {
    fn save_calculation(
        &mut self,
        _result: &CalculationResult,
        _kind: CalculationKind,
        _room: Option<&RoomDimensions>,
    ) -> CalcResult<i64> {
        Ok(0)
    }
}
