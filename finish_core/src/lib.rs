//! # finish_core - Finishing Material Calculation Engine
//!
//! `finish_core` works out how many rolls of wallpaper, boxes of tile or packs
//! of laminate are needed to cover an area or a room, and what they cost.
//! Materials, results and settings are JSON-serializable; results can be kept
//! in a SQLite store and exported to PDF or XLSX.
//!
//! ## Design Philosophy
//!
//! - **Validated at the edges**: Constructors and setters reject bad values;
//!   nothing is clamped
//! - **Derived, never stored**: Unit coverage is always computed from geometry
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use finish_core::calculations::MaterialCalculator;
//! use finish_core::materials::{Material, Tile};
//!
//! let mut calc = MaterialCalculator::new();
//! calc.set_reserve_percent(0.0).unwrap();
//!
//! let tile = Arc::new(Material::from(Tile::new("Metro", 2500.0, 10).unwrap()));
//! let result = calc.calculate(&tile, 9.0).unwrap();
//! assert_eq!(result.units_needed(), 10);
//! assert_eq!(result.total_cost(), 25000.0);
//! ```
//!
//! ## Modules
//!
//! - [`materials`] - Wallpaper, tile and laminate with their coverage geometry
//! - [`calculations`] - Material and room calculators, calculation results
//! - [`settings`] - Calculator configuration (TOML)
//! - [`store`] - Calculation persistence (SQLite)
//! - [`export`] - PDF and XLSX reports
//! - [`validation`] - Parsing of user-entered numbers
//! - [`units`] - Type-safe unit wrappers and rounding
//! - [`errors`] - Structured error types
//! - [`file_io`] - Atomic file writes

pub mod calculations;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod materials;
pub mod settings;
pub mod store;
pub mod units;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use calculations::{
    CalculationKind, CalculationResult, MaterialCalculator, RoomCalculator, RoomDimensions,
    SurfaceType,
};
pub use errors::{CalcError, CalcResult};
pub use export::{export_results, ExportFormat};
pub use materials::{Laminate, Material, Tile, Wallpaper};
pub use settings::CalculatorSettings;
pub use store::{CalculationStore, NullStore, SqliteStore};
