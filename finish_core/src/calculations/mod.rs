//! # Material Calculations
//!
//! This module turns areas into purchasable quantities. Each layer
//! follows the pattern:
//!
//! - [`MaterialCalculator`] - area + material → [`CalculationResult`]
//! - [`RoomCalculator`] - room geometry → area → [`MaterialCalculator`]
//!
//! ## Available Calculations
//!
//! - [`calculator`] - Units and cost for a given area, material comparison
//! - [`room`] - Floor and wall areas with door/window subtraction
//! - [`result`] - The validated outcome shared by both

pub mod calculator;
pub mod result;
pub mod room;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use calculator::MaterialCalculator;
pub use result::CalculationResult;
pub use room::{RoomCalculator, RoomDimensions, SurfaceType};

/// How a calculation's area was obtained; recorded with stored calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    /// Area entered directly
    Simple,
    /// Floor area of a room
    RoomFloor,
    /// Net wall area of a room
    RoomWall,
}

impl CalculationKind {
    /// Get the kind as its stored string
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationKind::Simple => "simple",
            CalculationKind::RoomFloor => "room_floor",
            CalculationKind::RoomWall => "room_wall",
        }
    }
}

impl std::fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
