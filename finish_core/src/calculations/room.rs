//! # Room Calculator
//!
//! Derives floor or wall area from room geometry and hands it to a
//! [`MaterialCalculator`].
//!
//! ## Wall area
//!
//! ```text
//! perimeter = 2 × (length + width)
//! wall_area = perimeter × height − door_area − window_area
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use finish_core::calculations::room::{RoomCalculator, RoomDimensions, SurfaceType};
//! use finish_core::materials::{Material, Wallpaper};
//!
//! let mut rooms = RoomCalculator::default();
//! let wallpaper = Arc::new(Material::from(Wallpaper::new("Vinyl", 1200.0).unwrap()));
//! let room = RoomDimensions::new(4.0, 3.0).with_height(2.5).with_door_area(1.5).with_window_area(2.0);
//!
//! let result = rooms
//!     .calculate_materials_for_room(&wallpaper, &room, SurfaceType::Wall)
//!     .unwrap();
//! assert_eq!(result.area(), 31.5);
//! ```

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::calculator::MaterialCalculator;
use super::result::CalculationResult;
use super::CalculationKind;
use crate::errors::{CalcError, CalcResult};
use crate::materials::Material;
use crate::validation::{check_non_negative, check_positive};

/// Which surface of the room to cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    Floor,
    Wall,
}

impl SurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurfaceType::Floor => "floor",
            SurfaceType::Wall => "wall",
        }
    }
}

impl FromStr for SurfaceType {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "floor" => Ok(SurfaceType::Floor),
            "wall" => Ok(SurfaceType::Wall),
            other => Err(CalcError::invalid_argument(
                "surface_type",
                format!("Unknown surface type '{other}', expected 'floor' or 'wall'"),
            )),
        }
    }
}

impl std::fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Room geometry in metres; openings in square metres.
///
/// ## JSON Example
///
/// ```json
/// { "length": 4.0, "width": 3.0, "height": 2.5, "door_area": 1.5, "window_area": 2.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub length: f64,
    pub width: f64,
    /// Required for wall calculations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default)]
    pub door_area: f64,
    #[serde(default)]
    pub window_area: f64,
}

impl RoomDimensions {
    pub fn new(length: f64, width: f64) -> Self {
        RoomDimensions {
            length,
            width,
            height: None,
            door_area: 0.0,
            window_area: 0.0,
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    pub fn with_door_area(mut self, area: f64) -> Self {
        self.door_area = area;
        self
    }

    pub fn with_window_area(mut self, area: f64) -> Self {
        self.window_area = area;
        self
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.length + self.width)
    }
}

/// Room-level calculator wrapping one [`MaterialCalculator`].
#[derive(Debug, Default)]
pub struct RoomCalculator {
    calculator: MaterialCalculator,
}

impl RoomCalculator {
    pub fn new(calculator: MaterialCalculator) -> Self {
        RoomCalculator { calculator }
    }

    pub fn calculator(&self) -> &MaterialCalculator {
        &self.calculator
    }

    pub fn calculator_mut(&mut self) -> &mut MaterialCalculator {
        &mut self.calculator
    }

    pub fn into_inner(self) -> MaterialCalculator {
        self.calculator
    }

    pub fn reserve_percent(&self) -> f64 {
        self.calculator.reserve_percent()
    }

    pub fn set_reserve_percent(&mut self, percent: f64) -> CalcResult<()> {
        self.calculator.set_reserve_percent(percent)
    }

    /// Floor area `length × width`.
    pub fn calculate_floor_area(&self, length: f64, width: f64) -> CalcResult<f64> {
        check_positive("length", length, "Length")?;
        check_positive("width", width, "Width")?;
        Ok(length * width)
    }

    /// Net wall area `perimeter × height − door_area − window_area`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if perimeter or height is not positive, or an opening
    ///   is negative
    /// - `InvalidArgument` if the openings leave no wall to cover
    pub fn calculate_wall_area(
        &self,
        perimeter: f64,
        height: f64,
        door_area: f64,
        window_area: f64,
    ) -> CalcResult<f64> {
        check_positive("perimeter", perimeter, "Perimeter")?;
        check_positive("height", height, "Height")?;
        check_non_negative("door_area", door_area, "Door area")?;
        check_non_negative("window_area", window_area, "Window area")?;

        let wall_area = perimeter * height - door_area - window_area;
        if wall_area <= 0.0 {
            return Err(CalcError::invalid_argument(
                "wall_area",
                format!(
                    "Door and window area ({:.2} m²) leaves no wall to cover",
                    door_area + window_area
                ),
            ));
        }
        Ok(wall_area)
    }

    /// Calculate `material` for the floor or the walls of `room`.
    pub fn calculate_materials_for_room(
        &mut self,
        material: &Arc<Material>,
        room: &RoomDimensions,
        surface: SurfaceType,
    ) -> CalcResult<CalculationResult> {
        let (area, kind) = match surface {
            SurfaceType::Floor => (
                self.calculate_floor_area(room.length, room.width)?,
                CalculationKind::RoomFloor,
            ),
            SurfaceType::Wall => {
                let height = room.height.ok_or_else(|| {
                    CalcError::invalid_argument("height", "Wall calculation requires room height")
                })?;
                check_positive("length", room.length, "Length")?;
                check_positive("width", room.width, "Width")?;
                let area = self.calculate_wall_area(
                    room.perimeter(),
                    height,
                    room.door_area,
                    room.window_area,
                )?;
                (area, CalculationKind::RoomWall)
            }
        };

        self.calculator
            .calculate_with_context(material, area, kind, Some(room))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{Laminate, Wallpaper};

    fn wallpaper() -> Arc<Material> {
        Arc::new(Wallpaper::new("Vinyl", 1200.0).unwrap().into())
    }

    #[test]
    fn test_floor_area() {
        let rooms = RoomCalculator::default();
        assert_eq!(rooms.calculate_floor_area(4.0, 3.0).unwrap(), 12.0);
        assert!(rooms.calculate_floor_area(0.0, 3.0).is_err());
        assert!(rooms.calculate_floor_area(4.0, -3.0).is_err());
    }

    #[test]
    fn test_wall_area() {
        let rooms = RoomCalculator::default();
        assert_eq!(rooms.calculate_wall_area(14.0, 2.5, 1.5, 2.0).unwrap(), 31.5);
        assert_eq!(rooms.calculate_wall_area(14.0, 2.5, 0.0, 0.0).unwrap(), 35.0);
        assert!(rooms.calculate_wall_area(0.0, 2.5, 0.0, 0.0).is_err());
        assert!(rooms.calculate_wall_area(14.0, 0.0, 0.0, 0.0).is_err());
        assert!(rooms.calculate_wall_area(14.0, 2.5, -1.0, 0.0).is_err());
    }

    #[test]
    fn test_openings_covering_walls_rejected() {
        let rooms = RoomCalculator::default();
        let err = rooms.calculate_wall_area(4.0, 1.0, 2.0, 2.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
        assert!(rooms.calculate_wall_area(4.0, 1.0, 3.0, 2.0).is_err());
    }

    #[test]
    fn test_room_wall_scenario() {
        let mut rooms = RoomCalculator::default();
        let room = RoomDimensions::new(4.0, 3.0)
            .with_height(2.5)
            .with_door_area(1.5)
            .with_window_area(2.0);

        let result = rooms
            .calculate_materials_for_room(&wallpaper(), &room, SurfaceType::Wall)
            .unwrap();
        assert_eq!(result.area(), 31.5);
        assert_eq!(result.units_needed(), 7);
        assert_eq!(rooms.calculator().history_count(), 1);
    }

    #[test]
    fn test_room_floor() {
        let mut rooms = RoomCalculator::default();
        let laminate: Arc<Material> = Arc::new(Laminate::new("Oak", 1500.0, 8).unwrap().into());
        let result = rooms
            .calculate_materials_for_room(&laminate, &RoomDimensions::new(5.0, 4.0), SurfaceType::Floor)
            .unwrap();
        assert_eq!(result.area(), 20.0);
        assert_eq!(result.units_needed(), 11);
    }

    #[test]
    fn test_wall_requires_height() {
        let mut rooms = RoomCalculator::default();
        let err = rooms
            .calculate_materials_for_room(&wallpaper(), &RoomDimensions::new(4.0, 3.0), SurfaceType::Wall)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
        assert!(rooms.calculator().is_empty());
    }

    #[test]
    fn test_surface_type_parsing() {
        assert_eq!("floor".parse::<SurfaceType>().unwrap(), SurfaceType::Floor);
        assert_eq!(" Wall ".parse::<SurfaceType>().unwrap(), SurfaceType::Wall);
        let err = "ceiling".parse::<SurfaceType>().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_reserve_passthrough() {
        let mut rooms = RoomCalculator::default();
        rooms.set_reserve_percent(15.0).unwrap();
        assert_eq!(rooms.calculator().reserve_percent(), 15.0);
        assert!(rooms.set_reserve_percent(150.0).is_err());
        assert_eq!(rooms.reserve_percent(), 15.0);
    }

    #[test]
    fn test_room_dimensions_json() {
        let room: RoomDimensions = serde_json::from_str(r#"{"length":4.0,"width":3.0}"#).unwrap();
        assert_eq!(room.height, None);
        assert_eq!(room.door_area, 0.0);
        assert_eq!(room.perimeter(), 14.0);
    }
}
