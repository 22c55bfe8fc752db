//! Ceramic/porcelain tile sold by the box.
//!
//! Coverage of one box is `tile_width × tile_height × tiles_per_box`.

use serde::{Deserialize, Serialize};

use super::{validate_name, validate_price, DetailValue, MaterialDetails};
use crate::errors::{CalcError, CalcResult};
use crate::units::Meters;
use crate::validation::{check_count, check_coverage, check_dimension};

/// Default tile edge (30 × 30 cm)
pub const DEFAULT_TILE_SIZE_M: f64 = 0.3;
/// Largest tile edge accepted
pub const MAX_TILE_SIZE_M: f64 = 2.0;
/// Most tiles a single box may hold
pub const MAX_TILES_PER_BOX: u32 = 1000;

/// Tile priced per box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TileFields")]
pub struct Tile {
    name: String,
    price_per_unit: f64,
    tiles_per_box: u32,
    tile_width: f64,
    tile_height: f64,
}

impl Tile {
    /// Create a box of 0.3 × 0.3 m tiles.
    pub fn new(name: impl Into<String>, price_per_box: f64, tiles_per_box: u32) -> CalcResult<Self> {
        Self::with_dimensions(
            name,
            price_per_box,
            tiles_per_box,
            DEFAULT_TILE_SIZE_M,
            DEFAULT_TILE_SIZE_M,
        )
    }

    /// Create a box of tiles with custom tile size.
    pub fn with_dimensions(
        name: impl Into<String>,
        price_per_box: f64,
        tiles_per_box: u32,
        tile_width: f64,
        tile_height: f64,
    ) -> CalcResult<Self> {
        let tile = Tile {
            name: validate_name(&name.into())?,
            price_per_unit: validate_price(price_per_box)?,
            tiles_per_box: check_tiles_per_box(tiles_per_box)?,
            tile_width: check_tile_width(tile_width)?,
            tile_height: check_tile_height(tile_height)?,
        };
        check_coverage(tile.unit_coverage())?;
        Ok(tile)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price_per_unit(&self) -> f64 {
        self.price_per_unit
    }

    pub fn tiles_per_box(&self) -> u32 {
        self.tiles_per_box
    }

    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    pub fn tile_height(&self) -> f64 {
        self.tile_height
    }

    /// Face area of a single tile (m²)
    pub fn tile_area(&self) -> f64 {
        (Meters(self.tile_width) * Meters(self.tile_height)).value()
    }

    /// Area one box covers (m²)
    pub fn unit_coverage(&self) -> f64 {
        box_coverage(self.tile_width, self.tile_height, self.tiles_per_box)
    }

    pub fn set_name(&mut self, name: &str) -> CalcResult<()> {
        self.name = validate_name(name)?;
        Ok(())
    }

    pub fn set_price_per_unit(&mut self, price: f64) -> CalcResult<()> {
        self.price_per_unit = validate_price(price)?;
        Ok(())
    }

    pub fn set_tiles_per_box(&mut self, count: u32) -> CalcResult<()> {
        let count = check_tiles_per_box(count)?;
        check_coverage(box_coverage(self.tile_width, self.tile_height, count))?;
        self.tiles_per_box = count;
        Ok(())
    }

    pub fn set_tile_width(&mut self, width: f64) -> CalcResult<()> {
        let width = check_tile_width(width)?;
        check_coverage(box_coverage(width, self.tile_height, self.tiles_per_box))?;
        self.tile_width = width;
        Ok(())
    }

    pub fn set_tile_height(&mut self, height: f64) -> CalcResult<()> {
        let height = check_tile_height(height)?;
        check_coverage(box_coverage(self.tile_width, height, self.tiles_per_box))?;
        self.tile_height = height;
        Ok(())
    }

    pub(crate) fn geometry_details(&self, details: &mut MaterialDetails) {
        details.insert("tiles_per_box", DetailValue::Count(self.tiles_per_box));
        details.insert("tile_width", DetailValue::Number(self.tile_width));
        details.insert("tile_height", DetailValue::Number(self.tile_height));
        details.insert("tile_area", DetailValue::Number(self.tile_area()));
    }

    pub(crate) fn geometry_label(&self) -> String {
        format!(
            "{} pcs, {}×{} m",
            self.tiles_per_box, self.tile_width, self.tile_height
        )
    }
}

fn box_coverage(width: f64, height: f64, count: u32) -> f64 {
    ((Meters(width) * Meters(height)) * f64::from(count))
        .normalized()
        .value()
}

fn check_tiles_per_box(count: u32) -> CalcResult<u32> {
    check_count("tiles_per_box", count, MAX_TILES_PER_BOX, "Tiles per box")
}

fn check_tile_width(width: f64) -> CalcResult<f64> {
    check_dimension("tile_width", width, MAX_TILE_SIZE_M, "Tile width")
}

fn check_tile_height(height: f64) -> CalcResult<f64> {
    check_dimension("tile_height", height, MAX_TILE_SIZE_M, "Tile height")
}

#[derive(Deserialize)]
struct TileFields {
    name: String,
    price_per_unit: f64,
    tiles_per_box: u32,
    #[serde(default = "default_tile_size")]
    tile_width: f64,
    #[serde(default = "default_tile_size")]
    tile_height: f64,
}

fn default_tile_size() -> f64 {
    DEFAULT_TILE_SIZE_M
}

impl TryFrom<TileFields> for Tile {
    type Error = CalcError;

    fn try_from(fields: TileFields) -> CalcResult<Self> {
        Tile::with_dimensions(
            fields.name,
            fields.price_per_unit,
            fields.tiles_per_box,
            fields.tile_width,
            fields.tile_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Material;

    #[test]
    fn test_box_coverage() {
        let tile = Tile::new("Metro", 2500.0, 10).unwrap();
        // 0.3 * 0.3 * 10 is 0.8999999999999999 in binary; coverage snaps to 0.9
        assert_eq!(tile.unit_coverage(), 0.9);
        assert!((tile.tile_area() - 0.09).abs() < 1e-12);
    }

    #[test]
    fn test_count_bounds() {
        assert!(Tile::new("T", 100.0, 0).is_err());
        assert!(Tile::new("T", 100.0, 1000).is_ok());
        assert!(Tile::new("T", 100.0, 1001).is_err());
    }

    #[test]
    fn test_size_bounds() {
        assert!(Tile::with_dimensions("T", 100.0, 4, 2.0, 2.0).is_ok());
        assert!(Tile::with_dimensions("T", 100.0, 4, 2.1, 0.3).is_err());
        assert!(Tile::with_dimensions("T", 100.0, 4, 0.3, 0.0).is_err());
    }

    #[test]
    fn test_mosaic_coverage_stays_positive() {
        let tile = Tile::with_dimensions("Mosaic", 100.0, 1, 0.0005, 0.0005).unwrap();
        assert!(tile.unit_coverage() > 0.0);
        assert_eq!(tile.unit_coverage(), 2.5e-7);
        assert!(Material::from(tile).cost_per_sqm().is_finite());
    }

    #[test]
    fn test_vanishing_coverage_rejected() {
        let err = Tile::with_dimensions("Dust", 100.0, 1, 1e-200, 1e-200).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let mut tile = Tile::with_dimensions("Mosaic", 100.0, 1, 1e-200, 0.3).unwrap();
        assert!(tile.set_tile_height(1e-200).is_err());
        assert_eq!(tile.tile_height(), 0.3);
    }

    #[test]
    fn test_setters_recompute_coverage() {
        let mut tile = Tile::new("Metro", 2500.0, 10).unwrap();
        tile.set_tiles_per_box(4).unwrap();
        tile.set_tile_width(0.5).unwrap();
        tile.set_tile_height(0.5).unwrap();
        assert_eq!(tile.unit_coverage(), 1.0);

        assert!(tile.set_tiles_per_box(2000).is_err());
        assert_eq!(tile.tiles_per_box(), 4);
    }

    #[test]
    fn test_deserialize_requires_count() {
        let parsed = serde_json::from_str::<Tile>(r#"{"name":"T","price_per_unit":10.0}"#);
        assert!(parsed.is_err());

        let parsed: Tile =
            serde_json::from_str(r#"{"name":"T","price_per_unit":10.0,"tiles_per_box":10}"#)
                .unwrap();
        assert_eq!(parsed.unit_coverage(), 0.9);
    }
}
