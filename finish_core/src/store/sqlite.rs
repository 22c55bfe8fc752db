//! SQLite-backed store.
//!
//! Three tables: `materials`, `calculations`, `export_history`. Every
//! operation opens its own connection, so [`SqliteStore`] is just a path and
//! clones freely.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info};

use super::CalculationStore;
use crate::calculations::{CalculationKind, CalculationResult, RoomDimensions};
use crate::errors::{CalcError, CalcResult};
use crate::materials::Material;
use crate::units::round_to_precision;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS materials (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        material_type TEXT NOT NULL,
        price_per_unit REAL NOT NULL,
        unit_coverage REAL NOT NULL,
        specifications TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS calculations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        material_id INTEGER,
        material_name TEXT NOT NULL,
        material_type TEXT NOT NULL,
        area REAL NOT NULL,
        reserve_percent REAL NOT NULL,
        units_needed INTEGER NOT NULL,
        total_cost REAL NOT NULL,
        calculation_type TEXT,
        room_dimensions TEXT,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (material_id) REFERENCES materials(id)
    );

    CREATE TABLE IF NOT EXISTS export_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL,
        format TEXT NOT NULL,
        calculations_count INTEGER NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    );
";

/// Saved material row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialRecord {
    pub id: i64,
    pub name: String,
    pub material_type: String,
    pub price_per_unit: f64,
    pub unit_coverage: f64,
    /// Snapshot of [`Material::detailed_info`]
    pub specifications: Option<serde_json::Value>,
    pub created_at: NaiveDateTime,
}

/// Saved calculation row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRecord {
    pub id: i64,
    pub material_id: Option<i64>,
    pub material_name: String,
    pub material_type: String,
    pub area: f64,
    pub reserve_percent: f64,
    pub units_needed: i64,
    pub total_cost: f64,
    pub calculation_type: Option<String>,
    pub room_dimensions: Option<RoomDimensions>,
    pub created_at: NaiveDateTime,
}

/// Export history row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRecord {
    pub id: i64,
    pub filename: String,
    pub format: String,
    pub calculations_count: i64,
    pub created_at: NaiveDateTime,
}

/// Per-material-type slice of [`Statistics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDistribution {
    pub material_type: String,
    pub count: i64,
    pub cost: f64,
}

/// Aggregates over every stored calculation. Money and area are rounded to
/// two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_calculations: i64,
    pub total_cost: f64,
    pub total_area: f64,
    pub average_cost: f64,
    pub most_popular_material: Option<String>,
    pub popular_material_count: i64,
    pub material_distribution: Vec<TypeDistribution>,
}

/// Totals over the last `period_days` days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSummary {
    pub period_days: u32,
    pub calculations_count: i64,
    pub total_cost: f64,
    pub total_area: f64,
}

/// Row counts and file size of the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseInfo {
    pub db_path: PathBuf,
    pub materials_count: i64,
    pub calculations_count: i64,
    pub exports_count: i64,
    pub db_size_kb: f64,
}

/// Handle to a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories
    /// and any missing tables.
    pub fn open(path: impl AsRef<Path>) -> CalcResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                CalcError::file_error("create directory", parent.display().to_string(), e.to_string())
            })?;
        }

        let store = SqliteStore { path };
        let conn = store.connect()?;
        conn.execute_batch(SCHEMA).map_err(db_error("create schema"))?;
        debug!(path = %store.path.display(), "opened calculation store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> CalcResult<Connection> {
        Connection::open(&self.path).map_err(db_error("open"))
    }

    // ========================================================================
    // Materials
    // ========================================================================

    /// Save a material with its detailed info; returns the row id.
    pub fn save_material(&self, material: &Material) -> CalcResult<i64> {
        let specs = serde_json::to_string(&material.detailed_info()).map_err(|e| {
            CalcError::SerializationError {
                reason: e.to_string(),
            }
        })?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO materials (name, material_type, price_per_unit, unit_coverage, specifications)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                material.name(),
                material.material_type(),
                material.price_per_unit(),
                material.unit_coverage(),
                specs
            ],
        )
        .map_err(db_error("save_material"))?;

        let id = conn.last_insert_rowid();
        info!(id, name = material.name(), "saved material");
        Ok(id)
    }

    pub fn get_material(&self, id: i64) -> CalcResult<Option<MaterialRecord>> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT id, name, material_type, price_per_unit, unit_coverage, specifications, created_at
             FROM materials WHERE id = ?1",
            params![id],
            material_from_row,
        )
        .optional()
        .map_err(db_error("get_material"))
    }

    /// All saved materials, newest first.
    pub fn list_materials(&self) -> CalcResult<Vec<MaterialRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, name, material_type, price_per_unit, unit_coverage, specifications, created_at
                 FROM materials ORDER BY created_at DESC, id DESC",
            )
            .map_err(db_error("list_materials"))?;

        let rows = stmt
            .query_map([], material_from_row)
            .map_err(db_error("list_materials"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(db_error("list_materials"))
    }

    /// Returns `true` if a row was deleted.
    pub fn delete_material(&self, id: i64) -> CalcResult<bool> {
        let conn = self.connect()?;
        let rows = conn
            .execute("DELETE FROM materials WHERE id = ?1", params![id])
            .map_err(db_error("delete_material"))?;
        Ok(rows > 0)
    }

    // ========================================================================
    // Calculations
    // ========================================================================

    /// Save a calculation; returns the row id.
    pub fn save_calculation(
        &self,
        result: &CalculationResult,
        kind: CalculationKind,
        room: Option<&RoomDimensions>,
    ) -> CalcResult<i64> {
        let room_json = room
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| CalcError::SerializationError {
                reason: e.to_string(),
            })?;
        let units_needed = i64::try_from(result.units_needed()).map_err(|_| {
            CalcError::persistence("save_calculation", "Units needed does not fit in the database")
        })?;
        let material = result.material();

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO calculations
             (material_name, material_type, area, reserve_percent,
              units_needed, total_cost, calculation_type, room_dimensions)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                material.name(),
                material.material_type(),
                result.area(),
                result.reserve_percent(),
                units_needed,
                result.total_cost(),
                kind.as_str(),
                room_json
            ],
        )
        .map_err(db_error("save_calculation"))?;

        let id = conn.last_insert_rowid();
        info!(id, material = material.name(), kind = kind.as_str(), "saved calculation");
        Ok(id)
    }

    /// The `limit` most recent calculations, newest first.
    pub fn calculation_history(&self, limit: u32) -> CalcResult<Vec<CalculationRecord>> {
        self.query_calculations(
            "SELECT id, material_id, material_name, material_type, area, reserve_percent,
                    units_needed, total_cost, calculation_type, room_dimensions, created_at
             FROM calculations ORDER BY created_at DESC, id DESC LIMIT ?1",
            Some(limit),
        )
    }

    /// Every calculation, newest first.
    pub fn all_calculations(&self) -> CalcResult<Vec<CalculationRecord>> {
        self.query_calculations(
            "SELECT id, material_id, material_name, material_type, area, reserve_percent,
                    units_needed, total_cost, calculation_type, room_dimensions, created_at
             FROM calculations ORDER BY created_at DESC, id DESC",
            None,
        )
    }

    fn query_calculations(&self, sql: &str, limit: Option<u32>) -> CalcResult<Vec<CalculationRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql).map_err(db_error("calculation_history"))?;
        let rows = match limit {
            Some(limit) => stmt.query_map(params![limit], calculation_from_row),
            None => stmt.query_map([], calculation_from_row),
        }
        .map_err(db_error("calculation_history"))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(db_error("calculation_history"))
    }

    /// Returns `true` if a row was deleted.
    pub fn delete_calculation(&self, id: i64) -> CalcResult<bool> {
        let conn = self.connect()?;
        let rows = conn
            .execute("DELETE FROM calculations WHERE id = ?1", params![id])
            .map_err(db_error("delete_calculation"))?;
        Ok(rows > 0)
    }

    /// Delete every stored calculation; returns how many were removed.
    pub fn clear_calculations(&self) -> CalcResult<usize> {
        let conn = self.connect()?;
        let rows = conn
            .execute("DELETE FROM calculations", [])
            .map_err(db_error("clear_calculations"))?;
        info!(rows, "cleared stored calculations");
        Ok(rows)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    pub fn statistics(&self) -> CalcResult<Statistics> {
        let conn = self.connect()?;

        let (total_calculations, total_cost, total_area): (i64, f64, f64) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(total_cost), 0.0), COALESCE(SUM(area), 0.0)
                 FROM calculations",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(db_error("statistics"))?;

        let popular: Option<(String, i64)> = conn
            .query_row(
                "SELECT material_name, COUNT(*) AS count FROM calculations
                 GROUP BY material_name ORDER BY count DESC, material_name ASC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(db_error("statistics"))?;

        let mut stmt = conn
            .prepare(
                "SELECT material_type, COUNT(*), COALESCE(SUM(total_cost), 0.0)
                 FROM calculations GROUP BY material_type ORDER BY material_type",
            )
            .map_err(db_error("statistics"))?;
        let material_distribution = stmt
            .query_map([], |row| {
                Ok(TypeDistribution {
                    material_type: row.get(0)?,
                    count: row.get(1)?,
                    cost: round_to_precision(row.get(2)?, 2),
                })
            })
            .map_err(db_error("statistics"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error("statistics"))?;

        let average_cost = if total_calculations > 0 {
            total_cost / total_calculations as f64
        } else {
            0.0
        };
        let (most_popular_material, popular_material_count) = match popular {
            Some((name, count)) => (Some(name), count),
            None => (None, 0),
        };

        Ok(Statistics {
            total_calculations,
            total_cost: round_to_precision(total_cost, 2),
            total_area: round_to_precision(total_area, 2),
            average_cost: round_to_precision(average_cost, 2),
            most_popular_material,
            popular_material_count,
            material_distribution,
        })
    }

    /// Totals of calculations stored in the last `days` days.
    pub fn recent_summary(&self, days: u32) -> CalcResult<RecentSummary> {
        let conn = self.connect()?;
        let (calculations_count, total_cost, total_area): (i64, f64, f64) = conn
            .query_row(
                "SELECT COUNT(*), COALESCE(SUM(total_cost), 0.0), COALESCE(SUM(area), 0.0)
                 FROM calculations WHERE created_at >= datetime('now', ?1)",
                params![format!("-{days} days")],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(db_error("recent_summary"))?;

        Ok(RecentSummary {
            period_days: days,
            calculations_count,
            total_cost: round_to_precision(total_cost, 2),
            total_area: round_to_precision(total_area, 2),
        })
    }

    // ========================================================================
    // Export history
    // ========================================================================

    /// Record an export; returns the row id.
    pub fn save_export(&self, filename: &str, format: &str, calculations_count: usize) -> CalcResult<i64> {
        let count = i64::try_from(calculations_count).map_err(|_| {
            CalcError::persistence("save_export", "Calculation count does not fit in the database")
        })?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO export_history (filename, format, calculations_count) VALUES (?1, ?2, ?3)",
            params![filename, format, count],
        )
        .map_err(db_error("save_export"))?;

        let id = conn.last_insert_rowid();
        info!(id, filename, format, "recorded export");
        Ok(id)
    }

    /// The `limit` most recent exports, newest first.
    pub fn export_history(&self, limit: u32) -> CalcResult<Vec<ExportRecord>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, filename, format, calculations_count, created_at
                 FROM export_history ORDER BY created_at DESC, id DESC LIMIT ?1",
            )
            .map_err(db_error("export_history"))?;

        let rows = stmt
            .query_map(params![limit], |row| {
                Ok(ExportRecord {
                    id: row.get("id")?,
                    filename: row.get("filename")?,
                    format: row.get("format")?,
                    calculations_count: row.get("calculations_count")?,
                    created_at: row.get("created_at")?,
                })
            })
            .map_err(db_error("export_history"))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(db_error("export_history"))
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    pub fn database_info(&self) -> CalcResult<DatabaseInfo> {
        let conn = self.connect()?;
        let count = |table: &str| -> CalcResult<i64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .map_err(db_error("database_info"))
        };
        let materials_count = count("materials")?;
        let calculations_count = count("calculations")?;
        let exports_count = count("export_history")?;

        let size = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(DatabaseInfo {
            db_path: self.path.clone(),
            materials_count,
            calculations_count,
            exports_count,
            db_size_kb: round_to_precision(size as f64 / 1024.0, 2),
        })
    }

    /// Copy the database file to `backup_path`.
    pub fn backup(&self, backup_path: &Path) -> CalcResult<()> {
        fs::copy(&self.path, backup_path).map_err(|e| {
            CalcError::file_error("backup", backup_path.display().to_string(), e.to_string())
        })?;
        info!(path = %backup_path.display(), "backed up calculation store");
        Ok(())
    }
}

impl CalculationStore for SqliteStore {
    fn save_calculation(
        &mut self,
        result: &CalculationResult,
        kind: CalculationKind,
        room: Option<&RoomDimensions>,
    ) -> CalcResult<i64> {
        SqliteStore::save_calculation(self, result, kind, room)
    }
}

fn db_error(operation: &'static str) -> impl Fn(rusqlite::Error) -> CalcError {
    move |e| CalcError::persistence(operation, e.to_string())
}

/// Decode an optional JSON text column, reporting bad JSON as a conversion failure.
fn json_column<T: serde::de::DeserializeOwned>(
    row: &Row<'_>,
    index: usize,
) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(index)?;
    text.map(|t| {
        serde_json::from_str(&t).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}

fn material_from_row(row: &Row<'_>) -> rusqlite::Result<MaterialRecord> {
    Ok(MaterialRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        material_type: row.get(2)?,
        price_per_unit: row.get(3)?,
        unit_coverage: row.get(4)?,
        specifications: json_column(row, 5)?,
        created_at: row.get(6)?,
    })
}

fn calculation_from_row(row: &Row<'_>) -> rusqlite::Result<CalculationRecord> {
    Ok(CalculationRecord {
        id: row.get(0)?,
        material_id: row.get(1)?,
        material_name: row.get(2)?,
        material_type: row.get(3)?,
        area: row.get(4)?,
        reserve_percent: row.get(5)?,
        units_needed: row.get(6)?,
        total_cost: row.get(7)?,
        calculation_type: row.get(8)?,
        room_dimensions: json_column(row, 9)?,
        created_at: row.get(10)?,
    })
}
