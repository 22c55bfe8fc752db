//! Interactive console menu.
//!
//! Generic over its input and output so a whole session can be driven from
//! a byte buffer in tests.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use finish_core::calculations::{
    CalculationResult, MaterialCalculator, RoomCalculator, RoomDimensions, SurfaceType,
};
use finish_core::export::{export_results, ExportFormat};
use finish_core::materials::{Laminate, Material, Tile, Wallpaper};
use finish_core::store::SqliteStore;
use finish_core::validation::{validate_non_negative_number, validate_positive_number};
use finish_core::CalcResult;
use tracing::warn;

const WIDTH: usize = 60;
const HISTORY_LIMIT: u32 = 10;
const RECENT_DAYS: u32 = 7;

pub struct App<R, W> {
    input: R,
    out: W,
    rooms: RoomCalculator,
    store: Option<SqliteStore>,
    materials: Vec<Arc<Material>>,
    results: Vec<CalculationResult>,
    currency: String,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(input: R, out: W, calculator: MaterialCalculator, store: Option<SqliteStore>) -> Self {
        let currency = calculator.currency().to_string();
        App {
            input,
            out,
            rooms: RoomCalculator::new(calculator),
            store,
            materials: Vec::new(),
            results: Vec::new(),
            currency,
        }
    }

    /// Run the menu until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.out, "\nWelcome to the finishing materials calculator!\n")?;

        loop {
            self.show_menu()?;
            let choice = match self.prompt("Choose an action: ") {
                Ok(choice) => choice,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            };

            let outcome = match choice.as_str() {
                "1" => self.add_wallpaper(),
                "2" => self.add_tile(),
                "3" => self.add_laminate(),
                "4" => self.show_materials(),
                "5" => self.calculate_simple(),
                "6" => self.calculate_room(),
                "7" => self.compare_materials(),
                "8" => self.export_results(),
                "9" => self.show_statistics(),
                "10" => self.show_history(),
                "0" => break,
                _ => writeln!(self.out, "Invalid choice!"),
            };

            match outcome {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e),
            }
            writeln!(self.out)?;
        }

        writeln!(self.out, "\nGoodbye!")?;
        self.out.flush()
    }

    pub fn results(&self) -> &[CalculationResult] {
        &self.results
    }

    // ------------------------------------------------------------------------
    // Output helpers
    // ------------------------------------------------------------------------

    fn print_header(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(WIDTH))?;
        writeln!(self.out, "  {}", text.to_uppercase())?;
        writeln!(self.out, "{}", "=".repeat(WIDTH))
    }

    fn print_separator(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "-".repeat(WIDTH))
    }

    fn show_menu(&mut self) -> io::Result<()> {
        self.print_header("Finishing materials calculator")?;
        writeln!(self.out, "1. Add wallpaper")?;
        writeln!(self.out, "2. Add tile")?;
        writeln!(self.out, "3. Add laminate")?;
        writeln!(self.out, "4. Show materials")?;
        writeln!(self.out, "5. Simple calculation (by area)")?;
        writeln!(self.out, "6. Room calculation")?;
        writeln!(self.out, "7. Compare materials")?;
        writeln!(self.out, "8. Export results")?;
        writeln!(self.out, "9. Statistics")?;
        writeln!(self.out, "10. Calculation history")?;
        writeln!(self.out, "0. Exit")?;
        self.print_separator()
    }

    // ------------------------------------------------------------------------
    // Input helpers
    // ------------------------------------------------------------------------

    /// Print `prompt` and read one trimmed line; end of input is `UnexpectedEof`.
    fn prompt(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }

    /// Re-prompt until the user enters a positive number.
    fn prompt_positive(&mut self, prompt: &str, name: &str) -> io::Result<f64> {
        loop {
            let text = self.prompt(prompt)?;
            match validate_positive_number(&text, name) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.out, "Error: {}", e)?,
            }
        }
    }

    /// Re-prompt until the user enters a number that is zero or more.
    fn prompt_non_negative(&mut self, prompt: &str, name: &str) -> io::Result<f64> {
        loop {
            let text = self.prompt(prompt)?;
            match validate_non_negative_number(&text, name) {
                Ok(value) => return Ok(value),
                Err(e) => writeln!(self.out, "Error: {}", e)?,
            }
        }
    }

    /// Re-prompt until the user enters a positive whole number.
    fn prompt_count(&mut self, prompt: &str, name: &str) -> io::Result<u32> {
        loop {
            let value = self.prompt_positive(prompt, name)?;
            if value.fract() == 0.0 && value <= f64::from(u32::MAX) {
                return Ok(value as u32);
            }
            writeln!(self.out, "Error: {} must be a whole number", name)?;
        }
    }

    /// Yes unless the answer starts with `n`.
    fn prompt_yes(&mut self, prompt: &str) -> io::Result<bool> {
        let answer = self.prompt(prompt)?.to_lowercase();
        Ok(!answer.starts_with('n'))
    }

    fn choose_material(&mut self) -> io::Result<Option<Arc<Material>>> {
        self.show_materials()?;
        let text = self.prompt("\nSelect material (number): ")?;
        let material = text
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.materials.get(i))
            .cloned();

        if material.is_none() {
            writeln!(self.out, "Invalid choice!")?;
        }
        Ok(material)
    }

    // ------------------------------------------------------------------------
    // Materials
    // ------------------------------------------------------------------------

    fn add_wallpaper(&mut self) -> io::Result<()> {
        self.print_header("Add wallpaper")?;
        let name = self.prompt("Wallpaper name: ")?;
        let price = self.prompt_positive("Price per roll: ", "Price")?;

        let wallpaper = if self.prompt_yes("Use standard roll size (0.53×10.05 m)? (y/n): ")? {
            Wallpaper::new(name, price)
        } else {
            let width = self.prompt_positive("Roll width (m): ", "Roll width")?;
            let length = self.prompt_positive("Roll length (m): ", "Roll length")?;
            Wallpaper::with_dimensions(name, price, width, length)
        };
        self.register_material(wallpaper.map(Material::from))
    }

    fn add_tile(&mut self) -> io::Result<()> {
        self.print_header("Add tile")?;
        let name = self.prompt("Tile name: ")?;
        let price = self.prompt_positive("Price per box: ", "Price")?;
        let count = self.prompt_count("Tiles per box: ", "Tiles per box")?;

        let tile = if self.prompt_yes("Use standard tile size (0.3×0.3 m)? (y/n): ")? {
            Tile::new(name, price, count)
        } else {
            let width = self.prompt_positive("Tile width (m): ", "Tile width")?;
            let height = self.prompt_positive("Tile height (m): ", "Tile height")?;
            Tile::with_dimensions(name, price, count, width, height)
        };
        self.register_material(tile.map(Material::from))
    }

    fn add_laminate(&mut self) -> io::Result<()> {
        self.print_header("Add laminate")?;
        let name = self.prompt("Laminate name: ")?;
        let price = self.prompt_positive("Price per pack: ", "Price")?;
        let count = self.prompt_count("Planks per pack: ", "Planks per pack")?;

        let laminate = if self.prompt_yes("Use standard plank size (0.193×1.380 m)? (y/n): ")? {
            Laminate::new(name, price, count)
        } else {
            let width = self.prompt_positive("Plank width (m): ", "Plank width")?;
            let length = self.prompt_positive("Plank length (m): ", "Plank length")?;
            Laminate::with_dimensions(name, price, count, width, length)
        };
        self.register_material(laminate.map(Material::from))
    }

    fn register_material(&mut self, material: CalcResult<Material>) -> io::Result<()> {
        let material = match material {
            Ok(material) => material,
            Err(e) => return writeln!(self.out, "Error: {}", e),
        };

        if let Some(store) = &self.store {
            if let Err(e) = store.save_material(&material) {
                warn!(error = %e, "failed to save material");
            }
        }

        writeln!(self.out, "Added: {}", material)?;
        self.materials.push(Arc::new(material));
        Ok(())
    }

    fn show_materials(&mut self) -> io::Result<()> {
        if self.materials.is_empty() {
            return writeln!(self.out, "Material list is empty");
        }

        self.print_header("Materials")?;
        for (idx, material) in self.materials.iter().enumerate() {
            writeln!(self.out, "{}. {}", idx + 1, material)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Calculations
    // ------------------------------------------------------------------------

    fn print_result(&mut self, result: &CalculationResult) -> io::Result<()> {
        self.print_separator()?;
        writeln!(self.out, "CALCULATION RESULT:")?;
        writeln!(self.out, "  Material:     {}", result.material().display_name())?;
        writeln!(self.out, "  Area:         {:.2} m²", result.area())?;
        writeln!(
            self.out,
            "  With reserve: {:.2} m² ({}%)",
            result.area_with_reserve(),
            result.reserve_percent()
        )?;
        writeln!(
            self.out,
            "  Units needed: {} {}",
            result.units_needed(),
            result.unit_label()
        )?;
        writeln!(self.out, "  Total cost:   {}", money(result.total_cost(), &self.currency))?;
        self.print_separator()
    }

    fn calculate_simple(&mut self) -> io::Result<()> {
        if self.materials.is_empty() {
            return writeln!(self.out, "Add materials first!");
        }

        self.print_header("Simple calculation")?;
        let Some(material) = self.choose_material()? else {
            return Ok(());
        };
        let area = self.prompt_positive("Area (m²): ", "Area")?;

        let current = self.rooms.reserve_percent();
        let reserve = self.prompt(&format!("Reserve percent (current: {}%, Enter to keep): ", current))?;
        if !reserve.is_empty() {
            let applied = validate_non_negative_number(&reserve, "Reserve")
                .and_then(|percent| self.rooms.set_reserve_percent(percent));
            if let Err(e) = applied {
                return writeln!(self.out, "Error: {}", e);
            }
        }

        match self.rooms.calculator_mut().calculate(&material, area) {
            Ok(result) => {
                self.print_result(&result)?;
                self.results.push(result);
                Ok(())
            }
            Err(e) => writeln!(self.out, "Error: {}", e),
        }
    }

    fn calculate_room(&mut self) -> io::Result<()> {
        if self.materials.is_empty() {
            return writeln!(self.out, "Add materials first!");
        }

        self.print_header("Room calculation")?;
        let Some(material) = self.choose_material()? else {
            return Ok(());
        };

        writeln!(self.out, "\nSurface:")?;
        writeln!(self.out, "1. Floor")?;
        writeln!(self.out, "2. Walls")?;
        let surface = match self.prompt("Choice: ")?.as_str() {
            "2" => SurfaceType::Wall,
            _ => SurfaceType::Floor,
        };

        let length = self.prompt_positive("Room length (m): ", "Length")?;
        let width = self.prompt_positive("Room width (m): ", "Width")?;
        let mut room = RoomDimensions::new(length, width);
        if surface == SurfaceType::Wall {
            let height = self.prompt_positive("Ceiling height (m): ", "Height")?;
            let doors = self.prompt_non_negative("Door area (m²) [0 if none]: ", "Door area")?;
            let windows = self.prompt_non_negative("Window area (m²) [0 if none]: ", "Window area")?;
            room = room
                .with_height(height)
                .with_door_area(doors)
                .with_window_area(windows);
        }

        match self
            .rooms
            .calculate_materials_for_room(&material, &room, surface)
        {
            Ok(result) => {
                self.print_result(&result)?;
                self.results.push(result);
                Ok(())
            }
            Err(e) => writeln!(self.out, "Error: {}", e),
        }
    }

    fn compare_materials(&mut self) -> io::Result<()> {
        if self.materials.len() < 2 {
            return writeln!(self.out, "At least 2 materials are needed for a comparison!");
        }

        self.print_header("Compare materials")?;
        let area = self.prompt_positive("Area to compare (m²): ", "Area")?;

        let results = match self
            .rooms
            .calculator_mut()
            .compare_materials(&self.materials, area)
        {
            Ok(results) => results,
            Err(e) => return writeln!(self.out, "Error: {}", e),
        };

        writeln!(self.out, "\nCOMPARISON (cheapest first):")?;
        self.print_separator()?;
        for (idx, result) in results.iter().enumerate() {
            writeln!(self.out, "\n{}. {}", idx + 1, result.material().name())?;
            writeln!(
                self.out,
                "   Units: {} {}",
                result.units_needed(),
                result.unit_label()
            )?;
            writeln!(self.out, "   Cost: {}", money(result.total_cost(), &self.currency))?;
        }
        self.print_separator()
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    fn export_results(&mut self) -> io::Result<()> {
        if self.results.is_empty() {
            return writeln!(self.out, "No results to export!");
        }

        self.print_header("Export results")?;
        writeln!(self.out, "Formats:")?;
        writeln!(self.out, "1. PDF")?;
        writeln!(self.out, "2. XLSX (Excel)")?;
        writeln!(self.out, "3. Both")?;
        let formats: &[ExportFormat] = match self.prompt("Choice: ")?.as_str() {
            "1" => &[ExportFormat::Pdf],
            "2" => &[ExportFormat::Xlsx],
            "3" => &[ExportFormat::Pdf, ExportFormat::Xlsx],
            _ => return writeln!(self.out, "Invalid choice!"),
        };
        let base = self.prompt("File name without extension (Enter for automatic): ")?;

        for format in formats {
            let path = (!base.is_empty()).then(|| PathBuf::from(format!("{}.{}", base, format.extension())));
            match export_results(*format, &self.results, &self.currency, path.as_deref()) {
                Ok(saved) => {
                    writeln!(self.out, "Exported to {}: {}", format, saved.display())?;
                    self.record_export(&saved, *format);
                }
                Err(e) => writeln!(self.out, "Export error: {}", e)?,
            }
        }
        Ok(())
    }

    fn record_export(&self, path: &Path, format: ExportFormat) {
        if let Some(store) = &self.store {
            let filename = path.display().to_string();
            if let Err(e) = store.save_export(&filename, format.as_str(), self.results.len()) {
                warn!(error = %e, "failed to record export");
            }
        }
    }

    // ------------------------------------------------------------------------
    // Stored data
    // ------------------------------------------------------------------------

    fn show_statistics(&mut self) -> io::Result<()> {
        let Some(store) = self.store.clone() else {
            return writeln!(self.out, "Database is disabled");
        };

        let stats = match store.statistics() {
            Ok(stats) => stats,
            Err(e) => return writeln!(self.out, "Error: {}", e),
        };

        self.print_header("Statistics")?;
        writeln!(self.out, "Calculations:   {}", stats.total_calculations)?;
        writeln!(self.out, "Total area:     {:.2} m²", stats.total_area)?;
        writeln!(self.out, "Total cost:     {}", money(stats.total_cost, &self.currency))?;
        writeln!(self.out, "Average cost:   {}", money(stats.average_cost, &self.currency))?;
        if let Some(name) = &stats.most_popular_material {
            writeln!(
                self.out,
                "Most popular:   {} ({} calculations)",
                name, stats.popular_material_count
            )?;
        }
        for slice in &stats.material_distribution {
            writeln!(
                self.out,
                "  {}: {} calculations, {}",
                slice.material_type,
                slice.count,
                money(slice.cost, &self.currency)
            )?;
        }

        match store.recent_summary(RECENT_DAYS) {
            Ok(recent) => writeln!(
                self.out,
                "Last {} days:    {} calculations, {}",
                recent.period_days,
                recent.calculations_count,
                money(recent.total_cost, &self.currency)
            ),
            Err(e) => writeln!(self.out, "Error: {}", e),
        }
    }

    fn show_history(&mut self) -> io::Result<()> {
        let Some(store) = self.store.clone() else {
            return writeln!(self.out, "Database is disabled");
        };

        let records = match store.calculation_history(HISTORY_LIMIT) {
            Ok(records) => records,
            Err(e) => return writeln!(self.out, "Error: {}", e),
        };
        if records.is_empty() {
            return writeln!(self.out, "History is empty");
        }

        self.print_header("Calculation history")?;
        for record in &records {
            writeln!(
                self.out,
                "{}  {} ({}) {:.2} m² -> {} units, {} [{}]",
                record.created_at.format("%d.%m.%Y %H:%M"),
                record.material_name,
                record.material_type,
                record.area,
                record.units_needed,
                money(record.total_cost, &self.currency),
                record.calculation_type.as_deref().unwrap_or("simple")
            )?;
        }
        Ok(())
    }
}

fn money(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", amount, currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_session(script: &str, store: Option<SqliteStore>) -> (String, Vec<CalculationResult>) {
        let mut calculator = MaterialCalculator::new();
        if let Some(store) = &store {
            calculator = calculator.with_store(Box::new(store.clone()));
        }
        let mut out = Vec::new();
        let results = {
            let mut app = App::new(Cursor::new(script.as_bytes()), &mut out, calculator, store);
            app.run().unwrap();
            app.results().to_vec()
        };
        (String::from_utf8(out).unwrap(), results)
    }

    #[test]
    fn test_wallpaper_simple_calculation() {
        // add wallpaper, then simple calculation on 25 m² keeping the reserve
        let script = "1\nVinyl\n1200\ny\n5\n1\n25\n\n0\n";
        let (output, results) = run_session(script, None);

        assert!(output.contains("Added: Wallpaper 'Vinyl'"));
        assert!(output.contains("Units needed: 6 roll"));
        assert!(output.contains("Total cost:   7200.00 ₽"));
        assert_eq!(results.len(), 1);
        assert!(output.contains("Goodbye!"));
    }

    #[test]
    fn test_invalid_number_reprompts() {
        let script = "2\nMetro\nabc\n2500\n10\ny\n5\n1\n9\n0\n0\n";
        let (output, results) = run_session(script, None);

        assert!(output.contains("Error: Invalid input"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].units_needed(), 10);
        assert_eq!(results[0].total_cost(), 25000.0);
    }

    #[test]
    fn test_room_wall_calculation() {
        let script = "1\nVinyl\n1200\ny\n6\n1\n2\n4\n3\n2,5\n1.5\n2\n0\n";
        let (output, results) = run_session(script, None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].area(), 31.5);
        assert!(output.contains("Area:         31.50 m²"));
    }

    #[test]
    fn test_compare_requires_two_materials() {
        let script = "1\nA\n1500\ny\n7\n1\nB\n1000\ny\n7\n20\n0\n";
        let (output, _) = run_session(script, None);

        assert!(output.contains("At least 2 materials are needed"));
        let ranking = output.split("COMPARISON").nth(1).unwrap();
        let b_pos = ranking.find("1. B").unwrap();
        assert!(ranking.contains("Cost: 5000.00 ₽"));
        assert!(b_pos < ranking.find("2. A").unwrap());
    }

    #[test]
    fn test_export_and_stored_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("calc.db")).unwrap();
        let base = dir.path().join("report");
        let script = format!(
            "3\nOak\n1500\n8\ny\n5\n1\n20\n\n8\n2\n{}\n9\n10\n0\n",
            base.display()
        );
        let (output, _) = run_session(&script, Some(store.clone()));

        assert!(dir.path().join("report.xlsx").exists());
        assert!(output.contains("Exported to XLSX"));
        assert!(output.contains("Calculations:   1"));
        assert!(output.contains("Most popular:   Oak (1 calculations)"));
        assert!(output.contains("[simple]"));

        assert_eq!(store.list_materials().unwrap().len(), 1);
        assert_eq!(store.export_history(10).unwrap().len(), 1);
    }

    #[test]
    fn test_without_database() {
        let (output, _) = run_session("9\n10\n0\n", None);
        assert_eq!(output.matches("Database is disabled").count(), 2);
    }

    #[test]
    fn test_end_of_input_exits() {
        let (output, _) = run_session("1\nVinyl\n", None);
        assert!(output.contains("Goodbye!"));
    }
}
