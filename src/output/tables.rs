use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

use super::styling::Tone;

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Coverage percentage cell colored by [`Tone::for_coverage`]. Unset values
/// render as "n/a".
pub fn color_coded_coverage_cell(pct: Option<f64>) -> Cell {
    let text = match pct {
        Some(pct) => format!("{pct:.1}%"),
        None => "n/a".to_string(),
    };
    Cell::new(text).fg(Tone::for_coverage(pct).table_color())
}
