use chrono::NaiveDate;
use comfy_table::{Cell, Table};

use crate::cli::today;
use crate::date_range::PRESETS;
use crate::error::Result;
use crate::fmt;

pub fn run() -> Result<()> {
    println!("{}", format_presets(today()));
    Ok(())
}

pub fn format_presets(today: NaiveDate) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Preset", "Início", "Fim"]);
    for preset in PRESETS {
        let range = preset.range(today);
        let show = |d: Option<NaiveDate>| d.map(fmt::date).unwrap_or_default();
        table.add_row(vec![
            Cell::new(preset.label),
            Cell::new(show(range.start)),
            Cell::new(show(range.end)),
        ]);
    }
    format!("Presets\n{table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_presets_lists_all_in_order() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let out = format_presets(today);
        let today_at = out.find("Today").unwrap();
        let all_time_at = out.find("All Time").unwrap();
        assert!(today_at < all_time_at);
        assert!(out.contains("Last 180 Days"));
        assert!(out.contains("15/03/2024"));
        // This Week starts on Sunday
        assert!(out.contains("10/03/2024"));
    }
}
