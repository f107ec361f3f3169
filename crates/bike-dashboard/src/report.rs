//! Plain report output for `--view report`.
//!
//! Writes the dashboard either as aligned text or as pretty-printed JSON.

use std::io::Write;

use anyhow::Result;
use rides_core::formatting::{format_count, format_number, format_share};
use rides_core::summary::Reducer;
use rides_data::analysis::{ChartKind, Dashboard, Panel};

/// Column width of row labels.
const LABEL_WIDTH: usize = 12;

/// Write `dashboard` in `format` (`"text"` or `"json"`).
pub fn write_report<W: Write>(out: &mut W, dashboard: &Dashboard, source: &str, format: &str) -> Result<()> {
    match format {
        "json" => write_json(out, dashboard),
        _ => write_text(out, dashboard, source),
    }
}

/// Pretty-printed JSON of the metadata, metrics and panels.
pub fn write_json<W: Write>(out: &mut W, dashboard: &Dashboard) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(dashboard)?)?;
    Ok(())
}

pub fn write_text<W: Write>(out: &mut W, dashboard: &Dashboard, source: &str) -> Result<()> {
    let meta = &dashboard.metadata;
    writeln!(out, "BIKE SHARING DASHBOARD [{source}]")?;
    writeln!(out, "{}", "=".repeat(60))?;
    let filters = if meta.filters.is_empty() {
        "all records".to_string()
    } else {
        meta.filters.join(", ")
    };
    writeln!(out, "Filters: {filters}")?;
    writeln!(
        out,
        "Selected {} of {} records",
        format_number(meta.records_selected as f64, 0),
        format_number(meta.records_loaded as f64, 0)
    )?;
    if let Some(clusters) = meta.clusters {
        writeln!(out, "Clusters: {clusters}")?;
    }

    let Some(metrics) = &dashboard.metrics else {
        writeln!(out)?;
        writeln!(out, "No records match the current filters.")?;
        return Ok(());
    };

    let users = metrics.casual + metrics.registered;
    writeln!(out)?;
    for (label, value) in [
        ("Rentals", format_count(metrics.total_rentals)),
        ("Mean", format_number(metrics.mean_rentals, 2)),
        ("Temp", format_number(metrics.mean_temperature, 2)),
        ("Casual", format_share(metrics.casual, users)),
        ("Registered", format_share(metrics.registered, users)),
    ] {
        writeln!(out, "{label:<LABEL_WIDTH$}{value:>14}")?;
    }

    for panel in &dashboard.panels {
        writeln!(out)?;
        write_panel(out, panel)?;
    }
    Ok(())
}

fn write_panel<W: Write>(out: &mut W, panel: &Panel) -> Result<()> {
    let kind = match panel.kind {
        ChartKind::Line => "line",
        ChartKind::Bar => "bar",
        ChartKind::Share => "share",
        ChartKind::Scatter => "scatter",
    };
    writeln!(out, "== {} ({kind}, {}) ==", panel.title, panel.y_label)?;

    let whole = panel.total();
    for (i, row) in panel.rows.iter().enumerate() {
        let share = if panel.reducer == Reducer::Sum {
            format!("{:>7}", format_share(row.value, whole))
        } else {
            " ".repeat(7)
        };
        let marker = if i == panel.peak_index { "  *" } else { "" };
        writeln!(
            out,
            "  {:<LABEL_WIDTH$}{:>14}{share}  {:>8} records{marker}",
            row.label,
            format_count(row.value),
            format_number(row.count as f64, 0),
        )?;
    }
    if !panel.caption.is_empty() {
        writeln!(out, "  {}", panel.caption)?;
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rides_core::categories::{time_bucket_for, Dimension};
    use rides_core::models::Observation;
    use rides_data::filter::Predicates;

    fn obs(season: u8, holiday: u8, total: f64) -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2012, 8, 17).unwrap(),
            hour: 17,
            season,
            weather: 1,
            holiday,
            temperature: 0.7,
            windspeed: 0.3,
            casual: total / 5.0,
            registered: total * 4.0 / 5.0,
            total,
            time_bucket: time_bucket_for(17).unwrap(),
            cluster: None,
        }
    }

    fn dashboard(predicates: &Predicates) -> Dashboard {
        let records = vec![obs(1, 0, 1000.0), obs(3, 0, 4000.0), obs(3, 1, 500.0)];
        Dashboard::build(&records, predicates).unwrap()
    }

    fn render(dashboard: &Dashboard, format: &str) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, dashboard, "bike.csv", format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_report_lists_every_panel() {
        let d = dashboard(&Predicates::new());
        let text = render(&d, "text");

        assert!(text.starts_with("BIKE SHARING DASHBOARD [bike.csv]"));
        assert!(text.contains("Filters: all records"));
        assert!(text.contains("Selected 3 of 3 records"));
        for panel in &d.panels {
            assert!(text.contains(&format!("== {} (", panel.title)), "missing {}", panel.title);
        }
        assert!(!text.contains("Clusters:"));
    }

    #[test]
    fn test_text_report_marks_peak_and_shares() {
        let text = render(&dashboard(&Predicates::new()), "text");
        let fall = text
            .lines()
            .find(|l| l.trim_start().starts_with("Fall"))
            .unwrap();
        assert!(fall.contains("4,500"), "got: {fall}");
        assert!(fall.contains("81.8%"), "got: {fall}");
        assert!(fall.ends_with('*'), "got: {fall}");
        let casual = text.lines().find(|l| l.starts_with("Casual")).unwrap();
        assert!(casual.ends_with("20.0%"), "got: {casual}");
    }

    #[test]
    fn test_text_report_mean_panel_has_no_share() {
        let text = render(&dashboard(&Predicates::new()), "text");
        let holiday = text
            .lines()
            .find(|l| l.trim_start().starts_with("Holiday "))
            .unwrap();
        assert!(!holiday.contains('%'), "got: {holiday}");
    }

    #[test]
    fn test_text_report_empty_selection() {
        let preds = Predicates::new().with(Dimension::Weather, 3);
        let text = render(&dashboard(&preds), "text");
        assert!(text.contains("Filters: weather = Light Rain"));
        assert!(text.contains("No records match the current filters."));
        assert!(!text.contains("== "));
    }

    #[test]
    fn test_json_report_is_valid_json() {
        let d = dashboard(&Predicates::new());
        let json: serde_json::Value = serde_json::from_str(&render(&d, "json")).unwrap();
        assert_eq!(json["metadata"]["records_selected"], 3);
        assert_eq!(json["metrics"]["total_rentals"], 5500.0);
        assert_eq!(json["panels"].as_array().unwrap().len(), d.panels.len());
        assert_eq!(json["panels"][1]["rows"][1]["label"], "Fall");
    }
}
