mod bootstrap;
mod report;

use anyhow::{Context, Result};
use rides_core::settings::{LastUsedParams, Settings};
use rides_data::analysis::Dashboard;
use rides_data::export::export_to_path;
use rides_data::filter::Predicates;
use rides_data::reader::{LoadOptions, RecordStore};
use rides_ui::app::App;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;

    // The TUI owns the terminal, so the dashboard view logs to a file only.
    let interactive = settings.view == "dashboard";
    let log_file = settings
        .log_file
        .clone()
        .or_else(|| interactive.then(bootstrap::default_log_path));
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref(), !interactive)?;

    tracing::info!("Bike Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Bandwidth: {}",
        settings.view,
        settings.theme,
        settings.bandwidth
    );

    let data_path = match settings.data.clone() {
        Some(path) => path,
        None => {
            let path = bootstrap::discover_data_path().with_context(|| {
                format!(
                    "no dataset found; pass --data or place {} in the working directory",
                    bootstrap::DATA_FILE
                )
            })?;
            tracing::info!("Discovered dataset at {}", path.display());
            let mut params = LastUsedParams::from(&settings);
            params.data = Some(path.clone());
            if let Err(e) = params.save() {
                tracing::warn!("Could not remember dataset path: {e}");
            }
            path
        }
    };

    let options = LoadOptions {
        validate_totals: settings.validate_totals,
    };
    let mut store = RecordStore::load(&data_path, options)
        .with_context(|| format!("failed to load {}", data_path.display()))?;

    if settings.no_clustering {
        tracing::info!("Clustering disabled");
    } else {
        store
            .assign_clusters(settings.bandwidth)
            .context("clustering failed")?;
    }

    let predicates: Predicates = settings.filter_pairs().into_iter().collect();
    let dashboard = Dashboard::build(store.records(), &predicates)?;

    if let Some(target) = &settings.export {
        export_to_path(&dashboard.records, target)
            .with_context(|| format!("failed to export to {}", target.display()))?;
        if !interactive {
            eprintln!(
                "Exported {} records to {}",
                dashboard.records.len(),
                target.display()
            );
        }
    }

    let source = data_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| data_path.display().to_string());

    if interactive {
        App::new(&settings.theme, dashboard, source).run()?;
    } else {
        let stdout = std::io::stdout();
        report::write_report(&mut stdout.lock(), &dashboard, &source, &settings.format)?;
    }

    Ok(())
}
