//! Dashboard analysis pipeline.
//!
//! Turns the loaded observations and the active filters into a [`Dashboard`]:
//! scalar metrics plus one [`Panel`] per chart, ready for the UI layer or the
//! plain-text / JSON report.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use rides_core::categories::Dimension;
use rides_core::formatting::{format_count, format_share};
use rides_core::models::{Measure, Observation};
use rides_core::summary::{MetricSummarizer, Reducer};
use rides_core::{Result, RidesError};
use serde::Serialize;
use tracing::info;

use crate::aggregator::{cluster_label, AggregateRow, Aggregator, GroupKey};
use crate::filter::{filter, Predicates};

// ── Panel ─────────────────────────────────────────────────────────────────────

/// How a panel's rows should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    /// Ordered trend, one point per row.
    Line,
    /// One bar per row.
    Bar,
    /// Parts of a whole.
    Share,
    /// Labeled point clouds, one [`PointSeries`] per group.
    Scatter,
}

/// `(x, y)` points of one group of a scatter panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// One chart of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    /// One-line takeaway shown under the chart.
    pub caption: String,
    pub kind: ChartKind,
    pub x_label: String,
    pub y_label: String,
    /// Non-empty, in display order.
    pub rows: Vec<AggregateRow>,
    /// Index of the largest row.
    pub peak_index: usize,
    /// How row values were reduced; sums add up to a whole, means do not.
    pub reducer: Reducer,
    /// Point series of scatter panels, empty otherwise.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<PointSeries>,
}

impl Panel {
    /// Fails with [`RidesError::EmptyGroup`] when `rows` is empty.
    pub fn new(
        title: impl Into<String>,
        kind: ChartKind,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
        rows: Vec<AggregateRow>,
    ) -> Result<Self> {
        let title = title.into();
        let peak_index = Aggregator::peak_index(&rows)
            .ok_or_else(|| RidesError::EmptyGroup(format!("panel '{title}' has no rows")))?;
        Ok(Self {
            title,
            caption: String::new(),
            kind,
            x_label: x_label.into(),
            y_label: y_label.into(),
            rows,
            peak_index,
            reducer: Reducer::Sum,
            series: Vec::new(),
        })
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = caption.into();
        self
    }

    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn with_series(mut self, series: Vec<PointSeries>) -> Self {
        self.series = series;
        self
    }

    pub fn peak(&self) -> &AggregateRow {
        &self.rows[self.peak_index]
    }

    /// Sum of all row values.
    pub fn total(&self) -> f64 {
        Aggregator::total(&self.rows)
    }
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// Headline numbers for the selected records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub records: usize,
    /// Sum of total rentals.
    pub total_rentals: f64,
    /// Mean total rentals per record.
    pub mean_rentals: f64,
    pub mean_temperature: f64,
    pub casual: f64,
    pub registered: f64,
}

/// Metadata produced alongside the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetadata {
    /// RFC 3339 timestamp when this dashboard was generated.
    pub generated_at: String,
    /// Records in the loaded dataset.
    pub records_loaded: usize,
    /// Records left after filtering.
    pub records_selected: usize,
    /// Active filters, e.g. `"season = Summer"`.
    pub filters: Vec<String>,
    /// Distinct cluster labels among the selected records, if clustered.
    pub clusters: Option<usize>,
    /// Wall-clock seconds spent filtering and aggregating.
    pub build_time_seconds: f64,
}

/// The complete output of [`Dashboard::build`].
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub metadata: DashboardMetadata,
    /// `None` when no record matched the filters.
    pub metrics: Option<DashboardMetrics>,
    /// Empty when no record matched the filters.
    pub panels: Vec<Panel>,
    /// The selected records.
    #[serde(skip)]
    pub records: Vec<Observation>,
}

impl Dashboard {
    /// Filter `all` by `predicates` and build every panel and metric.
    pub fn build(all: &[Observation], predicates: &Predicates) -> Result<Self> {
        let start = Instant::now();
        let records = filter(all, predicates);

        let (metrics, panels) = if records.is_empty() {
            (None, Vec::new())
        } else {
            (Some(metrics_for(&records)?), panels_for(&records)?)
        };

        let clusters = cluster_count(&records);
        let metadata = DashboardMetadata {
            generated_at: Utc::now().to_rfc3339(),
            records_loaded: all.len(),
            records_selected: records.len(),
            filters: predicates.describe(),
            clusters,
            build_time_seconds: start.elapsed().as_secs_f64(),
        };
        info!(
            selected = metadata.records_selected,
            loaded = metadata.records_loaded,
            panels = panels.len(),
            "Built dashboard"
        );

        Ok(Self {
            metadata,
            metrics,
            panels,
            records,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn metrics_for(records: &[Observation]) -> Result<DashboardMetrics> {
    let total = MetricSummarizer::summarize(records, Measure::Total);
    let temperature = MetricSummarizer::summarize(records, Measure::Temperature);
    Ok(DashboardMetrics {
        records: total.count,
        total_rentals: total.sum,
        mean_rentals: total.mean()?,
        mean_temperature: temperature.mean()?,
        casual: MetricSummarizer::summarize(records, Measure::Casual).sum,
        registered: MetricSummarizer::summarize(records, Measure::Registered).sum,
    })
}

/// Distinct cluster labels, or `None` unless every record carries one.
fn cluster_count(records: &[Observation]) -> Option<usize> {
    if records.is_empty() || records.iter().any(|o| o.cluster.is_none()) {
        return None;
    }
    let mut ids: Vec<usize> = records.iter().filter_map(|o| o.cluster).collect();
    ids.sort_unstable();
    ids.dedup();
    Some(ids.len())
}

fn dimension_panel(
    records: &[Observation],
    title: &str,
    kind: ChartKind,
    dimension: Dimension,
    reducer: Reducer,
    y_label: &str,
) -> Result<Panel> {
    let rows = Aggregator::aggregate(records, GroupKey::Dimension(dimension), Measure::Total, reducer)?;
    let panel = Panel::new(title, kind, dimension.name(), y_label, rows)?.with_reducer(reducer);
    let peak = panel.peak();
    let caption = format!("Highest: {} ({})", peak.label, format_count(peak.value));
    Ok(panel.with_caption(caption))
}

fn panels_for(records: &[Observation]) -> Result<Vec<Panel>> {
    let mut panels = vec![
        dimension_panel(
            records,
            "Monthly Rentals",
            ChartKind::Line,
            Dimension::Month,
            Reducer::Sum,
            "total rentals",
        )?,
        dimension_panel(
            records,
            "Rentals by Season",
            ChartKind::Bar,
            Dimension::Season,
            Reducer::Sum,
            "total rentals",
        )?,
        user_profile_panel(records)?,
        dimension_panel(
            records,
            "Holiday Effect",
            ChartKind::Bar,
            Dimension::Holiday,
            Reducer::Mean,
            "mean rentals",
        )?,
        dimension_panel(
            records,
            "Rentals by Time of Day",
            ChartKind::Bar,
            Dimension::TimeBucket,
            Reducer::Sum,
            "total rentals",
        )?,
        dimension_panel(
            records,
            "Weather Effect",
            ChartKind::Bar,
            Dimension::Weather,
            Reducer::Mean,
            "mean rentals",
        )?,
    ];

    if cluster_count(records).is_some() {
        panels.push(cluster_panel(records)?);
    }

    Ok(panels)
}

/// Temperature against total rentals, one point series per cluster. Rows
/// keep the per-cluster mean and record count for the side table.
fn cluster_panel(records: &[Observation]) -> Result<Panel> {
    let rows = Aggregator::aggregate(records, GroupKey::Cluster, Measure::Total, Reducer::Mean)?;

    let mut by_cluster: BTreeMap<usize, Vec<(f64, f64)>> = BTreeMap::new();
    for obs in records {
        let id = obs.cluster.ok_or(RidesError::ClusterNotAssigned)?;
        by_cluster
            .entry(id)
            .or_default()
            .push((obs.temperature, obs.total));
    }
    let series = by_cluster
        .into_iter()
        .map(|(id, points)| PointSeries {
            label: cluster_label(id),
            points,
        })
        .collect();

    let panel = Panel::new("Clusters", ChartKind::Scatter, "temperature", "total rentals", rows)?
        .with_reducer(Reducer::Mean)
        .with_series(series);
    let caption = format!(
        "{} clusters over temperature, windspeed and rentals",
        panel.rows.len()
    );
    Ok(panel.with_caption(caption))
}

fn user_profile_panel(records: &[Observation]) -> Result<Panel> {
    let casual = MetricSummarizer::summarize(records, Measure::Casual);
    let registered = MetricSummarizer::summarize(records, Measure::Registered);
    let whole = casual.sum + registered.sum;
    let caption = format!(
        "Casual {} / Registered {}",
        format_share(casual.sum, whole),
        format_share(registered.sum, whole)
    );
    let rows = vec![
        AggregateRow::new("Casual", casual.sum, casual.count),
        AggregateRow::new("Registered", registered.sum, registered.count),
    ];
    Ok(Panel::new("User Profile", ChartKind::Share, "user type", "rentals", rows)?.with_caption(caption))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
