//! Standard scaling and flat-kernel mean shift.
//!
//! Used to derive the `cluster` column from (temperature, windspeed, total).

use std::collections::BTreeMap;

use rides_core::models::Observation;
use rides_core::settings::is_valid_bandwidth;
use rides_core::{Result, RidesError};
use tracing::{debug, info, warn};

/// Number of features clustered per observation.
pub const FEATURES: usize = 3;

/// Default iteration cap per seed.
pub const MAX_ITERATIONS: usize = 300;

// ── StandardScaler ────────────────────────────────────────────────────────────

/// Per-feature standardization to zero mean and unit variance.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler<const D: usize> {
    mean: [f64; D],
    scale: [f64; D],
}

impl<const D: usize> StandardScaler<D> {
    /// Compute mean and population standard deviation per feature. A zero
    /// deviation is replaced by 1 so constant features map to 0.
    pub fn fit(rows: &[[f64; D]]) -> Self {
        let mut mean = [0.0; D];
        let mut scale = [1.0; D];
        if rows.is_empty() {
            return Self { mean, scale };
        }
        let n = rows.len() as f64;
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }
        for (j, s) in scale.iter_mut().enumerate() {
            let var = rows.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();
            *s = if std > 0.0 { std } else { 1.0 };
        }
        Self { mean, scale }
    }

    pub fn transform(&self, rows: &[[f64; D]]) -> Vec<[f64; D]> {
        rows.iter()
            .map(|row| {
                let mut out = [0.0; D];
                for j in 0..D {
                    out[j] = (row[j] - self.mean[j]) / self.scale[j];
                }
                out
            })
            .collect()
    }

    pub fn mean(&self) -> &[f64; D] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64; D] {
        &self.scale
    }
}

// ── MeanShift ─────────────────────────────────────────────────────────────────

/// Result of [`MeanShift::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct MeanShiftFit<const D: usize> {
    /// Cluster centres, most populated first.
    pub centers: Vec<[f64; D]>,
    /// Index into `centers` for every input point.
    pub labels: Vec<usize>,
}

/// Flat-kernel mean shift with grid-bin seeding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanShift {
    bandwidth: f64,
    max_iterations: usize,
}

impl MeanShift {
    /// Fails with [`RidesError::Config`] unless `bandwidth` is finite and
    /// positive.
    pub fn new(bandwidth: f64) -> Result<Self> {
        if !is_valid_bandwidth(bandwidth) {
            return Err(RidesError::Config(format!(
                "bandwidth must be a positive number, got {bandwidth}"
            )));
        }
        Ok(Self {
            bandwidth,
            max_iterations: MAX_ITERATIONS,
        })
    }

    pub fn fit<const D: usize>(&self, points: &[[f64; D]]) -> MeanShiftFit<D> {
        if points.is_empty() {
            return MeanShiftFit {
                centers: Vec::new(),
                labels: Vec::new(),
            };
        }

        let seeds = self.bin_seeds(points);
        let stop = 1e-3 * self.bandwidth;

        // (centre, number of points within bandwidth)
        let mut converged: Vec<([f64; D], usize)> = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let mut center = seed;
            let mut covered = 0;
            for _ in 0..self.max_iterations {
                let Some((next, within)) = self.neighbourhood_mean(points, &center) else {
                    break;
                };
                let shift = distance(&next, &center);
                center = next;
                covered = within;
                if shift <= stop {
                    break;
                }
            }
            if covered > 0 {
                converged.push((center, covered));
            }
        }

        // Stable sort keeps seed order among equally populated centres.
        converged.sort_by(|a, b| b.1.cmp(&a.1));

        let mut centers: Vec<[f64; D]> = Vec::new();
        for (candidate, _) in converged {
            if centers
                .iter()
                .all(|kept| distance(kept, &candidate) >= self.bandwidth)
            {
                centers.push(candidate);
            }
        }

        let labels = points.iter().map(|p| nearest(&centers, p)).collect();
        debug!(
            seeds = centers.len(),
            bandwidth = self.bandwidth,
            "Mean shift converged"
        );
        MeanShiftFit { centers, labels }
    }

    /// Centres of every occupied bandwidth-sized grid cell.
    fn bin_seeds<const D: usize>(&self, points: &[[f64; D]]) -> Vec<[f64; D]> {
        let mut bins: BTreeMap<[i64; D], usize> = BTreeMap::new();
        for p in points {
            let mut key = [0i64; D];
            for (k, v) in key.iter_mut().zip(p) {
                *k = (v / self.bandwidth).round() as i64;
            }
            *bins.entry(key).or_default() += 1;
        }
        bins.keys()
            .map(|key| {
                let mut seed = [0.0; D];
                for (s, k) in seed.iter_mut().zip(key) {
                    *s = *k as f64 * self.bandwidth;
                }
                seed
            })
            .collect()
    }

    fn neighbourhood_mean<const D: usize>(
        &self,
        points: &[[f64; D]],
        center: &[f64; D],
    ) -> Option<([f64; D], usize)> {
        let mut acc = [0.0; D];
        let mut n = 0usize;
        for p in points.iter().filter(|p| distance(p, center) <= self.bandwidth) {
            for (a, v) in acc.iter_mut().zip(p) {
                *a += v;
            }
            n += 1;
        }
        if n == 0 {
            return None;
        }
        for a in &mut acc {
            *a /= n as f64;
        }
        Some((acc, n))
    }
}

fn distance<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

fn nearest<const D: usize>(centers: &[[f64; D]], point: &[f64; D]) -> usize {
    centers
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_d), (i, c)| {
            let d = distance(c, point);
            if d < best_d {
                (i, d)
            } else {
                (best, best_d)
            }
        })
        .0
}

// ── Observation clustering ────────────────────────────────────────────────────

fn features(obs: &Observation) -> [f64; FEATURES] {
    [obs.temperature, obs.windspeed, obs.total]
}

/// Scale (temperature, windspeed, total), run mean shift and store each
/// record's cluster label. Returns the number of clusters found.
pub fn assign_clusters(records: &mut [Observation], bandwidth: f64) -> Result<usize> {
    let model = MeanShift::new(bandwidth)?;
    if records.is_empty() {
        return Ok(0);
    }

    let raw: Vec<[f64; FEATURES]> = records.iter().map(features).collect();
    let scaler = StandardScaler::fit(&raw);
    let fit = model.fit(&scaler.transform(&raw));

    for (obs, label) in records.iter_mut().zip(&fit.labels) {
        obs.cluster = Some(*label);
    }

    let clusters = fit.centers.len();
    if clusters == 1 && records.len() > 1 {
        warn!(bandwidth, "Bandwidth produced a single cluster");
    }
    info!(clusters, records = records.len(), bandwidth, "Assigned clusters");
    Ok(clusters)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
