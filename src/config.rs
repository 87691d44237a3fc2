use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{
    ensure,
    Context,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::with_field_fn;

/// Largest gap representable as a [`chrono::TimeDelta`].
pub const MAX_GAP_HOURS: i64 = i64::MAX / 1000 / 3600;

/// Calibration of the scan-date clusterer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanDateConfig {
    /// Hours that may pass between consecutive usable samples before a
    /// new batch is opened. Allows for overnight scanning of one batch.
    pub max_gap_hours:          i64,
    /// Samples scanned on the same (UTC) calendar day never split.
    pub same_day_is_same_batch: bool,
    /// Batches with fewer usable members are absorbed into a neighbour.
    pub min_batch_size:         usize,
}

impl ScanDateConfig {
    with_field_fn!(max_gap_hours, i64);
    with_field_fn!(same_day_is_same_batch, bool);
    with_field_fn!(min_batch_size, usize);
}

impl Default for ScanDateConfig {
    fn default() -> Self {
        Self {
            max_gap_hours:          8,
            same_day_is_same_batch: true,
            min_batch_size:         2,
        }
    }
}

/// Calibration of the read-header clusterer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    pub min_batch_size:        usize,
    /// Lowest share of samples with complete headers for which the
    /// degraded remainder is still tolerated.
    pub min_complete_fraction: f64,
    /// Coarsen keys (lane, flowcell, run) when batches are too small.
    pub drop_resolution:       bool,
}

impl HeaderConfig {
    with_field_fn!(min_batch_size, usize);
    with_field_fn!(min_complete_fraction, f64);
    with_field_fn!(drop_resolution, bool);
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            min_batch_size:        2,
            min_complete_fraction: 0.2,
            drop_resolution:       true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub scan_dates: ScanDateConfig,
    pub headers:    HeaderConfig,
}

impl DetectionConfig {
    with_field_fn!(scan_dates, ScanDateConfig);
    with_field_fn!(headers, HeaderConfig);

    pub fn from_json_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Could not open config {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Malformed config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (0..=MAX_GAP_HOURS).contains(&self.scan_dates.max_gap_hours),
            "max_gap_hours must be within [0, {}], got {}",
            MAX_GAP_HOURS,
            self.scan_dates.max_gap_hours
        );
        ensure!(
            self.scan_dates.min_batch_size >= 1,
            "scan date min_batch_size must be at least 1"
        );
        ensure!(
            self.headers.min_batch_size >= 1,
            "header min_batch_size must be at least 1"
        );
        ensure!(
            (0.0..=1.0).contains(&self.headers.min_complete_fraction),
            "min_complete_fraction must be within [0, 1], got {}",
            self.headers.min_complete_fraction
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DetectionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scan_dates.max_gap_hours, 8);
        assert_eq!(config.headers.min_batch_size, 2);
    }

    #[test]
    fn test_gap_out_of_range_is_rejected() {
        let config = DetectionConfig::default()
            .with_scan_dates(ScanDateConfig::default().with_max_gap_hours(i64::MAX / 2));
        assert!(config.validate().is_err());

        let config = DetectionConfig::default()
            .with_scan_dates(ScanDateConfig::default().with_max_gap_hours(MAX_GAP_HOURS));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = DetectionConfig::default().with_scan_dates(
            ScanDateConfig::default()
                .with_max_gap_hours(2)
                .with_same_day_is_same_batch(false),
        );
        assert_eq!(config.scan_dates.max_gap_hours, 2);
        assert!(!config.scan_dates.same_day_is_same_batch);
        assert_eq!(config.scan_dates.min_batch_size, 2);
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let config = DetectionConfig::default()
            .with_headers(HeaderConfig::default().with_min_complete_fraction(1.5));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, r#"{{"scan_dates": {{"max_gap_hours": 12}}}}"#)?;
        let config = DetectionConfig::from_json_path(file.path())?;
        assert_eq!(config.scan_dates.max_gap_hours, 12);
        assert!(config.scan_dates.same_day_is_same_batch);
        assert_eq!(config.headers, HeaderConfig::default());
        Ok(())
    }
}
