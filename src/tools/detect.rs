use std::fmt::Display;

use itertools::Itertools;
use log::info;
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

use crate::config::DetectionConfig;
use crate::data_structs::{
    Batch,
    BatchAssignment,
    DetectionMethod,
    SampleHeaders,
    ScanDate,
};
use crate::error::EvidenceError;
use crate::io::{
    ArrayFormat,
    ScanDateExtractor,
};
use crate::tools::header_batches::HeaderBatchClusterer;
use crate::tools::scan_dates::ScanDateBatchClusterer;

/// Technology a dataset was generated on; decides which signal is used.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum Platform {
    Microarray(ArrayFormat),
    Sequencing,
}

impl Platform {
    pub fn method(&self) -> DetectionMethod {
        match self {
            Platform::Microarray(_) => DetectionMethod::ScanDate,
            Platform::Sequencing => DetectionMethod::ReadHeader,
        }
    }

    /// Scan-date extractor for the raw files of this platform, if it has
    /// any.
    pub fn scan_date_extractor(&self) -> Option<Box<dyn ScanDateExtractor>> {
        match self {
            Platform::Microarray(format) => Some(format.extractor()),
            Platform::Sequencing => None,
        }
    }
}

impl Display for Platform {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Platform::Microarray(format) => write!(f, "microarray ({})", format),
            Platform::Sequencing => write!(f, "sequencing"),
        }
    }
}

/// Per-sample signals collected for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatasetSignals {
    ScanDates(Vec<ScanDate>),
    Headers(Vec<SampleHeaders>),
}

impl DatasetSignals {
    pub fn len(&self) -> usize {
        match self {
            DatasetSignals::ScanDates(v) => v.len(),
            DatasetSignals::Headers(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name:     String,
    pub platform: Platform,
    pub signals:  DatasetSignals,
}

/// Entry point for callers: picks the clusterer for a platform and turns its
/// outcome into a [`BatchAssignment`] or a typed failure.
#[derive(Debug, Clone, Default)]
pub struct BatchDetector {
    scan_dates: ScanDateBatchClusterer,
    headers:    HeaderBatchClusterer,
}

impl BatchDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            scan_dates: ScanDateBatchClusterer::new(config.scan_dates),
            headers:    HeaderBatchClusterer::new(config.headers),
        }
    }

    pub fn detect(
        &self,
        platform: &Platform,
        signals: &DatasetSignals,
    ) -> Result<BatchAssignment, EvidenceError> {
        match (platform.method(), signals) {
            (DetectionMethod::ScanDate, DatasetSignals::ScanDates(dates)) => {
                self.detect_scan_dates(dates)
            },
            (DetectionMethod::ReadHeader, DatasetSignals::Headers(headers)) => {
                self.detect_headers(headers)
            },
            (method, _) => {
                Err(EvidenceError::insufficient(format!(
                    "{} platform needs {} signals, which were not supplied",
                    platform, method
                )))
            },
        }
    }

    pub fn detect_scan_dates(
        &self,
        signals: &[ScanDate],
    ) -> Result<BatchAssignment, EvidenceError> {
        let (timed, unassigned): (Vec<_>, Vec<_>) =
            signals.iter().partition_map(|signal| {
                match signal.timed() {
                    Some(timed) => itertools::Either::Left(timed),
                    None => itertools::Either::Right(signal.sample.clone()),
                }
            });

        if timed.is_empty() {
            return Err(EvidenceError::insufficient(format!(
                "no scan dates available for any of {} samples",
                signals.len()
            )));
        }
        if !unassigned.is_empty() {
            info!(
                "{} of {} samples have no scan date and stay unassigned",
                unassigned.len(),
                signals.len()
            );
        }

        let batches = self
            .scan_dates
            .cluster(&timed)
            .into_iter()
            .map(|batch| batch.map_members(|s| s.sample))
            .collect_vec();
        Ok(BatchAssignment::new(
            DetectionMethod::ScanDate,
            batches,
            unassigned,
        ))
    }

    pub fn detect_headers(
        &self,
        samples: &[SampleHeaders],
    ) -> Result<BatchAssignment, EvidenceError> {
        let batches = self
            .headers
            .cluster(samples)?
            .into_iter()
            .map(|batch: Batch<_>| batch.map_members(|s| s.sample))
            .collect_vec();
        Ok(BatchAssignment::new(
            DetectionMethod::ReadHeader,
            batches,
            Vec::new(),
        ))
    }

    /// Runs detection for independent datasets in parallel. Results are in
    /// input order.
    pub fn detect_many(
        &self,
        datasets: &[Dataset],
    ) -> Vec<Result<BatchAssignment, EvidenceError>> {
        datasets
            .par_iter()
            .map(|dataset| self.detect(&dataset.platform, &dataset.signals))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{
        TimeDelta,
        TimeZone,
        Utc,
    };

    use super::*;
    use crate::error::EvidenceKind;

    fn dates(hours: &[i64]) -> Vec<ScanDate> {
        let start = Utc.with_ymd_and_hms(2015, 6, 1, 9, 0, 0).unwrap();
        hours
            .iter()
            .enumerate()
            .map(|(i, h)| ScanDate::new(format!("GSM{i}"), start + TimeDelta::hours(*h)))
            .collect()
    }

    #[test]
    fn test_signal_mismatch_fails() {
        let err = BatchDetector::default()
            .detect(&Platform::Sequencing, &DatasetSignals::ScanDates(dates(&[0, 1])))
            .unwrap_err();
        assert_eq!(err.kind(), EvidenceKind::Insufficient);
    }

    #[test]
    fn test_unavailable_dates_are_unassigned() {
        let mut signals = dates(&[0, 1, 2]);
        signals.push(ScanDate::unavailable("GSM9"));
        let assignment = BatchDetector::default().detect_scan_dates(&signals).unwrap();
        assert!(assignment.is_single_batch());
        assert_eq!(assignment.unassigned(), &["GSM9".to_string()]);
        assert_eq!(assignment.method(), DetectionMethod::ScanDate);
    }

    #[test]
    fn test_no_dates_is_a_failure_not_zero_batches() {
        let signals = vec![ScanDate::unavailable("GSM1"), ScanDate::unavailable("GSM2")];
        let err = BatchDetector::default()
            .detect(
                &Platform::Microarray(ArrayFormat::Affymetrix),
                &DatasetSignals::ScanDates(signals),
            )
            .unwrap_err();
        assert_eq!(err.kind(), EvidenceKind::Insufficient);
    }

    #[test]
    fn test_platform_selects_extractor() {
        assert!(Platform::Sequencing.scan_date_extractor().is_none());
        assert_eq!(
            Platform::Microarray(ArrayFormat::Agilent)
                .scan_date_extractor()
                .map(|e| e.name()),
            Some("AgilentExtractor")
        );
    }
}
