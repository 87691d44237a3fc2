//! # batchinfer
//!
//! `batchinfer` infers which samples of an expression dataset were
//! processed together ("batches") from indirect provenance signals, so that
//! downstream analyses can include the batch as a covariate.
//!
//! Two signals are supported:
//!
//! * **Scan dates** embedded in raw microarray files. Timestamps are grouped
//!   by maximum-gap clustering ([`ScanDateBatchClusterer`]); batches with
//!   a single supporting sample are absorbed into their nearest neighbour.
//! * **Read headers** of sequencing runs. The device, run, flowcell and lane
//!   are parsed into a canonical key ([`SequencingHeaderKeyExtractor`]) and
//!   samples sharing a key form a batch ([`HeaderBatchClusterer`]).
//!
//! [`BatchDetector`] selects the signal by [`Platform`] and either returns a
//! [`BatchAssignment`] or an [`EvidenceError`] explaining why the signals
//! cannot support a batching. A single batch is a valid result; a failure
//! is never reported as "zero batches".
//!
//! ## Structure
//!
//! * [`data_structs`]: signals, header keys and batch assignments.
//! * [`tools`]: the clustering algorithms and the detector.
//! * [`io`]: vendor scan-date extractors, sample tables and FASTQ sampling.
//! * [`config`]: calibration constants, loadable from JSON.
//!
//! ## Usage
//!
//! ```
//! use batchinfer::prelude::*;
//!
//! let samples = vec![
//!     SampleHeaders::from_record(
//!         "GSM1",
//!         "GPL1234;;;@SRR1.1 D7ZQJ5M1:747:HL5TJADXX:1:1116:18513:98450 length=101",
//!     )?,
//!     SampleHeaders::from_record(
//!         "GSM2",
//!         "GPL1234;;;@SRR2.1 D7ZQJ5M1:747:HL5TJADXX:1:1101:1224:1885 length=101",
//!     )?,
//! ];
//!
//! let detector = BatchDetector::new(DetectionConfig::default());
//! let assignment = detector.detect(&Platform::Sequencing, &DatasetSignals::Headers(samples))?;
//! assert!(assignment.is_single_batch());
//! assert_eq!(
//!     assignment.labels(),
//!     vec!["Device=D7ZQJ5M1:Run=747:Flowcell=HL5TJADXX:Lane=1"]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod config;
pub mod data_structs;
pub mod error;
pub mod exports;
pub mod io;
pub mod prelude;
pub mod tools;
pub mod utils;

pub use config::DetectionConfig;
pub use data_structs::{
    BatchAssignment,
    HeaderKey,
};
pub use error::{
    EvidenceError,
    EvidenceKind,
};
pub use tools::{
    BatchDetector,
    HeaderBatchClusterer,
    Platform,
    ScanDateBatchClusterer,
    SequencingHeaderKeyExtractor,
};
