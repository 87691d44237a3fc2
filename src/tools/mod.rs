//! Batch inference algorithms.
//!
//! Key submodules:
//!
//! - [`scan_dates`]: maximum-gap clustering of scan timestamps with
//!   absorption of batches that lack supporting samples.
//! - [`header_keys`]: canonical instrument keys from FASTQ read headers.
//! - [`header_batches`]: equivalence clustering of header keys with the
//!   checks that decide whether the keys can be trusted.
//! - [`detect`]: the platform-driven entry point combining the above.
pub mod detect;
pub mod header_batches;
pub mod header_keys;
pub mod scan_dates;

pub use detect::{
    BatchDetector,
    Dataset,
    DatasetSignals,
    Platform,
};
pub use header_batches::{
    HeaderBatchClusterer,
    DEGRADED_LABEL_SUFFIX,
};
pub use header_keys::{
    KeyedSample,
    SequencingHeaderKeyExtractor,
    RUN_FAILURE_MARKER,
};
pub use scan_dates::ScanDateBatchClusterer;
