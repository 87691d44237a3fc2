//! Core data types: per-sample signals, canonical header keys and the batch
//! assignment produced from them.
mod batch;
mod header_key;
mod signal;

pub use batch::{
    Batch,
    BatchAssignment,
    DetectionMethod,
    BATCH_LABEL_PREFIX,
};
pub use header_key::HeaderKey;
pub use signal::{
    SampleHeaders,
    ScanDate,
    TimedSample,
    Usability,
    MULTI_HEADER_DELIMITER,
};
