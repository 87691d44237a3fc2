pub use crate::config::{
    DetectionConfig,
    HeaderConfig,
    ScanDateConfig,
};
pub use crate::data_structs::{
    Batch,
    BatchAssignment,
    DetectionMethod,
    HeaderKey,
    SampleHeaders,
    ScanDate,
    TimedSample,
    Usability,
};
pub use crate::error::{
    EvidenceError,
    EvidenceKind,
};
pub use crate::io::{
    collect_scan_dates,
    ArrayFormat,
    ScanDateExtractor,
};
pub use crate::tools::{
    BatchDetector,
    Dataset,
    DatasetSignals,
    HeaderBatchClusterer,
    KeyedSample,
    Platform,
    ScanDateBatchClusterer,
    SequencingHeaderKeyExtractor,
};
