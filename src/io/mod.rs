//! Reading the raw per-sample signals: vendor scan-date extraction, sample
//! tables and FASTQ header sampling.
pub mod scan_date;
pub mod tables;

pub use scan_date::{
    collect_scan_dates,
    AffymetrixCelExtractor,
    AgilentExtractor,
    ArrayFormat,
    GenePixExtractor,
    ScanDateExtractor,
};
pub use tables::{
    first_fastq_header,
    read_header_table,
    read_sample_paths,
    read_scan_date_table,
};
