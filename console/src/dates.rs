use std::path::{
    Path,
    PathBuf,
};

use batchinfer::io::{
    collect_scan_dates,
    read_sample_paths,
    read_scan_date_table,
    ArrayFormat,
};
use batchinfer::tools::{
    BatchDetector,
    DatasetSignals,
    Platform,
};
use clap::Args;
use log::info;

use crate::report_outcome;
use crate::utils::{
    open_table,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct DatesArgs {
    #[arg(
        short,
        long,
        help = "Raw data format of the sample files. affymetrix/agilent/genepix."
    )]
    format: ArrayFormat,
    #[arg(
        short,
        long,
        required_unless_present = "dates",
        conflicts_with = "dates",
        help = "Tab-separated table of sample name and raw file path. Relative paths are resolved against the table's directory."
    )]
    table:  Option<PathBuf>,
    #[arg(
        short,
        long,
        help = "Tab-separated table of sample name, RFC 3339 scan date (or NA) and optional usability tag, used instead of reading raw files."
    )]
    dates:  Option<PathBuf>,
}

impl DatesArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let config = utils.load_config()?;
        config.validate()?;

        let signals = match (&self.table, &self.dates) {
            (_, Some(dates)) => read_scan_date_table(open_table(dates)?)?,
            (Some(table), None) => {
                let base = table.parent().unwrap_or_else(|| Path::new("."));
                let files = read_sample_paths(open_table(table)?, base)?;
                info!(
                    "Reading {} scan dates from {} files",
                    self.format,
                    files.len()
                );
                let extractor = Platform::Microarray(self.format)
                    .scan_date_extractor()
                    .ok_or_else(|| anyhow::anyhow!("{} has no scan dates", self.format))?;
                collect_scan_dates(extractor.as_ref(), &files)
            },
            (None, None) => anyhow::bail!("Either --table or --dates is required"),
        };

        let outcome = BatchDetector::new(config).detect(
            &Platform::Microarray(self.format),
            &DatasetSignals::ScanDates(signals),
        );
        report_outcome(outcome, utils)
    }
}
