use std::path::PathBuf;

use batchinfer::io::read_header_table;
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
pub(crate) struct HeadersArgs {
    #[arg(
        short,
        long,
        required = true,
        help = "Tab-separated table of sample name and `platform;;;header[;;;header...]` record."
    )]
    table: PathBuf,
}

impl HeadersArgs {
    pub fn run(
        &self,
        utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let config = utils.load_config()?;
        config.validate()?;

        let samples = read_header_table(open_table(&self.table)?)?;
        info!("Read headers of {} samples", samples.len());

        let outcome = BatchDetector::new(config)
            .detect(&Platform::Sequencing, &DatasetSignals::Headers(samples));
        report_outcome(outcome, utils)
    }
}
