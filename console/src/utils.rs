use std::fs::File;
use std::io::{
    stdout,
    BufWriter,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use anyhow::Context;
use batchinfer::config::DetectionConfig;
use batchinfer::data_structs::BatchAssignment;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        short,
        long,
        default_value_t = false,
        help = "Print debug information about clustering decisions."
    )]
    pub verbose: bool,
    #[arg(
        short,
        long,
        help = "JSON file overriding the default calibration constants."
    )]
    pub config:  Option<PathBuf>,
    #[arg(
        short,
        long,
        help = "Write the assignment as JSON to this file instead of stdout."
    )]
    pub output:  Option<PathBuf>,
}

impl UtilsArgs {
    pub fn setup(&self) -> anyhow::Result<()> {
        let level = if self.verbose {
            "debug"
        }
        else {
            "info"
        };
        pretty_env_logger::formatted_builder()
            .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()))
            .try_init()?;
        Ok(())
    }

    pub fn load_config(&self) -> anyhow::Result<DetectionConfig> {
        match &self.config {
            Some(path) => DetectionConfig::from_json_path(path),
            None => Ok(DetectionConfig::default()),
        }
    }

    pub fn write_assignment(
        &self,
        assignment: &BatchAssignment,
    ) -> anyhow::Result<()> {
        let mut sink: Box<dyn Write> = match &self.output {
            Some(path) => {
                Box::new(BufWriter::new(File::create(path).with_context(
                    || format!("Could not create output file {}", path.display()),
                )?))
            },
            None => Box::new(stdout().lock()),
        };
        serde_json::to_writer_pretty(&mut sink, assignment)?;
        writeln!(sink)?;
        sink.flush()?;
        Ok(())
    }
}

pub(crate) fn open_table(path: &Path) -> anyhow::Result<std::io::BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Could not open table {}", path.display()))?;
    Ok(std::io::BufReader::new(file))
}
