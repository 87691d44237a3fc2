//! Scan timestamps embedded in raw microarray output.
//!
//! Each vendor format gets its own [`ScanDateExtractor`]; [`ArrayFormat`]
//! picks one. Timestamps carry no zone information in any of these formats
//! and are read as UTC.
use std::fmt::Display;
use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
    Read,
};
use std::path::{
    Path,
    PathBuf,
};
use std::str::FromStr;

use anyhow::{
    anyhow,
    bail,
    Context,
};
use chrono::{
    DateTime,
    NaiveDateTime,
    Utc,
};
use log::warn;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex_lite::Regex;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::ScanDate;

pub trait ScanDateExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(
        &self,
        reader: &mut dyn BufRead,
    ) -> anyhow::Result<DateTime<Utc>>;

    fn extract_path(
        &self,
        path: &Path,
    ) -> anyhow::Result<DateTime<Utc>> {
        let file = File::open(path)
            .with_context(|| format!("Could not open {}", path.display()))?;
        self.extract(&mut BufReader::new(file))
            .with_context(|| format!("{} failed on {}", self.name(), path.display()))
    }
}

fn parse_naive(
    value: &str,
    format: &str,
) -> anyhow::Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), format)
        .map(|naive| naive.and_utc())
        .with_context(|| format!("Unparseable scan date '{}'", value))
}

static CEL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}/\d{2}/\d{2}) (\d{2}:\d{2}:\d{2})").expect("valid regex")
});

/// Affymetrix CEL files. The `DatHeader` record holds the scanner's
/// `MM/DD/YY HH:MM:SS` timestamp; it is plain text in v3 files and an
/// embedded ASCII string in binary v4/Command Console files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AffymetrixCelExtractor;

impl ScanDateExtractor for AffymetrixCelExtractor {
    fn name(&self) -> &'static str {
        "AffymetrixCelExtractor"
    }

    fn extract(
        &self,
        reader: &mut dyn BufRead,
    ) -> anyhow::Result<DateTime<Utc>> {
        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let text = String::from_utf8_lossy(&raw);

        let dat_header = text
            .find("DatHeader")
            .map(|start| &text[start..])
            .ok_or_else(|| anyhow!("No DatHeader found"))?;
        let captures = CEL_DATE
            .captures(dat_header)
            .ok_or_else(|| anyhow!("No date in DatHeader"))?;
        parse_naive(
            &format!("{} {}", &captures[1], &captures[2]),
            "%m/%d/%y %H:%M:%S",
        )
    }
}

/// Agilent Feature Extraction output: a tab-delimited `FEPARAMS` row names
/// the columns and the following `DATA` row holds `Scan_Date`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgilentExtractor;

impl ScanDateExtractor for AgilentExtractor {
    fn name(&self) -> &'static str {
        "AgilentExtractor"
    }

    fn extract(
        &self,
        reader: &mut dyn BufRead,
    ) -> anyhow::Result<DateTime<Utc>> {
        let mut column = None;
        for line in reader.lines() {
            let line = line?;
            let fields = line.split('\t').collect::<Vec<_>>();
            match fields.first().copied() {
                Some("FEPARAMS") => {
                    column = fields.iter().position(|f| *f == "Scan_Date");
                },
                Some("DATA") => {
                    if let Some(value) = column.and_then(|idx| fields.get(idx)) {
                        return parse_naive(value, "%m-%d-%Y %H:%M:%S");
                    }
                },
                _ => {},
            }
        }
        bail!("No Scan_Date found")
    }
}

/// GenePix GPR files carry `"DateTime=YYYY/MM/DD HH:MM:SS"` in the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenePixExtractor;

impl ScanDateExtractor for GenePixExtractor {
    fn name(&self) -> &'static str {
        "GenePixExtractor"
    }

    fn extract(
        &self,
        reader: &mut dyn BufRead,
    ) -> anyhow::Result<DateTime<Utc>> {
        for line in reader.lines() {
            let line = line?;
            let stripped = line.trim().trim_matches('"');
            if let Some(value) = stripped.strip_prefix("DateTime=") {
                return parse_naive(value, "%Y/%m/%d %H:%M:%S");
            }
            // Column header row: the preamble is over.
            if stripped.starts_with("Block") {
                break;
            }
        }
        bail!("No DateTime header found")
    }
}

/// Raw data formats with a known scan-date location.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum ArrayFormat {
    Affymetrix,
    Agilent,
    GenePix,
}

impl ArrayFormat {
    pub fn extractor(&self) -> Box<dyn ScanDateExtractor> {
        match self {
            ArrayFormat::Affymetrix => Box::new(AffymetrixCelExtractor),
            ArrayFormat::Agilent => Box::new(AgilentExtractor),
            ArrayFormat::GenePix => Box::new(GenePixExtractor),
        }
    }
}

impl Display for ArrayFormat {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ArrayFormat::Affymetrix => write!(f, "affymetrix"),
            ArrayFormat::Agilent => write!(f, "agilent"),
            ArrayFormat::GenePix => write!(f, "genepix"),
        }
    }
}

impl FromStr for ArrayFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "affymetrix" | "affy" | "cel" => Ok(ArrayFormat::Affymetrix),
            "agilent" => Ok(ArrayFormat::Agilent),
            "genepix" | "gpr" => Ok(ArrayFormat::GenePix),
            other => bail!("Array format {} not supported", other),
        }
    }
}

/// Reads one raw file per sample. A sample whose file cannot be read or
/// parsed gets an unavailable marker instead of failing the dataset.
pub fn collect_scan_dates(
    extractor: &dyn ScanDateExtractor,
    files: &[(String, PathBuf)],
) -> Vec<ScanDate> {
    files
        .par_iter()
        .map(|(sample, path)| {
            match extractor.extract_path(path) {
                Ok(date) => ScanDate::new(sample.clone(), date),
                Err(e) => {
                    warn!("No scan date for {}: {:#}", sample, e);
                    ScanDate::unavailable(sample.clone())
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_affymetrix_v3() {
        let cel = "[CEL]\nVersion=3\n\n[HEADER]\nCols=712\nRows=712\n\
                   DatHeader=[0..46104]  HG-U133A:CLS=4733 RWS=4733 XIN=3  YIN=3  VE=17        \
                   2.0 08/16/04 13:12:23    M10   \x14  \x14 HG-U133A.1sq \x14  \x14  \n";
        let date = AffymetrixCelExtractor
            .extract(&mut Cursor::new(cel.as_bytes()))
            .unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2004, 8, 16, 13, 12, 23).unwrap());
    }

    #[test]
    fn test_affymetrix_without_header() {
        assert!(AffymetrixCelExtractor
            .extract(&mut Cursor::new(b"[CEL]\nVersion=3\n".as_slice()))
            .is_err());
    }

    #[test]
    fn test_agilent() {
        let fe = "TYPE\ttext\ttext\n\
                  FEPARAMS\tProtocol_Name\tScan_Date\n\
                  DATA\tGE1_105\t03-18-2009 11:54:41\n";
        let date = AgilentExtractor
            .extract(&mut Cursor::new(fe.as_bytes()))
            .unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2009, 3, 18, 11, 54, 41).unwrap());
    }

    #[test]
    fn test_genepix() {
        let gpr = "ATF\t1.0\n29\t43\n\"Type=GenePix Results 3\"\n\
                   \"DateTime=2006/02/21 15:37:43\"\n\"Block\"\t\"Column\"\n";
        let date = GenePixExtractor
            .extract(&mut Cursor::new(gpr.as_bytes()))
            .unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2006, 2, 21, 15, 37, 43).unwrap());
    }

    #[test]
    fn test_format_selection() {
        assert_eq!("CEL".parse::<ArrayFormat>().unwrap(), ArrayFormat::Affymetrix);
        assert_eq!(
            ArrayFormat::GenePix.extractor().name(),
            "GenePixExtractor"
        );
        assert!("illumina".parse::<ArrayFormat>().is_err());
    }

    #[test]
    fn test_collect_marks_missing() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let good = dir.path().join("a.gpr");
        std::fs::write(&good, "\"DateTime=2006/02/21 15:37:43\"\n")?;
        let files = vec![
            ("GSM1".to_string(), good),
            ("GSM2".to_string(), dir.path().join("missing.gpr")),
        ];
        let dates = collect_scan_dates(&GenePixExtractor, &files);
        assert_eq!(dates.len(), 2);
        assert!(dates[0].date.is_some());
        assert_eq!(dates[1], ScanDate::unavailable("GSM2"));
        Ok(())
    }
}
