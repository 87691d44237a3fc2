//! Tab-separated per-sample tables and FASTQ header sampling.
use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
};
use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    anyhow,
    ensure,
    Context,
};
use bio::io::fastq;
use chrono::{
    DateTime,
    Utc,
};

use crate::data_structs::{
    SampleHeaders,
    ScanDate,
    Usability,
    MULTI_HEADER_DELIMITER,
};

/// Yields `(line number, fields)` for every non-blank, non-comment line.
fn table_rows<R: BufRead>(
    reader: R
) -> impl Iterator<Item = anyhow::Result<(usize, Vec<String>)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            match line {
                Err(e) => Some(Err(e.into())),
                Ok(line) => {
                    let trimmed = line.trim_end();
                    if trimmed.trim().is_empty() || trimmed.starts_with('#') {
                        None
                    }
                    else {
                        Some(Ok((
                            idx + 1,
                            trimmed.split('\t').map(String::from).collect(),
                        )))
                    }
                },
            }
        })
}

/// Reads `<sample>\t<platform>;;;<header>[;;;<header>...]` lines.
pub fn read_header_table<R: BufRead>(reader: R) -> anyhow::Result<Vec<SampleHeaders>> {
    table_rows(reader)
        .map(|row| {
            let (line_no, fields) = row?;
            ensure!(
                fields.len() == 2,
                "Line {}: expected 2 tab-separated fields, got {}",
                line_no,
                fields.len()
            );
            SampleHeaders::from_record(fields[0].trim(), &fields[1])
                .with_context(|| format!("Line {}", line_no))
        })
        .collect()
}

/// Reads `<sample>\t<path>` lines. Relative paths are resolved against
/// `base`.
pub fn read_sample_paths<R: BufRead>(
    reader: R,
    base: &Path,
) -> anyhow::Result<Vec<(String, PathBuf)>> {
    table_rows(reader)
        .map(|row| {
            let (line_no, fields) = row?;
            ensure!(
                fields.len() == 2,
                "Line {}: expected sample and path, got {} fields",
                line_no,
                fields.len()
            );
            Ok((fields[0].trim().to_string(), base.join(fields[1].trim())))
        })
        .collect()
}

/// Reads `<sample>\t<RFC 3339 timestamp | NA>[\t<usability>]` lines.
pub fn read_scan_date_table<R: BufRead>(reader: R) -> anyhow::Result<Vec<ScanDate>> {
    table_rows(reader)
        .map(|row| {
            let (line_no, fields) = row?;
            ensure!(
                (2..=3).contains(&fields.len()),
                "Line {}: expected 2 or 3 fields, got {}",
                line_no,
                fields.len()
            );
            let sample = fields[0].trim();
            let usability = match fields.get(2) {
                Some(tag) => tag.trim().parse::<Usability>()?,
                None => Usability::Evidence,
            };
            let signal = match fields[1].trim() {
                "" | "NA" => ScanDate::unavailable(sample),
                value => {
                    let date = DateTime::parse_from_rfc3339(value)
                        .with_context(|| format!("Line {}: bad timestamp", line_no))?
                        .with_timezone(&Utc);
                    ScanDate::new(sample, date)
                },
            };
            Ok(signal.with_usability(usability))
        })
        .collect()
}

/// Renders the first record of a FASTQ file as a raw header record for
/// `platform`.
pub fn first_fastq_header<P: AsRef<Path>>(
    path: P,
    platform: &str,
) -> anyhow::Result<String> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    let record = fastq::Reader::new(BufReader::new(file))
        .records()
        .next()
        .ok_or_else(|| anyhow!("{} contains no reads", path.display()))?
        .with_context(|| format!("Malformed FASTQ record in {}", path.display()))?;

    let header = match record.desc() {
        Some(desc) => format!("@{} {}", record.id(), desc),
        None => format!("@{}", record.id()),
    };
    Ok(format!("{}{}{}", platform, MULTI_HEADER_DELIMITER, header))
}

#[cfg(test)]
mod tests {
    use std::io::{
        Cursor,
        Write,
    };

    use super::*;

    #[test]
    fn test_header_table() {
        let table = "# sample\trecord\n\
                     GSM1\tGPL1;;;@SRR1.1 D1:5:FC1:1:1:1:1 length=50\n\
                     \n\
                     GSM2\tGPL1;;;FAILURE\n";
        let rows = read_header_table(Cursor::new(table)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].headers, vec!["FAILURE".to_string()]);
    }

    #[test]
    fn test_header_table_bad_row() {
        let err = read_header_table(Cursor::new("GSM1\n")).unwrap_err();
        assert!(err.to_string().contains("Line 1"));
    }

    #[test]
    fn test_scan_date_table() {
        let table = "GSM1\t2012-01-01T08:00:00Z\n\
                     GSM2\tNA\n\
                     GSM3\t2012-01-01T10:00:00+02:00\toutlier\n";
        let rows = read_scan_date_table(Cursor::new(table)).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].date.is_none());
        assert_eq!(rows[2].usability, Usability::Outlier);
        assert_eq!(rows[2].date, rows[0].date);
    }

    #[test]
    fn test_sample_paths_resolve_against_base() {
        let rows =
            read_sample_paths(Cursor::new("GSM1\tGSM1.CEL\n"), Path::new("/data/raw")).unwrap();
        assert_eq!(rows[0], ("GSM1".to_string(), PathBuf::from("/data/raw/GSM1.CEL")));
    }

    #[test]
    fn test_first_fastq_header() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            "@SRR5647782.1.1 D7ZQJ5M1:747:HL5TJADXX:1:1116:18513:98450 length=4\nACGT\n+\nIIII\n"
        )?;
        let record = first_fastq_header(file.path(), "GPL1234")?;
        assert_eq!(
            record,
            "GPL1234;;;@SRR5647782.1.1 D7ZQJ5M1:747:HL5TJADXX:1:1116:18513:98450 length=4"
        );
        Ok(())
    }
}
