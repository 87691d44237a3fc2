use std::fmt::Display;
use std::str::FromStr;

use anyhow::{
    bail,
    ensure,
};
use chrono::{
    DateTime,
    Utc,
};
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

/// Separates the platform accession and the individual read headers in a
/// raw per-sample header record.
pub const MULTI_HEADER_DELIMITER: &str = ";;;";

/// Whether a signal may influence where batch boundaries fall.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Usability {
    /// Regular observation.
    #[default]
    Evidence,
    /// Excluded outlier: assigned to a batch but never opens one, and not
    /// counted as support for the batch it lands in.
    Outlier,
}

impl Usability {
    pub fn is_evidence(&self) -> bool {
        matches!(self, Usability::Evidence)
    }
}

impl Display for Usability {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Usability::Evidence => write!(f, "evidence"),
            Usability::Outlier => write!(f, "outlier"),
        }
    }
}

impl FromStr for Usability {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "evidence" | "usable" | "" => Ok(Usability::Evidence),
            "outlier" | "unusable" => Ok(Usability::Outlier),
            other => bail!("Unknown usability tag: {}", other),
        }
    }
}

/// Scan timestamp of one sample, or the explicit marker that none could be
/// obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDate {
    pub sample:    String,
    pub date:      Option<DateTime<Utc>>,
    #[serde(default)]
    pub usability: Usability,
}

impl ScanDate {
    pub fn new(
        sample: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            sample:    sample.into(),
            date:      Some(date),
            usability: Usability::Evidence,
        }
    }

    pub fn unavailable(sample: impl Into<String>) -> Self {
        Self {
            sample:    sample.into(),
            date:      None,
            usability: Usability::Evidence,
        }
    }

    pub fn with_usability(
        mut self,
        usability: Usability,
    ) -> Self {
        self.usability = usability;
        self
    }

    /// Returns the clusterable view of this signal, if a timestamp exists.
    pub fn timed(&self) -> Option<TimedSample> {
        self.date.map(|at| {
            TimedSample {
                sample: self.sample.clone(),
                at,
                usability: self.usability,
            }
        })
    }
}

/// A sample with a known scan timestamp, the unit the date clusterer works
/// on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimedSample {
    pub sample:    String,
    pub at:        DateTime<Utc>,
    pub usability: Usability,
}

impl TimedSample {
    pub fn new(
        sample: impl Into<String>,
        at: DateTime<Utc>,
        usability: Usability,
    ) -> Self {
        Self {
            sample: sample.into(),
            at,
            usability,
        }
    }

    pub fn is_evidence(&self) -> bool {
        self.usability.is_evidence()
    }
}

/// Raw read headers of one sample together with its platform accession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleHeaders {
    pub sample:   String,
    pub platform: String,
    pub headers:  Vec<String>,
}

impl SampleHeaders {
    pub fn new(
        sample: impl Into<String>,
        platform: impl Into<String>,
        headers: Vec<String>,
    ) -> Self {
        Self {
            sample: sample.into(),
            platform: platform.into(),
            headers,
        }
    }

    /// Parses `<platform>;;;<header>[;;;<header>...]`. A record without the
    /// delimiter is a bare platform whose headers could not be obtained.
    pub fn from_record(
        sample: impl Into<String>,
        record: &str,
    ) -> anyhow::Result<Self> {
        let mut fields = record.split(MULTI_HEADER_DELIMITER);
        let platform = fields.next().unwrap_or_default().trim().to_string();
        ensure!(!platform.is_empty(), "Header record lacks a platform: {}", record);

        let headers = fields
            .map(str::trim)
            .filter(|field| !field.is_empty() && *field != platform)
            .map(String::from)
            .collect_vec();

        Ok(Self::new(sample, platform, headers))
    }

    /// Renders the record form accepted by [`SampleHeaders::from_record`].
    pub fn to_record(&self) -> String {
        std::iter::once(self.platform.as_str())
            .chain(self.headers.iter().map(String::as_str))
            .join(MULTI_HEADER_DELIMITER)
    }
}
