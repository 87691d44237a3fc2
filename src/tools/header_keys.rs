//! Extraction of instrument context (device, run, flowcell, lane) from raw
//! FASTQ read headers.
//!
//! Headers as served by the SRA look like
//! `@SRR5938435.1.1 D8ZGT8Q1:199:C5GKYACXX:5:1101:1224:1885 length=100`,
//! where the second token carries the instrument fields. Older runs use
//! five fields (`<device>:<lane>:<tile>:<x>:<y>`), and some submitters
//! replace `:` with `_`. Native Illumina headers carry the fields in the
//! read name itself (`@EAS139:136:FC706VJ:2:2104:15343:197393 1:Y:18:ATCACG`).
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::{
    HeaderKey,
    SampleHeaders,
    MULTI_HEADER_DELIMITER,
};

/// Placeholder written instead of a header when the upstream fetch of the
/// run failed.
pub const RUN_FAILURE_MARKER: &str = "FAILURE";

/// Canonical key of one sample plus what the extractor saw on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedSample {
    pub sample:         String,
    pub platform:       String,
    pub key:            HeaderKey,
    /// At least one header of the sample was the run-failure marker.
    pub failure_marker: bool,
}

impl KeyedSample {
    pub fn is_degraded(&self) -> bool {
        self.key.is_degraded()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SequencingHeaderKeyExtractor;

impl SequencingHeaderKeyExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parses instrument fields from a single header. `None` when the
    /// header has no recognisable instrument fields.
    pub fn parse_header(
        &self,
        header: &str,
    ) -> Option<HeaderKey> {
        let tokens = header.split_whitespace().collect_vec();
        let read_name = tokens.first()?.trim_start_matches('@');

        tokens
            .get(1)
            .and_then(|instrument| Self::parse_instrument(instrument))
            .or_else(|| {
                read_name
                    .contains(':')
                    .then(|| Self::parse_instrument(read_name))
                    .flatten()
            })
    }

    fn parse_instrument(token: &str) -> Option<HeaderKey> {
        let parts = if token.contains(':') {
            token.split(':').collect_vec()
        }
        else if token.contains('_') {
            // Underscores also occur inside ':'-delimited device names, so
            // they are only a fallback and must look like <id>_<n>_<n>.
            let parts = token.split('_').collect_vec();
            let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
            if !(parts.len() > 2 && is_number(parts[1]) && is_number(parts[2])) {
                return None;
            }
            parts
        }
        else {
            return None;
        };

        if parts[0].is_empty() {
            return None;
        }
        let owned = |idx: usize| Some(parts[idx].to_string());

        match parts.len() {
            n if n >= 7 => Some(HeaderKey::new(parts[0], owned(1), owned(2), owned(3))),
            6 => Some(HeaderKey::new(parts[0], None, owned(1), owned(2))),
            5 => Some(HeaderKey::device_lane(parts[0], parts[1])),
            _ => None,
        }
    }

    /// Key for one sample: the first parseable header wins, otherwise the
    /// key degrades to the platform. Never fails.
    pub fn extract<'a, I>(
        &self,
        platform: &str,
        headers: I,
    ) -> HeaderKey
    where
        I: IntoIterator<Item = &'a str>, {
        self.scan(platform, headers).0
    }

    /// Same as [`extract`](Self::extract) for the
    /// `<platform>;;;<header>[;;;<header>...]` record form. A record without
    /// the delimiter is treated as a bare platform.
    pub fn extract_record(
        &self,
        record: &str,
    ) -> HeaderKey {
        let mut fields = record.split(MULTI_HEADER_DELIMITER);
        let platform = fields.next().unwrap_or_default().trim();
        self.extract(platform, fields)
    }

    pub fn key_sample(
        &self,
        sample: &SampleHeaders,
    ) -> KeyedSample {
        let (key, failure_marker) =
            self.scan(&sample.platform, sample.headers.iter().map(String::as_str));
        KeyedSample {
            sample: sample.sample.clone(),
            platform: sample.platform.clone(),
            key,
            failure_marker,
        }
    }

    fn scan<'a, I>(
        &self,
        platform: &str,
        headers: I,
    ) -> (HeaderKey, bool)
    where
        I: IntoIterator<Item = &'a str>, {
        let mut key = None;
        let mut failure_marker = false;

        for header in headers.into_iter().map(str::trim) {
            if header.is_empty() || header == platform {
                continue;
            }
            if header == RUN_FAILURE_MARKER {
                failure_marker = true;
                continue;
            }
            if key.is_none() {
                key = self.parse_header(header);
            }
        }

        (
            key.unwrap_or_else(|| HeaderKey::platform_only(platform)),
            failure_marker,
        )
    }
}
