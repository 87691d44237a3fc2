//! Grouping of sequencing samples into batches by identical instrument
//! context.
//!
//! Unlike scan dates there is no distance between two device/lane keys, so
//! batches are equivalence classes of keys. The work is deciding whether
//! the keys carry enough information to be trusted at all.
use std::collections::BTreeMap;

use itertools::Itertools;
use log::{
    debug,
    info,
    warn,
};

use crate::config::HeaderConfig;
use crate::data_structs::{
    Batch,
    HeaderKey,
    SampleHeaders,
};
use crate::error::EvidenceError;
use crate::tools::header_keys::{
    KeyedSample,
    SequencingHeaderKeyExtractor,
};

type KeyGroups = BTreeMap<HeaderKey, Vec<KeyedSample>>;

/// Appended to the label of a batch of samples that only have a platform,
/// so it never collides with a device of the same name.
pub const DEGRADED_LABEL_SUFFIX: &str = ":Headers=unavailable";

fn batch_label(key: &HeaderKey) -> String {
    if key.is_degraded() {
        format!("{}{}", key, DEGRADED_LABEL_SUFFIX)
    }
    else {
        key.to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeaderBatchClusterer {
    config:    HeaderConfig,
    extractor: SequencingHeaderKeyExtractor,
}

impl HeaderBatchClusterer {
    pub fn new(config: HeaderConfig) -> Self {
        Self {
            config,
            extractor: SequencingHeaderKeyExtractor::new(),
        }
    }

    pub fn config(&self) -> &HeaderConfig {
        &self.config
    }

    /// Extracts a key per sample and clusters them.
    pub fn cluster(
        &self,
        samples: &[SampleHeaders],
    ) -> Result<Vec<Batch<KeyedSample>>, EvidenceError> {
        let keyed = samples
            .iter()
            .map(|sample| self.extractor.key_sample(sample))
            .collect_vec();
        self.cluster_keys(keyed)
    }

    /// Clusters samples whose keys were already extracted. Batches are
    /// labelled with their rendered key and ordered by key.
    pub fn cluster_keys(
        &self,
        keyed: Vec<KeyedSample>,
    ) -> Result<Vec<Batch<KeyedSample>>, EvidenceError> {
        if keyed.is_empty() {
            return Err(EvidenceError::insufficient("no samples to batch"));
        }
        let n_samples = keyed.len();
        let (complete, degraded): (Vec<_>, Vec<_>) =
            keyed.into_iter().partition(|s| !s.is_degraded());

        if complete.is_empty() {
            let platforms = degraded
                .iter()
                .map(|s| s.platform.as_str())
                .unique()
                .sorted()
                .collect_vec();
            if platforms.len() > 1 {
                return Err(EvidenceError::ambiguous(format!(
                    "no usable headers; samples differ only by platform ({}), which is \
                     confounded with any batch",
                    platforms.join(", ")
                )));
            }
            return Err(EvidenceError::insufficient(
                "samples didn't have any usable information for batching",
            ));
        }

        let failed = complete
            .iter()
            .chain(degraded.iter())
            .filter(|s| s.failure_marker)
            .map(|s| s.sample.as_str())
            .sorted()
            .collect_vec();
        if !failed.is_empty() {
            return Err(EvidenceError::inconsistent(format!(
                "run failure reported for {} sample(s): {}",
                failed.len(),
                failed.join(", ")
            )));
        }

        let complete_fraction = complete.len() as f64 / n_samples as f64;
        if !degraded.is_empty() && complete_fraction < self.config.min_complete_fraction {
            return Err(EvidenceError::insufficient(format!(
                "only {} of {} samples have complete headers",
                complete.len(),
                n_samples
            )));
        }

        let mut groups = group_by_key(complete);
        if self.config.drop_resolution {
            groups = self.coarsen(groups);
        }
        for (key, members) in group_by_key(degraded) {
            debug!("{} samples without usable headers batched as {}", members.len(), key);
            groups.insert(key, members);
        }

        if groups.len() > 1 {
            if let Some((key, members)) = groups
                .iter()
                .find(|(_, members)| members.len() < self.config.min_batch_size)
            {
                return Err(EvidenceError::insufficient(format!(
                    "could not resolve small batch {} with {} sample(s)",
                    key,
                    members.len()
                )));
            }
        }

        info!("{} header batches detected", groups.len());
        Ok(groups
            .into_iter()
            .map(|(key, mut members)| {
                members.sort_by(|a, b| a.sample.cmp(&b.sample));
                Batch::new(batch_label(&key), members)
            })
            .collect_vec())
    }

    /// Lowers key resolution one level at a time while some batch is
    /// too small to stand on its own.
    fn coarsen(
        &self,
        mut groups: KeyGroups,
    ) -> KeyGroups {
        while groups.len() > 1
            && groups
                .values()
                .any(|members| members.len() < self.config.min_batch_size)
        {
            let mut changed = false;
            let coarser = groups
                .into_values()
                .flatten()
                .map(|mut sample| {
                    if let Some(key) = sample.key.drop_resolution() {
                        sample.key = key;
                        changed = true;
                    }
                    sample
                })
                .collect_vec();
            groups = group_by_key(coarser);

            if !changed {
                break;
            }
            warn!(
                "Batches too small, reduced header resolution to {} batches",
                groups.len()
            );
        }
        groups
    }
}

fn group_by_key(samples: Vec<KeyedSample>) -> KeyGroups {
    let mut groups = KeyGroups::new();
    for sample in samples {
        groups.entry(sample.key.clone()).or_default().push(sample);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvidenceKind;

    fn sample(
        name: &str,
        record: &str,
    ) -> SampleHeaders {
        SampleHeaders::from_record(name, record).unwrap()
    }

    fn header(
        device: &str,
        run: u32,
        flowcell: &str,
        lane: u32,
    ) -> String {
        format!("GPL1;;;@SRR1.1 {device}:{run}:{flowcell}:{lane}:1101:1224:1885 length=100")
    }

    fn labels(batches: &[Batch<KeyedSample>]) -> Vec<&str> {
        batches.iter().map(|b| b.label().as_str()).collect()
    }

    #[test]
    fn test_empty_is_insufficient() {
        let err = HeaderBatchClusterer::default().cluster(&[]).unwrap_err();
        assert_eq!(err.kind(), EvidenceKind::Insufficient);
    }

    #[test]
    fn test_drops_lane_to_resolve_singletons() {
        let samples = vec![
            sample("s1", &header("D1", 5, "FC1", 1)),
            sample("s2", &header("D1", 5, "FC1", 2)),
            sample("s3", &header("D2", 9, "FC2", 1)),
            sample("s4", &header("D2", 9, "FC2", 2)),
        ];
        let batches = HeaderBatchClusterer::default().cluster(&samples).unwrap();
        assert_eq!(
            labels(&batches),
            vec!["Device=D1:Run=5:Flowcell=FC1", "Device=D2:Run=9:Flowcell=FC2"]
        );
    }

    #[test]
    fn test_without_dropping_singletons_fail() {
        let samples = vec![
            sample("s1", &header("D1", 5, "FC1", 1)),
            sample("s2", &header("D1", 5, "FC1", 2)),
            sample("s3", &header("D1", 5, "FC1", 2)),
        ];
        let clusterer =
            HeaderBatchClusterer::new(HeaderConfig::default().with_drop_resolution(false));
        let err = clusterer.cluster(&samples).unwrap_err();
        assert_eq!(err.kind(), EvidenceKind::Insufficient);

        let batches = HeaderBatchClusterer::default().cluster(&samples).unwrap();
        assert_eq!(labels(&batches), vec!["Device=D1:Run=5:Flowcell=FC1"]);
    }

    #[test]
    fn test_unresolvable_singleton_device() {
        let samples = vec![
            sample("s1", &header("D1", 5, "FC1", 1)),
            sample("s2", &header("D1", 5, "FC1", 1)),
            sample("s3", &header("D1", 5, "FC1", 1)),
            sample("s4", &header("D2", 7, "FC9", 3)),
        ];
        let err = HeaderBatchClusterer::default().cluster(&samples).unwrap_err();
        assert_eq!(err.kind(), EvidenceKind::Insufficient);
    }

    #[test]
    fn test_degraded_remainder_forms_own_batch() {
        let samples = vec![
            sample("s1", &header("D1", 5, "FC1", 1)),
            sample("s2", &header("D1", 5, "FC1", 1)),
            sample("s3", &header("D1", 5, "FC1", 2)),
            sample("s4", &header("D1", 5, "FC1", 2)),
            sample("s5", "GPL1;;;@SRR9.1 1 length=50"),
            sample("s6", "GPL1;;;@SRR9.2 1 length=50"),
        ];
        let batches = HeaderBatchClusterer::default().cluster(&samples).unwrap();
        assert_eq!(
            labels(&batches),
            vec![
                "Device=D1:Run=5:Flowcell=FC1:Lane=1",
                "Device=D1:Run=5:Flowcell=FC1:Lane=2",
                "Device=GPL1:Headers=unavailable",
            ]
        );
    }

    #[test]
    fn test_degraded_label_differs_from_same_named_device() {
        let samples = vec![
            sample("s1", "GPL1;;;@SRR1.1 GPL1:1:1:1044:11321 length=76"),
            sample("s2", "GPL1;;;@SRR1.2 GPL1:2:1:1044:11321 length=76"),
            sample("s3", "GPL1"),
            sample("s4", "GPL1"),
        ];
        let batches = HeaderBatchClusterer::default().cluster(&samples).unwrap();
        assert_eq!(
            labels(&batches),
            vec!["Device=GPL1", "Device=GPL1:Headers=unavailable"]
        );
        assert_eq!(labels(&batches).iter().unique().count(), batches.len());
    }

    #[test]
    fn test_small_minority_of_complete_headers() {
        let mut samples = (0..9)
            .map(|i| sample(&format!("s{i}"), "GPL1;;;@SRR9.1 1 length=50"))
            .collect_vec();
        samples.push(sample("s9", &header("D1", 5, "FC1", 1)));
        let err = HeaderBatchClusterer::default().cluster(&samples).unwrap_err();
        assert_eq!(err.kind(), EvidenceKind::Insufficient);
        assert!(err.reason().contains("1 of 10"));
    }

    #[test]
    fn test_failure_marker_is_inconsistent() {
        let samples = vec![
            sample("s1", &header("D1", 5, "FC1", 1)),
            sample("s2", &header("D1", 5, "FC1", 1)),
            sample("s3", "GPL1;;;FAILURE"),
        ];
        let err = HeaderBatchClusterer::default().cluster(&samples).unwrap_err();
        assert_eq!(err.kind(), EvidenceKind::Inconsistent);
        assert!(err.reason().contains("s3"));
    }

    #[test]
    fn test_degraded_across_platforms_is_ambiguous() {
        let samples = vec![
            sample("s1", "GPL1;;;@SRR9.1 1 length=50"),
            sample("s2", "GPL1;;;@SRR9.2 1 length=50"),
            sample("s3", "GPL2;;;@SRR9.3 1 length=50"),
            sample("s4", "GPL2;;;@SRR9.4 1 length=50"),
        ];
        let err = HeaderBatchClusterer::default().cluster(&samples).unwrap_err();
        assert_eq!(err.kind(), EvidenceKind::Ambiguous);
    }
}
