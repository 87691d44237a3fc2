//! Grouping of scan timestamps into processing batches.
//!
//! Timestamps are sorted and split wherever two consecutive usable samples
//! are further apart than the configured gap. Batches that end up with too
//! little supporting evidence (most importantly singletons) are then merged
//! into the temporally nearer neighbour until every batch is supported or a
//! single batch remains.
use std::collections::BTreeMap;

use chrono::{
    DateTime,
    TimeDelta,
    Utc,
};
use itertools::Itertools;
use log::{
    debug,
    info,
    warn,
};

use crate::config::ScanDateConfig;
use crate::data_structs::{
    Batch,
    TimedSample,
    BATCH_LABEL_PREFIX,
};
use crate::utils::fmt_hours;

#[derive(Debug, Clone, Default)]
pub struct ScanDateBatchClusterer {
    config: ScanDateConfig,
}

impl ScanDateBatchClusterer {
    pub fn new(config: ScanDateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScanDateConfig {
        &self.config
    }

    /// Partitions `samples` into batches labelled in order of their first
    /// member's time. Every sample lands in exactly one batch; an empty
    /// input yields no batches.
    pub fn cluster(
        &self,
        samples: &[TimedSample],
    ) -> Vec<Batch<TimedSample>> {
        if samples.is_empty() {
            return Vec::new();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.sample.cmp(&b.sample)));

        let mut batches = self.split_on_gaps(sorted);
        let n_initial = batches.len();
        self.absorb_unsupported(&mut batches);

        if n_initial > 1 && batches.len() == 1 {
            warn!("Singleton merging resulted in all batches being combined");
        }
        info!(
            "{} scan date batches detected for {} samples",
            batches.len(),
            samples.len()
        );

        batches
            .into_values()
            .enumerate()
            .map(|(idx, members)| {
                let label = format!(
                    "{}{:02}_{}",
                    BATCH_LABEL_PREFIX,
                    idx + 1,
                    members[0].at.format("%Y-%m-%d")
                );
                Batch::new(label, members)
            })
            .collect_vec()
    }

    /// Whether `later` belongs to a different batch than `earlier`.
    pub fn gap_is_large(
        &self,
        earlier: DateTime<Utc>,
        later: DateTime<Utc>,
    ) -> bool {
        if self.config.same_day_is_same_batch && earlier.date_naive() == later.date_naive()
        {
            return false;
        }
        // A gap too large to represent is never exceeded.
        TimeDelta::try_hours(self.config.max_gap_hours)
            .is_some_and(|max_gap| later - earlier > max_gap)
    }

    /// Initial partition. Outliers are attached to the open batch and are
    /// never used as the reference point for the next gap.
    fn split_on_gaps(
        &self,
        sorted: Vec<TimedSample>,
    ) -> BTreeMap<usize, Vec<TimedSample>> {
        let mut batches: BTreeMap<usize, Vec<TimedSample>> = BTreeMap::new();
        let mut current = 0usize;
        let mut last_usable: Option<DateTime<Utc>> = None;

        for sample in sorted {
            if sample.is_evidence() {
                if let Some(last) = last_usable {
                    if self.gap_is_large(last, sample.at) {
                        debug!(
                            "New batch at {}: gap is {} hours",
                            sample.at,
                            fmt_hours(sample.at - last)
                        );
                        current += 1;
                    }
                }
                last_usable = Some(sample.at);
            }
            batches.entry(current).or_default().push(sample);
        }
        batches
    }

    fn evidence_count(members: &[TimedSample]) -> usize {
        members.iter().filter(|s| s.is_evidence()).count()
    }

    /// First and last timestamp of the batch, taken from usable members
    /// when there are any.
    fn extent(members: &[TimedSample]) -> (DateTime<Utc>, DateTime<Utc>) {
        let usable = members.iter().filter(|s| s.is_evidence()).collect_vec();
        let pool = if usable.is_empty() {
            members.iter().collect_vec()
        }
        else {
            usable
        };
        // Members are kept in time order.
        (pool[0].at, pool[pool.len() - 1].at)
    }

    fn absorb_unsupported(
        &self,
        batches: &mut BTreeMap<usize, Vec<TimedSample>>,
    ) {
        while batches.len() > 1 {
            let Some(idx) = batches
                .iter()
                .find(|(_, members)| {
                    Self::evidence_count(members) < self.config.min_batch_size
                })
                .map(|(idx, _)| *idx)
            else {
                break;
            };

            let (start, end) = Self::extent(&batches[&idx]);
            let backward = batches
                .range(..idx)
                .next_back()
                .map(|(prev, members)| (*prev, start - Self::extent(members).1));
            let forward = batches
                .range(idx + 1..)
                .next()
                .map(|(next, members)| (*next, Self::extent(members).0 - end));

            let target = match (backward, forward) {
                (Some((prev, back_gap)), Some((next, fwd_gap))) => {
                    if fwd_gap < back_gap {
                        warn!(
                            "Singleton resolved by merging with the next batch: gap is {} hours",
                            fmt_hours(fwd_gap)
                        );
                        next
                    }
                    else {
                        warn!(
                            "Singleton resolved by adding to the previous batch: gap is {} hours",
                            fmt_hours(back_gap)
                        );
                        prev
                    }
                },
                (Some((prev, back_gap)), None) => {
                    warn!(
                        "Singleton at the end of the series, combining with the last batch: gap is {} hours",
                        fmt_hours(back_gap)
                    );
                    prev
                },
                (None, Some((next, fwd_gap))) => {
                    warn!(
                        "Singleton at the start of the series, combining with the next batch: gap is {} hours",
                        fmt_hours(fwd_gap)
                    );
                    next
                },
                (None, None) => break,
            };

            let Some(mut absorbed) = batches.remove(&idx)
            else {
                break;
            };
            if let Some(receiver) = batches.get_mut(&target) {
                if target < idx {
                    receiver.append(&mut absorbed);
                }
                else {
                    absorbed.append(receiver);
                    *receiver = absorbed;
                }
            }
        }
    }
}
