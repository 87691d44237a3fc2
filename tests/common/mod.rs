#![allow(dead_code)]
use batchinfer::data_structs::{
    SampleHeaders,
    TimedSample,
    Usability,
};
use chrono::{
    DateTime,
    TimeDelta,
    TimeZone,
    Utc,
};
use rand::Rng;

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2015, 6, 1, 9, 0, 0).unwrap()
}

/// Samples `GSM0..` scanned at the given hour offsets from [`start`].
pub fn timed_at_hours(hours: &[i64]) -> Vec<TimedSample> {
    hours
        .iter()
        .enumerate()
        .map(|(i, h)| {
            TimedSample::new(
                format!("GSM{i}"),
                start() + TimeDelta::hours(*h),
                Usability::Evidence,
            )
        })
        .collect()
}

/// Random scan schedule: `n_days` scanning sessions, each with a few samples
/// spread over a morning.
pub fn random_schedule<R: Rng>(
    rng: &mut R,
    n_days: i64,
) -> Vec<TimedSample> {
    let mut samples = Vec::new();
    for day in 0..n_days {
        let session_start = start() + TimeDelta::days(day * rng.gen_range(1..4));
        for _ in 0..rng.gen_range(1..6) {
            let at = session_start + TimeDelta::minutes(rng.gen_range(0..300));
            let usability = if rng.gen_bool(0.1) {
                Usability::Outlier
            }
            else {
                Usability::Evidence
            };
            samples.push(TimedSample::new(
                format!("GSM{}", samples.len()),
                at,
                usability,
            ));
        }
    }
    samples
}

pub fn headers(
    sample: &str,
    record: &str,
) -> SampleHeaders {
    SampleHeaders::from_record(sample, record).unwrap()
}

/// Illumina-style header record for a device/lane context.
pub fn illumina_record(
    device: &str,
    lane: u32,
    read: u32,
) -> String {
    format!("GPL1234;;;@SRR{read}.1 {device}:{lane}:1:{}:{} length=76", 1000 + read, 11321)
}
