use std::fmt::Display;

use hashbrown::HashMap;
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use crate::getter_fn;

/// Prefix of every batch label.
pub const BATCH_LABEL_PREFIX: &str = "Batch_";

/// A labelled, non-empty group of signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch<T> {
    label:   String,
    members: Vec<T>,
}

impl<T> Batch<T> {
    pub fn new(
        label: impl Into<String>,
        members: Vec<T>,
    ) -> Self {
        debug_assert!(!members.is_empty(), "Batches are never empty");
        Self {
            label: label.into(),
            members,
        }
    }

    getter_fn!(label, String);

    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn into_members(self) -> Vec<T> {
        self.members
    }

    pub fn map_members<U, F: FnMut(T) -> U>(
        self,
        f: F,
    ) -> Batch<U> {
        Batch {
            label:   self.label,
            members: self.members.into_iter().map(f).collect(),
        }
    }
}

/// Which signal the assignment was inferred from.
#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum DetectionMethod {
    ScanDate,
    ReadHeader,
}

impl Display for DetectionMethod {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            DetectionMethod::ScanDate => write!(f, "scan date"),
            DetectionMethod::ReadHeader => write!(f, "read header"),
        }
    }
}

/// Successful outcome of batch detection for one dataset.
///
/// A single batch is a legitimate result meaning all samples were processed
/// together; failures are reported as
/// [`EvidenceError`](crate::EvidenceError) instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAssignment {
    method:     DetectionMethod,
    batches:    Vec<Batch<String>>,
    /// Samples whose signal could not be obtained.
    unassigned: Vec<String>,
}

impl BatchAssignment {
    pub fn new(
        method: DetectionMethod,
        batches: Vec<Batch<String>>,
        unassigned: Vec<String>,
    ) -> Self {
        Self {
            method,
            batches,
            unassigned,
        }
    }

    pub fn method(&self) -> DetectionMethod {
        self.method
    }

    pub fn batches(&self) -> &[Batch<String>] {
        &self.batches
    }

    pub fn unassigned(&self) -> &[String] {
        &self.unassigned
    }

    pub fn n_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn is_single_batch(&self) -> bool {
        self.batches.len() == 1
    }

    pub fn labels(&self) -> Vec<&str> {
        self.batches.iter().map(|b| b.label().as_str()).collect_vec()
    }

    pub fn sample_to_batch(&self) -> HashMap<&str, &str> {
        self.batches
            .iter()
            .flat_map(|batch| {
                batch
                    .members()
                    .iter()
                    .map(move |sample| (sample.as_str(), batch.label().as_str()))
            })
            .collect()
    }
}
