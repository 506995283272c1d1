use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::attack::AttackKind;

/// Candidates grouped by the attack that produced them, iterated in [`AttackKind`] order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateSet {
    buckets: BTreeMap<AttackKind, Vec<String>>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: AttackKind, candidates: Vec<String>) {
        self.buckets.insert(kind, candidates);
    }

    pub fn get(&self, kind: AttackKind) -> &[String] {
        self.buckets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn kinds(&self) -> Vec<AttackKind> {
        self.buckets.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttackKind, &[String])> {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of candidates across all buckets, counting cross-bucket repeats.
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All candidates in bucket order.
    pub fn domains(&self) -> Vec<String> {
        self.buckets.values().flatten().cloned().collect()
    }

    /// All candidates in bucket order, each domain once.
    pub fn unique_domains(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.buckets
            .values()
            .flatten()
            .filter(|d| seen.insert(d.as_str()))
            .cloned()
            .collect()
    }
}

/// Keeps each candidate only in the first bucket, in [`AttackKind`] order, that contains it.
pub fn deduplicate(set: CandidateSet) -> CandidateSet {
    let before = set.total();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = CandidateSet::new();

    for (kind, candidates) in set.buckets {
        let kept = candidates
            .into_iter()
            .filter(|c| seen.insert(c.clone()))
            .collect();
        out.insert(kind, kept);
    }

    debug!(before, after = out.total(), "deduplicated candidates across attacks");
    out
}

/// Truncates every bucket to its first `max` candidates.
///
/// For callers that generate uncapped and cap afterwards; the CLI passes its
/// limit straight to the generators, which gives the same buckets.
pub fn limit(mut set: CandidateSet, max: usize) -> CandidateSet {
    for candidates in set.buckets.values_mut() {
        candidates.truncate(max);
    }
    set
}
