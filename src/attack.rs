use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// Attack model a candidate was generated under.
///
/// Declaration order is significant: it is the iteration order of a
/// [`CandidateSet`](crate::candidates::CandidateSet) and therefore decides
/// which bucket keeps a candidate during cross-attack deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Homograph,
    Bitsquat,
    Hyphenation,
    Omission,
    Repetition,
    Replacement,
    Subdomain,
    Transposition,
    VowelSwap,
    Addition,
    Doppelganger,
}

impl AttackKind {
    pub const ALL: [AttackKind; 11] = [
        AttackKind::Homograph,
        AttackKind::Bitsquat,
        AttackKind::Hyphenation,
        AttackKind::Omission,
        AttackKind::Repetition,
        AttackKind::Replacement,
        AttackKind::Subdomain,
        AttackKind::Transposition,
        AttackKind::VowelSwap,
        AttackKind::Addition,
        AttackKind::Doppelganger,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttackKind::Homograph => "homograph",
            AttackKind::Bitsquat => "bitsquat",
            AttackKind::Hyphenation => "hyphenation",
            AttackKind::Omission => "omission",
            AttackKind::Repetition => "repetition",
            AttackKind::Replacement => "replacement",
            AttackKind::Subdomain => "subdomain",
            AttackKind::Transposition => "transposition",
            AttackKind::VowelSwap => "vowel_swap",
            AttackKind::Addition => "addition",
            AttackKind::Doppelganger => "doppelganger",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AttackKind::Homograph => "Visually similar characters (e.g., o -> 0, l -> 1)",
            AttackKind::Bitsquat => "Single bit flips in ASCII characters",
            AttackKind::Hyphenation => "Adding hyphens between characters",
            AttackKind::Omission => "Removing characters",
            AttackKind::Repetition => "Repeating characters",
            AttackKind::Replacement => "Adjacent keyboard key replacements",
            AttackKind::Subdomain => "Adding common subdomains",
            AttackKind::Transposition => "Swapping adjacent characters",
            AttackKind::VowelSwap => "Replacing vowels with other vowels",
            AttackKind::Addition => "Adding characters",
            AttackKind::Doppelganger => "Using different TLDs",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.as_str()).collect()
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttackKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| Error::UnknownAttackKind(s.to_string()))
    }
}

/// Which generators to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackSelection {
    All,
    Only(BTreeSet<AttackKind>),
}

impl AttackSelection {
    /// Parses labels such as `["omission", "vowel_swap"]`; `all` anywhere selects every kind.
    ///
    /// Every label is validated, so an unknown label is an error even next to `all`.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, Error> {
        let mut kinds = BTreeSet::new();
        let mut all = false;
        for label in labels {
            let label = label.as_ref();
            if label.trim().eq_ignore_ascii_case("all") {
                all = true;
                continue;
            }
            kinds.insert(label.parse::<AttackKind>()?);
        }
        if all || kinds.is_empty() {
            return Ok(AttackSelection::All);
        }
        Ok(AttackSelection::Only(kinds))
    }

    /// Selected kinds in declaration order.
    pub fn kinds(&self) -> Vec<AttackKind> {
        match self {
            AttackSelection::All => AttackKind::ALL.to_vec(),
            AttackSelection::Only(kinds) => kinds.iter().copied().collect(),
        }
    }
}

impl Default for AttackSelection {
    fn default() -> Self {
        AttackSelection::All
    }
}
