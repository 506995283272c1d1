//! # dnsalt
//!
//! Generates look-alike permutations of a domain (homographs, bit flips, keyboard
//! typos, TLD swaps and more) and optionally checks which of them resolve.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use dnsalt::{candidates, permute, resolve, AttackSelection, ParsedDomain};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dnsalt::Error> {
//!     let domain = ParsedDomain::parse("example.com")?;
//!     let set = permute::generate_all(&domain, &AttackSelection::All, Some(10));
//!     let set = candidates::deduplicate(set);
//!
//!     let results = resolve::check(&set.unique_domains(), Duration::from_secs(2), 20).await?;
//!     for r in results.iter().filter(|r| r.resolves) {
//!         println!("{} -> {:?}", r.domain, r.ip_addresses);
//!     }
//!     Ok(())
//! }
//! ```

pub mod attack;
pub mod candidates;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logger;
pub mod permute;
pub mod report;
pub mod resolve;

pub use attack::{AttackKind, AttackSelection};
pub use candidates::CandidateSet;
pub use config::{ResolveConfig, RunConfig};
pub use domain::ParsedDomain;
pub use error::{Error, Result};
pub use resolve::{
    CancelToken, DnsLookup, Lookup, ProbeError, ResolutionChecker, ResolutionResult,
};
