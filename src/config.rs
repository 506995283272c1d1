use std::path::PathBuf;
use std::time::Duration;

use crate::attack::AttackSelection;
use crate::cli::{Cli, OutputFormat};
use crate::domain::ParsedDomain;
use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: f64 = 2.0;
pub const DEFAULT_WORKERS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolveConfig {
    pub timeout: Duration,
    pub workers: usize,
    pub only_active: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            workers: DEFAULT_WORKERS,
            only_active: false,
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub domain: ParsedDomain,
    pub attacks: AttackSelection,
    pub limit: Option<usize>,
    pub dedup: bool,
    /// `None` when resolution is disabled.
    pub resolve: Option<ResolveConfig>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub show_progress: bool,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        // Input errors come before generation, domain first.
        let domain = ParsedDomain::parse(&cli.domain)?;
        let attacks = AttackSelection::from_labels(&cli.attack)?;

        if cli.limit == Some(0) {
            return Err(Error::InvalidConfig("--limit must be a positive integer".into()));
        }
        if cli.only_active && !cli.resolve {
            return Err(Error::InvalidConfig("--only-active requires --resolve".into()));
        }

        let resolve = if cli.resolve {
            if !cli.timeout.is_finite() || cli.timeout <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "--timeout must be a positive number of seconds, got {}",
                    cli.timeout
                )));
            }
            if cli.workers == 0 {
                return Err(Error::InvalidConfig("--workers must be a positive integer".into()));
            }
            Some(ResolveConfig {
                timeout: Duration::from_secs_f64(cli.timeout),
                workers: cli.workers,
                only_active: cli.only_active,
            })
        } else {
            None
        };

        Ok(Self {
            domain,
            attacks,
            limit: cli.limit,
            dedup: cli.no_duplicates,
            resolve,
            format: cli.format,
            output: cli.output.clone(),
            show_progress: !cli.quiet,
        })
    }

    pub fn only_active(&self) -> bool {
        self.resolve.as_ref().is_some_and(|r| r.only_active)
    }
}
