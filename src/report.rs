//! Rendering of candidates and resolution results.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::attack::AttackKind;
use crate::candidates::CandidateSet;
use crate::cli::OutputFormat;
use crate::domain::{to_ascii, ParsedDomain};
use crate::error::Result;
use crate::resolve::ResolutionResult;

const RULE: &str = "============================================================";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_candidates: usize,
    pub unique_domains: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<usize>,
    /// Resolution was cancelled before every domain was probed.
    pub partial: bool,
}

pub struct Report<'a> {
    domain: &'a ParsedDomain,
    candidates: &'a CandidateSet,
    resolution: Option<&'a [ResolutionResult]>,
    by_domain: HashMap<&'a str, &'a ResolutionResult>,
    only_active: bool,
    dedup: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    domain: String,
    attacks: Vec<JsonAttack<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolution: Option<Vec<&'a ResolutionResult>>,
    summary: Summary,
}

#[derive(Serialize)]
struct JsonAttack<'a> {
    attack: AttackKind,
    domains: Vec<&'a str>,
}

impl<'a> Report<'a> {
    pub fn new(domain: &'a ParsedDomain, candidates: &'a CandidateSet) -> Self {
        Self {
            domain,
            candidates,
            resolution: None,
            by_domain: HashMap::new(),
            only_active: false,
            dedup: false,
        }
    }

    pub fn with_resolution(mut self, results: &'a [ResolutionResult], only_active: bool) -> Self {
        self.by_domain = results.iter().map(|r| (r.domain.as_str(), r)).collect();
        self.resolution = Some(results);
        self.only_active = only_active;
        self
    }

    pub fn deduplicated(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn summary(&self) -> Summary {
        let unique_domains = self.candidates.unique_domains().len();
        Summary {
            total_candidates: self.candidates.total(),
            unique_domains,
            checked: self.resolution.map(<[_]>::len),
            active: self.resolution.map(|r| r.iter().filter(|r| r.resolves).count()),
            partial: self.resolution.is_some_and(|r| r.len() < unique_domains),
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => self.render_json(),
        }
    }

    /// Domains of one bucket that pass the only-active filter.
    fn visible(&self, domains: &'a [String]) -> Vec<&'a str> {
        domains
            .iter()
            .map(String::as_str)
            .filter(|d| !self.only_active || self.by_domain.get(d).is_some_and(|r| r.resolves))
            .collect()
    }

    fn render_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        for (kind, domains) in self.candidates.iter() {
            let visible = self.visible(domains);
            if visible.is_empty() {
                continue;
            }

            lines.push(String::new());
            lines.push(RULE.to_string());
            lines.push(format!("{} ATTACK", kind.as_str().to_uppercase()));
            lines.push(RULE.to_string());
            lines.push(format!("Generated {} permutations", visible.len()));
            lines.push(String::new());

            for domain in visible {
                let shown = display_name(domain);
                match self.by_domain.get(domain) {
                    Some(r) if r.resolves => {
                        let ips: Vec<String> = r.ip_addresses.iter().map(|ip| ip.to_string()).collect();
                        lines.push(format!("✓ {} → {}", shown, ips.join(", ")));
                    }
                    Some(_) => lines.push(format!("✗ {}", shown)),
                    None => lines.push(shown),
                }
            }
        }

        if self.dedup || self.resolution.is_some() {
            let summary = self.summary();
            lines.push(String::new());
            lines.push(RULE.to_string());
            lines.push("SUMMARY".to_string());
            lines.push(RULE.to_string());

            if self.dedup {
                lines.push(format!("Total unique domains: {}", summary.unique_domains));
            }
            if let (Some(checked), Some(active)) = (summary.checked, summary.active) {
                lines.push(format!("Active domains: {}/{}", active, checked));
                lines.push(format!("Inactive domains: {}", checked - active));
                if checked > 0 {
                    lines.push(format!(
                        "Success rate: {:.1}%",
                        active as f64 / checked as f64 * 100.0
                    ));
                }
                if summary.partial {
                    lines.push(format!(
                        "Resolution cancelled: {} of {} domains checked",
                        checked, summary.unique_domains
                    ));
                }
                if active > 0 {
                    lines.push(String::new());
                    lines.push(format!(
                        "⚠️  WARNING: {} potentially suspicious domains are active!",
                        active
                    ));
                }
            }
            lines.push(RULE.to_string());
        }

        lines.join("\n")
    }

    fn render_json(&self) -> Result<String> {
        let attacks = self
            .candidates
            .iter()
            .map(|(attack, domains)| JsonAttack {
                attack,
                domains: self.visible(domains),
            })
            .collect();

        let resolution = self.resolution.map(|results| {
            results
                .iter()
                .filter(|r| !self.only_active || r.resolves)
                .collect()
        });

        let report = JsonReport {
            domain: self.domain.fqdn(),
            attacks,
            resolution,
            summary: self.summary(),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

/// Unicode candidates are shown with their punycode form.
fn display_name(domain: &str) -> String {
    if domain.is_ascii() {
        return domain.to_string();
    }
    match to_ascii(domain) {
        Some(ascii) => format!("{} ({})", domain, ascii),
        None => domain.to_string(),
    }
}

/// Writes the rendered report to `path`, or stdout when `path` is `None`.
pub fn write(rendered: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, rendered)?,
        None => println!("{}", rendered),
    }
    Ok(())
}
