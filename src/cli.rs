use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};

const AFTER_HELP: &str = "\
Attack types:
  homograph     - Visually similar characters (e.g., o -> 0, l -> 1)
  bitsquat      - Single bit flips in ASCII characters
  hyphenation   - Adding hyphens between characters
  omission      - Removing characters
  repetition    - Repeating characters
  replacement   - Adjacent keyboard key replacements
  subdomain     - Adding common subdomains
  transposition - Swapping adjacent characters
  vowel_swap    - Replacing vowels with other vowels
  addition      - Adding characters
  doppelganger  - Using different TLDs

Examples:
  dnsalt example.com
  dnsalt example.com --attack homograph,omission --limit 20
  dnsalt example.com --resolve --only-active --workers 50
  dnsalt example.com --resolve --format json --output active.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "dnsalt")]
#[command(version)]
#[command(about = "Generate domain name permutations for typosquatting and homograph checks")]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Domain to generate permutations for
    pub domain: String,

    /// Attack types to generate, comma separated, or "all"
    #[arg(short, long, value_delimiter = ',', default_value = "all")]
    pub attack: Vec<String>,

    /// Limit number of results per attack type
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Remove duplicate domains across attack types, keeping the first attack that produced them
    #[arg(long)]
    pub no_duplicates: bool,

    /// Check DNS resolution for generated domains
    #[arg(long)]
    pub resolve: bool,

    /// DNS resolution timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: f64,

    /// Number of concurrent DNS resolution workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Show only domains that resolve (requires --resolve)
    #[arg(long)]
    pub only_active: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}
