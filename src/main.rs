use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use dnsalt::cli::Cli;
use dnsalt::report::Report;
use dnsalt::{
    candidates, logger, permute, report, DnsLookup, ResolutionChecker, ResolutionResult,
    ResolveConfig, RunConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let config = RunConfig::from_cli(&cli)?;
    info!(domain = %config.domain, "generating permutations");

    let mut set = permute::generate_all(&config.domain, &config.attacks, config.limit);
    if config.dedup {
        set = candidates::deduplicate(set);
    }

    let results = match &config.resolve {
        Some(resolve) => {
            Some(resolve_candidates(&set.unique_domains(), resolve, config.show_progress).await?)
        }
        None => None,
    };

    let mut view = Report::new(&config.domain, &set).deduplicated(config.dedup);
    if let Some(results) = &results {
        view = view.with_resolution(results, config.only_active());
    }
    let rendered = view.render(config.format)?;
    report::write(&rendered, config.output.as_deref()).with_context(|| match &config.output {
        Some(path) => format!("failed to write report to {}", path.display()),
        None => "failed to write report".to_string(),
    })?;

    if let Some(path) = &config.output {
        println!("\nResults written to {}", path.display());
        let summary = view.summary();
        if let (Some(checked), Some(active)) = (summary.checked, summary.active) {
            println!("Found {} active domains out of {} checked", active, checked);
        }
    }

    if config.show_progress {
        eprintln!("Generated {} permutations", set.total());
    }
    Ok(())
}

async fn resolve_candidates(
    domains: &[String],
    resolve: &ResolveConfig,
    show_progress: bool,
) -> anyhow::Result<Vec<ResolutionResult>> {
    let progress = if show_progress {
        let bar = ProgressBar::new(domains.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .context("invalid progress template")?,
        );
        bar.set_message(format!(
            "resolving (timeout {:.1}s, {} workers)",
            resolve.timeout.as_secs_f64(),
            resolve.workers
        ));
        bar
    } else {
        ProgressBar::hidden()
    };

    let checker = ResolutionChecker::new(DnsLookup::new(resolve.timeout), resolve.timeout, resolve.workers)?
        .with_progress(progress.clone());

    let watcher = checker.cancel_token().cancel_on(tokio::signal::ctrl_c());
    let results = checker.check(domains).await;
    watcher.abort();
    progress.finish_and_clear();

    // The SIGINT handler stays installed once registered, so later interrupts exit here.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });
    Ok(results)
}
