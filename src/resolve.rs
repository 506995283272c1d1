//! Bounded-concurrency DNS resolution of candidate domains.

use std::future::Future;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::ProgressBar;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use trust_dns_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::TokioAsyncResolver;

use crate::domain::to_ascii;
use crate::error::{Error, Result};

/// Why a probe did not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeError {
    Timeout,
    NoRecord,
    ResolverError,
}

impl ProbeError {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeError::Timeout => "timeout",
            ProbeError::NoRecord => "no_record",
            ProbeError::ResolverError => "resolver_error",
        }
    }
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionResult {
    pub domain: String,
    pub resolves: bool,
    pub ip_addresses: Vec<IpAddr>,
    pub error: Option<ProbeError>,
}

impl ResolutionResult {
    fn resolved(domain: &str, ip_addresses: Vec<IpAddr>) -> Self {
        Self {
            domain: domain.to_string(),
            resolves: true,
            ip_addresses,
            error: None,
        }
    }

    fn failed(domain: &str, error: ProbeError) -> Self {
        Self {
            domain: domain.to_string(),
            resolves: false,
            ip_addresses: Vec::new(),
            error: Some(error),
        }
    }
}

/// A single forward lookup. The checker enforces the timeout around it.
#[async_trait]
pub trait Lookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> std::result::Result<Vec<IpAddr>, ProbeError>;
}

/// A+AAAA lookups through trust-dns, one attempt per name.
pub struct DnsLookup {
    resolver: TokioAsyncResolver,
}

impl DnsLookup {
    pub fn new(lookup_timeout: Duration) -> Self {
        Self::with_config(ResolverConfig::default(), lookup_timeout)
    }

    pub fn with_config(config: ResolverConfig, lookup_timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = lookup_timeout;
        opts.attempts = 0;
        opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        DnsLookup {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl Lookup for DnsLookup {
    async fn lookup(&self, domain: &str) -> std::result::Result<Vec<IpAddr>, ProbeError> {
        let name = to_ascii(domain).ok_or(ProbeError::ResolverError)?;
        match self.resolver.lookup_ip(name.as_str()).await {
            Ok(response) => Ok(response.iter().collect()),
            Err(e) => {
                debug!(domain, error = %e, "lookup failed");
                Err(classify(&e))
            }
        }
    }
}

fn classify(error: &ResolveError) -> ProbeError {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match *response_code {
            ResponseCode::ServFail | ResponseCode::Refused => ProbeError::ResolverError,
            _ => ProbeError::NoRecord,
        },
        ResolveErrorKind::Timeout => ProbeError::Timeout,
        _ => ProbeError::ResolverError,
    }
}

/// Cooperative abort for a running [`ResolutionChecker::check`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Cancels once `signal` completes. Abort the returned handle when the
    /// signal should no longer cancel anything.
    pub fn cancel_on<F>(&self, signal: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = std::io::Result<()>> + Send + 'static,
    {
        let token = self.clone();
        tokio::spawn(async move {
            if signal.await.is_ok() {
                warn!("interrupted, waiting for in-flight lookups");
                token.cancel();
            }
        })
    }
}

pub struct ResolutionChecker<L> {
    lookup: Arc<L>,
    timeout: Duration,
    max_workers: usize,
    cancel: CancelToken,
    progress: ProgressBar,
}

impl<L: Lookup + 'static> ResolutionChecker<L> {
    pub fn new(lookup: L, lookup_timeout: Duration, max_workers: usize) -> Result<Self> {
        if max_workers == 0 {
            return Err(Error::InvalidConfig("worker count must be at least 1".into()));
        }
        if lookup_timeout.is_zero() {
            return Err(Error::InvalidConfig("timeout must be positive".into()));
        }
        Ok(Self {
            lookup: Arc::new(lookup),
            timeout: lookup_timeout,
            max_workers,
            cancel: CancelToken::new(),
            progress: ProgressBar::hidden(),
        })
    }

    /// Ticked once per finished probe.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Probes every domain, returning results in input order.
    ///
    /// After cancellation no new probe starts; the result holds only the domains
    /// that were probed, still in input order.
    pub async fn check(&self, domains: &[String]) -> Vec<ResolutionResult> {
        let total = domains.len();
        let workers = self.max_workers.min(total);
        info!(total, workers, timeout = ?self.timeout, "starting resolution");

        let queue: Arc<[String]> = domains.into();
        let cursor = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let cursor = Arc::clone(&cursor);
                let lookup = Arc::clone(&self.lookup);
                let cancel = self.cancel.clone();
                let progress = self.progress.clone();
                let lookup_timeout = self.timeout;

                tokio::spawn(async move {
                    let mut done = Vec::new();
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let index = cursor.fetch_add(1, Ordering::SeqCst);
                        let Some(domain) = queue.get(index) else {
                            break;
                        };
                        let result = probe(lookup.as_ref(), domain, lookup_timeout).await;
                        progress.inc(1);
                        done.push((index, result));
                    }
                    done
                })
            })
            .collect();

        let mut slots: Vec<Option<ResolutionResult>> = vec![None; total];
        for joined in futures::future::join_all(handles).await {
            match joined {
                Ok(done) => {
                    for (index, result) in done {
                        slots[index] = Some(result);
                    }
                }
                Err(e) => warn!(error = %e, "resolution worker failed"),
            }
        }

        let results: Vec<ResolutionResult> = slots.into_iter().flatten().collect();
        info!(
            probed = results.len(),
            active = results.iter().filter(|r| r.resolves).count(),
            "resolution finished"
        );
        results
    }
}

async fn probe<L: Lookup + ?Sized>(
    lookup: &L,
    domain: &str,
    lookup_timeout: Duration,
) -> ResolutionResult {
    match timeout(lookup_timeout, lookup.lookup(domain)).await {
        Ok(Ok(ips)) if !ips.is_empty() => ResolutionResult::resolved(domain, ips),
        Ok(Ok(_)) => ResolutionResult::failed(domain, ProbeError::NoRecord),
        Ok(Err(e)) => ResolutionResult::failed(domain, e),
        Err(_) => ResolutionResult::failed(domain, ProbeError::Timeout),
    }
}

/// Checks `domains` with the default resolver configuration.
pub async fn check(
    domains: &[String],
    lookup_timeout: Duration,
    max_workers: usize,
) -> Result<Vec<ResolutionResult>> {
    let checker = ResolutionChecker::new(DnsLookup::new(lookup_timeout), lookup_timeout, max_workers)?;
    Ok(checker.check(domains).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::net::Ipv4Addr;

    /// Answers from a fixed table after a per-name delay, tracking peak concurrency.
    struct ScriptedLookup {
        answers: HashMap<String, (u64, std::result::Result<Vec<IpAddr>, ProbeError>)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl ScriptedLookup {
        fn new() -> Self {
            Self {
                answers: HashMap::new(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }

        fn answer(
            mut self,
            domain: &str,
            delay_ms: u64,
            outcome: std::result::Result<Vec<IpAddr>, ProbeError>,
        ) -> Self {
            self.answers.insert(domain.to_string(), (delay_ms, outcome));
            self
        }
    }

    #[async_trait]
    impl Lookup for ScriptedLookup {
        async fn lookup(&self, domain: &str) -> std::result::Result<Vec<IpAddr>, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let (delay, outcome) = self
                .answers
                .get(domain)
                .cloned()
                .unwrap_or((1, Err(ProbeError::NoRecord)));
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, last))
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn results_follow_input_order() {
        let lookup = ScriptedLookup::new()
            .answer("slow.com", 60, Ok(vec![ip(1)]))
            .answer("fast.com", 1, Ok(vec![ip(2), ip(3)]))
            .answer("mid.com", 20, Err(ProbeError::NoRecord));
        let checker = ResolutionChecker::new(lookup, Duration::from_secs(2), 3).unwrap();

        let domains = names(&["slow.com", "fast.com", "mid.com"]);
        let results = checker.check(&domains).await;

        let got: Vec<&str> = results.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(got, ["slow.com", "fast.com", "mid.com"]);
        assert!(results[0].resolves);
        assert_eq!(results[1].ip_addresses, vec![ip(2), ip(3)]);
        assert!(!results[2].resolves);
        assert_eq!(results[2].error, Some(ProbeError::NoRecord));
    }

    #[tokio::test]
    async fn order_holds_for_any_worker_count() {
        let domains: Vec<String> = (0..25).map(|i| format!("host{i}.com")).collect();
        for workers in [1, 2, 7, 25, 100] {
            let mut lookup = ScriptedLookup::new();
            for (i, d) in domains.iter().enumerate() {
                lookup = lookup.answer(d, (25 - i as u64) % 7, Ok(vec![ip(i as u8)]));
            }
            let checker = ResolutionChecker::new(lookup, Duration::from_secs(2), workers).unwrap();
            let results = checker.check(&domains).await;
            assert_eq!(results.len(), domains.len());
            for (result, domain) in results.iter().zip(&domains) {
                assert_eq!(&result.domain, domain);
            }
        }
    }

    #[tokio::test]
    async fn never_exceeds_worker_bound() {
        let domains: Vec<String> = (0..40).map(|i| format!("d{i}.com")).collect();
        let mut lookup = ScriptedLookup::new();
        for d in &domains {
            lookup = lookup.answer(d, 10, Ok(vec![ip(1)]));
        }
        let checker = ResolutionChecker::new(lookup, Duration::from_secs(2), 4).unwrap();
        let results = checker.check(&domains).await;

        assert_eq!(results.len(), 40);
        assert!(checker.lookup.peak.load(Ordering::SeqCst) <= 4);
        assert_eq!(checker.lookup.calls.load(Ordering::SeqCst), 40);
    }

    #[tokio::test]
    async fn slow_lookup_times_out_without_blocking_others() {
        let lookup = ScriptedLookup::new()
            .answer("hang.com", 5_000, Ok(vec![ip(9)]))
            .answer("ok.com", 1, Ok(vec![ip(1)]));
        let checker = ResolutionChecker::new(lookup, Duration::from_millis(50), 2).unwrap();

        let results = checker.check(&names(&["hang.com", "ok.com"])).await;
        assert_eq!(results[0].error, Some(ProbeError::Timeout));
        assert!(!results[0].resolves);
        assert!(results[0].ip_addresses.is_empty());
        assert!(results[1].resolves);
    }

    #[tokio::test]
    async fn empty_answer_is_no_record() {
        let lookup = ScriptedLookup::new().answer("empty.com", 1, Ok(vec![]));
        let checker = ResolutionChecker::new(lookup, Duration::from_secs(1), 1).unwrap();
        let results = checker.check(&names(&["empty.com"])).await;
        assert_eq!(results[0].error, Some(ProbeError::NoRecord));
    }

    #[tokio::test]
    async fn failures_are_not_retried() {
        let lookup = ScriptedLookup::new().answer("bad.com", 1, Err(ProbeError::ResolverError));
        let checker = ResolutionChecker::new(lookup, Duration::from_secs(1), 2).unwrap();
        let results = checker.check(&names(&["bad.com"])).await;
        assert_eq!(results[0].error, Some(ProbeError::ResolverError));
        assert_eq!(checker.lookup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancelled_checker_probes_nothing() {
        let checker =
            ResolutionChecker::new(ScriptedLookup::new(), Duration::from_secs(1), 2).unwrap();
        checker.cancel_token().cancel();
        let results = checker.check(&names(&["a.com", "b.com"])).await;
        assert!(results.is_empty());
        assert_eq!(checker.lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancel_mid_run_returns_probed_prefix_in_order() {
        let domains: Vec<String> = (0..50).map(|i| format!("c{i}.com")).collect();
        let mut lookup = ScriptedLookup::new();
        for d in &domains {
            lookup = lookup.answer(d, 20, Ok(vec![ip(1)]));
        }
        let checker = ResolutionChecker::new(lookup, Duration::from_secs(2), 2).unwrap();
        let token = checker.cancel_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(70)).await;
            token.cancel();
        });
        let results = checker.check(&domains).await;

        assert!(!results.is_empty());
        assert!(results.len() < domains.len());
        // workers pull from a shared cursor, so the probed set is a prefix
        for (result, domain) in results.iter().zip(&domains) {
            assert_eq!(&result.domain, domain);
        }
    }

    #[tokio::test]
    async fn signal_cancels_token() {
        let token = CancelToken::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let watcher = token.cancel_on(async move {
            let _ = rx.await;
            Ok(())
        });
        tx.send(()).unwrap();
        watcher.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn aborted_watcher_ignores_late_signal() {
        let token = CancelToken::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let watcher = token.cancel_on(async move {
            let _ = rx.await;
            Ok(())
        });
        watcher.abort();
        assert!(watcher.await.unwrap_err().is_cancelled());
        let _ = tx.send(());
        tokio::task::yield_now().await;
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn rejects_zero_workers_and_timeout() {
        assert!(matches!(
            ResolutionChecker::new(ScriptedLookup::new(), Duration::from_secs(1), 0),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            ResolutionChecker::new(ScriptedLookup::new(), Duration::ZERO, 1),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let checker =
            ResolutionChecker::new(ScriptedLookup::new(), Duration::from_secs(1), 5).unwrap();
        assert!(checker.check(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn invalid_tld_does_not_resolve() {
        let results = check(&names(&["nonexistent-xyz123.invalid"]), Duration::from_secs(1), 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].domain, "nonexistent-xyz123.invalid");
        assert!(!results[0].resolves);
        assert!(results[0].error.is_some());
    }

    #[test]
    fn result_serializes_error_label() {
        let json = serde_json::to_value(ResolutionResult::failed("x.com", ProbeError::NoRecord))
            .unwrap();
        assert_eq!(json["error"], "no_record");
        assert_eq!(json["resolves"], false);

        let json = serde_json::to_value(ResolutionResult::resolved("y.com", vec![ip(7)])).unwrap();
        assert_eq!(json["ip_addresses"][0], "192.0.2.7");
        assert!(json["error"].is_null());
    }
}
