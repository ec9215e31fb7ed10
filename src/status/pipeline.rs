// src/status/pipeline.rs
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainResult;
use crate::domain::ports::repository::BookmarkRepository;

use super::classifier::{reason_phrase, status_class, ProbeFailure};

const MAX_CONCURRENT_REQUESTS: usize = 25;
const POLITENESS_DELAY: Duration = Duration::from_millis(50);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Seam for issuing the actual probe (§4.I): the default adapter hits
/// the network with `reqwest`; tests substitute a fake that returns
/// fixed codes/failures per URL, per the mock-HTTP scenarios in §8.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> Result<i32, ProbeFailure>;
}

/// Default network-backed prober.
pub struct ReqwestProber {
    client: reqwest::Client,
}

impl ReqwestProber {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");
        Self { client }
    }
}

impl Default for ReqwestProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for ReqwestProber {
    async fn probe(&self, url: &str) -> Result<i32, ProbeFailure> {
        match self.client.get(url).send().await {
            Ok(resp) => Ok(resp.status().as_u16() as i32),
            Err(e) => Err(ProbeFailure::classify(&e)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusOutcome {
    pub url: String,
    pub code: i32,
    pub text: String,
}

/// Per-class bucketed outcomes, grouped by insertion order within a
/// class (§5 ordering rule).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    pub outcomes: Vec<StatusOutcome>,
}

impl StatusReport {
    /// `(class, code, count)` sorted by class then code, each count the
    /// number of URLs landing on that exact code.
    pub fn buckets(&self) -> Vec<(&'static str, i32, usize)> {
        let mut counts: BTreeMap<(&'static str, i32), usize> = BTreeMap::new();
        for outcome in &self.outcomes {
            *counts.entry((status_class(outcome.code), outcome.code)).or_insert(0) += 1;
        }
        counts.into_iter().map(|((class, code), n)| (class, code, n)).collect()
    }

    /// Plain-text summary lines, e.g. `"1 URLs returned 'OK' (200)"`.
    /// Coloring by class is left to the terminal layer that consumes
    /// this report; this only emits the textual content §8 checks.
    pub fn summary_lines(&self) -> Vec<String> {
        self.buckets()
            .into_iter()
            .map(|(_, code, n)| format!("{n} URLs returned '{}' ({code})", reason_phrase(code)))
            .collect()
    }

    pub fn urls_for_class(&self, class: &str) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| status_class(o.code) == class)
            .map(|o| o.url.as_str())
            .collect()
    }
}

/// Bounded-concurrency HTTP status prober over a set of bookmarks
/// (§4.I). A weighted semaphore caps in-flight requests at 25; each
/// acquisition is preceded by a 50ms politeness delay before the
/// request is launched, matching the semaphore+sleep+fan-out shape the
/// source used, generalized to a `tokio::sync::Semaphore` task group.
pub struct StatusPipeline<P: Prober> {
    prober: Arc<P>,
}

impl StatusPipeline<ReqwestProber> {
    pub fn new() -> Self {
        Self {
            prober: Arc::new(ReqwestProber::new()),
        }
    }
}

impl Default for StatusPipeline<ReqwestProber> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Prober + 'static> StatusPipeline<P> {
    pub fn with_prober(prober: Arc<P>) -> Self {
        Self { prober }
    }

    #[instrument(skip_all, level = "info", fields(n = bookmarks.len()))]
    pub async fn run(&self, bookmarks: &[Bookmark]) -> StatusReport {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_REQUESTS));
        let mut handles = Vec::with_capacity(bookmarks.len());

        for bookmark in bookmarks {
            let permit = semaphore.clone().acquire_owned().await.expect("semaphore never closed");
            tokio::time::sleep(POLITENESS_DELAY).await;

            let prober = self.prober.clone();
            let url = bookmark.url.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = match prober.probe(&url).await {
                    Ok(code) => StatusOutcome {
                        url,
                        code,
                        text: reason_phrase(code).to_string(),
                    },
                    Err(failure) => StatusOutcome {
                        url,
                        code: failure.status_code(),
                        text: failure.status_text().to_string(),
                    },
                };
                outcome
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(outcome) = handle.await {
                outcomes.push(outcome);
            }
        }

        debug!(count = outcomes.len(), "status pipeline finished");
        StatusReport { outcomes }
    }

    /// Runs the pipeline and, if `writeback` is set, persists each
    /// outcome's code/text/liveness/timestamp back onto the store.
    pub async fn run_and_writeback(
        &self,
        repo: &dyn BookmarkRepository,
        bookmarks: &[Bookmark],
        writeback: bool,
    ) -> DomainResult<StatusReport> {
        let report = self.run(bookmarks).await;
        if writeback {
            for outcome in &report.outcomes {
                let is_active = (200..=299).contains(&outcome.code);
                repo.set_status(&outcome.url, outcome.code, &outcome.text, is_active)?;
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeProber {
        responses: HashMap<String, Result<i32, ProbeFailure>>,
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn probe(&self, url: &str) -> Result<i32, ProbeFailure> {
            self.responses.get(url).cloned().unwrap_or(Ok(200))
        }
    }

    fn bm(url: &str) -> Bookmark {
        Bookmark::new(url, "T", "D", "go")
    }

    #[tokio::test]
    async fn buckets_mixed_outcomes_by_status_class() {
        let mut responses = HashMap::new();
        responses.insert("https://u2xx/".to_string(), Ok(200));
        responses.insert("https://u4xx/".to_string(), Ok(404));
        responses.insert("https://u5xx/".to_string(), Ok(500));

        let pipeline = StatusPipeline::with_prober(Arc::new(FakeProber { responses }));
        let bookmarks = vec![bm("https://u2xx/"), bm("https://u4xx/"), bm("https://u5xx/")];
        let report = pipeline.run(&bookmarks).await;

        let lines = report.summary_lines();
        assert!(lines.iter().any(|l| l == "1 URLs returned 'OK' (200)"));
        assert!(lines.iter().any(|l| l == "1 URLs returned 'Not Found' (404)"));
        assert!(lines.iter().any(|l| l == "1 URLs returned 'Internal Server Error' (500)"));
    }

    #[tokio::test]
    async fn classifies_network_failures_into_the_5xx_detail_codes() {
        let mut responses = HashMap::new();
        responses.insert("https://timeout/".to_string(), Err(ProbeFailure::Timeout));
        responses.insert("https://unreachable/".to_string(), Err(ProbeFailure::NetworkUnreachable));
        responses.insert("https://cancelled/".to_string(), Err(ProbeFailure::Cancelled));

        let pipeline = StatusPipeline::with_prober(Arc::new(FakeProber { responses }));
        let bookmarks = vec![bm("https://timeout/"), bm("https://unreachable/"), bm("https://cancelled/")];
        let report = pipeline.run(&bookmarks).await;

        let codes: std::collections::HashSet<i32> = report.outcomes.iter().map(|o| o.code).collect();
        assert!(codes.contains(&504));
        assert!(codes.contains(&503));
        assert!(codes.contains(&404));
    }
}
