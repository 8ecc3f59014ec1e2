//! Runs the selected sources concurrently and keeps one outcome per source.
//!
//! Sources never share state. A failing source yields an `Err` outcome for
//! that source only; every other source's records are still delivered.

use crate::config::CollectorConfig;
use crate::http::{HttpClient, Transport};
use crate::sources::{build_source, SourceKind};
use crate::types::{FundRecord, FundResult, YearRange};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Result of fetching one source.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: SourceKind,
    pub result: FundResult<Vec<FundRecord>>,
}

impl SourceOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Number of records, zero on failure.
    pub fn row_count(&self) -> usize {
        self.result.as_ref().map(Vec::len).unwrap_or(0)
    }

    pub fn records(&self) -> Option<&[FundRecord]> {
        self.result.as_deref().ok()
    }
}

/// Dispatches fetches to source adapters.
pub struct Collector {
    config: CollectorConfig,
    transport: Arc<dyn Transport>,
}

impl Collector {
    /// Collector over a reqwest transport built from `config`.
    pub fn new(config: CollectorConfig) -> FundResult<Self> {
        let transport = HttpClient::new(config.timeout_ms, &config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Collector over a caller-supplied transport.
    pub fn with_transport(config: CollectorConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Fetch one source for `range`.
    pub async fn fetch(&self, kind: SourceKind, range: YearRange) -> FundResult<Vec<FundRecord>> {
        let source = build_source(kind, self.config.source(kind), self.transport.clone());
        tracing::info!("{kind}: fetching {}..={}", range.from, range.to);
        let result = source.fetch_all(range).await;
        match &result {
            Ok(rows) => tracing::info!("{kind}: done, {} rows", rows.len()),
            Err(e) => tracing::warn!("{kind}: failed: {e}"),
        }
        result
    }

    /// Fetch every selected source with bounded concurrency.
    ///
    /// A free slot goes to the next queued source as soon as any running
    /// source finishes, so a slow source only holds its own slot. Outcomes
    /// come back in selection order; repeated selections are fetched once.
    pub async fn collect(&self, selection: &[SourceKind], range: YearRange) -> Vec<SourceOutcome> {
        let mut kinds: Vec<SourceKind> = Vec::with_capacity(selection.len());
        for kind in selection {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }

        let concurrency = self.config.max_concurrency.max(1);
        let mut outcomes: Vec<(usize, SourceOutcome)> = stream::iter(kinds.into_iter().enumerate())
            .map(|(index, kind)| async move {
                let outcome = SourceOutcome {
                    source: kind,
                    result: self.fetch(kind, range).await,
                };
                (index, outcome)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _)| *index);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}
