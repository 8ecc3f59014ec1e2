//! Source adapters.
//!
//! Each adapter owns one upstream endpoint: its pagination, its parsing and
//! its mapping into [`FundRecord`]. All of them expose [`FundSource`].

pub mod dipa;
pub mod dipa_detail;
pub mod diva;
pub mod html;
pub mod rcms;
pub mod vcs;

pub use dipa::DipaSource;
pub use dipa_detail::DipaDetailSource;
pub use diva::DivaSource;
pub use rcms::RcmsSource;
pub use vcs::VcsSource;

use crate::http::{RetryPolicy, RetryingClient, Transport};
use crate::types::{FundError, FundRecord, FundResult, YearRange};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Known upstream sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// DIPA disclosure list (JSON, cursor pagination).
    Dipa,
    /// DIPA list plus per-institution HTML detail pages.
    DipaDetail,
    /// VCS fund search (JSON, total-count pagination).
    Vcs,
    /// DIVA partnership search (stateful HTML form).
    Diva,
    /// RCMS tech-finance fund cards (HTML).
    Rcms,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Dipa,
        SourceKind::DipaDetail,
        SourceKind::Vcs,
        SourceKind::Diva,
        SourceKind::Rcms,
    ];

    /// Stable machine name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Dipa => "dipa",
            SourceKind::DipaDetail => "dipa-detail",
            SourceKind::Vcs => "vcs",
            SourceKind::Diva => "diva",
            SourceKind::Rcms => "rcms",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Dipa => "DIPA(개인투자조합 공시)",
            SourceKind::DipaDetail => "DIPA(개인투자조합 공시, 상세)",
            SourceKind::Vcs => "VCS(펀드)",
            SourceKind::Diva => "DIVA(투자조합)",
            SourceKind::Rcms => "RCMS(기술금융 펀드)",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SourceKind {
    type Err = FundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        SourceKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = SourceKind::ALL.iter().map(|k| k.name()).collect();
                FundError::InvalidInput(format!(
                    "unknown source '{s}' (known: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Everything one adapter needs to know about its endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    /// Secondary endpoint for per-item detail pages.
    pub detail_url: Option<String>,
    pub retry: RetryPolicy,
    /// Page size assumed when the upstream does not report one.
    pub page_size: u32,
    /// Hard cap on the number of pages requested per walk.
    pub max_pages: u32,
}

impl SourceConfig {
    /// Built-in configuration for `kind`.
    pub fn defaults_for(kind: SourceKind) -> Self {
        let (base_url, detail_url, max_pages) = match kind {
            SourceKind::Dipa => (dipa::LIST_URL, None, 1000),
            SourceKind::DipaDetail => (dipa::LIST_URL, Some(dipa_detail::DETAIL_URL), 1000),
            SourceKind::Vcs => (vcs::SEARCH_URL, None, 1000),
            SourceKind::Diva => (diva::SEARCH_URL, None, 500),
            SourceKind::Rcms => (rcms::LIST_URL, None, 1000),
        };
        Self {
            base_url: base_url.to_string(),
            detail_url: detail_url.map(str::to_string),
            retry: RetryPolicy::default(),
            page_size: 10,
            max_pages,
        }
    }
}

/// A source that can produce canonical records for a year range.
#[async_trait]
pub trait FundSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Fetch every page and return records in source order.
    async fn fetch_all(&self, range: YearRange) -> FundResult<Vec<FundRecord>>;
}

/// Construct the adapter for `kind`.
pub fn build_source(
    kind: SourceKind,
    config: SourceConfig,
    transport: Arc<dyn Transport>,
) -> Box<dyn FundSource> {
    let client = RetryingClient::new(transport, config.retry);
    match kind {
        SourceKind::Dipa => Box::new(DipaSource::new(config, client)),
        SourceKind::DipaDetail => Box::new(DipaDetailSource::new(config, client)),
        SourceKind::Vcs => Box::new(VcsSource::new(config, client)),
        SourceKind::Diva => Box::new(DivaSource::new(config, client)),
        SourceKind::Rcms => Box::new(RcmsSource::new(config, client)),
    }
}
