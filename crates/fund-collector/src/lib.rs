//! fund-collector: collect fund / investment-partnership disclosures from
//! public sources and normalize them into one canonical record schema.

pub mod collector;
pub mod config;
pub mod filter;
pub mod http;
pub mod normalize;
pub mod sources;
pub mod types;

pub use collector::{Collector, SourceOutcome};
pub use config::{resolve_config_path, CollectorConfig, SourceOverride};
pub use http::{HttpClient, HttpRequest, HttpResponse, Method, RetryPolicy, RetryingClient, Transport};
pub use normalize::{clean_spaces, normalize_date, split_fund_name, FundName};
pub use sources::{build_source, FundSource, SourceConfig, SourceKind};
pub use types::*;
