//! DIPA disclosure list: JSON array pages, one period per request.
//!
//! Pages are requested with an incrementing `pageNo` until the upstream
//! returns an empty array. The endpoint is queried one year at a time
//! (`dataCreatYM=<year>-12`); no further year filtering happens here.

use super::{FundSource, SourceConfig, SourceKind};
use crate::http::{HttpRequest, RetryingClient};
use crate::normalize::{clean_spaces, normalize_date, value_text};
use crate::types::{FundError, FundRecord, FundResult, YearRange};
use async_trait::async_trait;
use serde_json::Value;

pub const LIST_URL: &str = "https://dipa.kban.or.kr/pblntf/pblntfList";

pub struct DipaSource {
    config: SourceConfig,
    client: RetryingClient,
}

impl DipaSource {
    pub fn new(config: SourceConfig, client: RetryingClient) -> Self {
        Self { config, client }
    }

    /// All records disclosed for `year`, in page order.
    pub async fn fetch_year(&self, year: i32) -> FundResult<Vec<FundRecord>> {
        let items = fetch_list_items(&self.client, &self.config, year).await?;
        Ok(items.iter().map(map_list_item).collect())
    }
}

#[async_trait]
impl FundSource for DipaSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Dipa
    }

    async fn fetch_all(&self, range: YearRange) -> FundResult<Vec<FundRecord>> {
        let mut all = Vec::new();
        for year in range.years() {
            let rows = self.fetch_year(year).await?;
            tracing::info!("dipa: {} rows for {year}", rows.len());
            all.extend(rows);
        }
        Ok(all)
    }
}

/// The list request for one page of one year.
pub fn list_request(base_url: &str, year: i32, page_no: u32) -> HttpRequest {
    HttpRequest::get(base_url)
        .param("pageNo", page_no)
        .param("operInstNm", "")
        .param("dataCreatYM", format!("{year}-12"))
        .param("pblntfType", "fdrm")
}

/// Walk the list pages for `year` and return the raw items.
///
/// Stops at the first empty page (`[]`, `null` or `{}`), or at `max_pages`.
/// Any other non-array body, such as an error envelope, fails the walk.
pub async fn fetch_list_items(
    client: &RetryingClient,
    config: &SourceConfig,
    year: i32,
) -> FundResult<Vec<Value>> {
    let mut items = Vec::new();
    let mut page_no = 1u32;

    loop {
        if page_no > config.max_pages {
            tracing::warn!(
                "dipa list for {year}: stopped at page cap {}",
                config.max_pages
            );
            break;
        }

        let data = client
            .request_json(&list_request(&config.base_url, year, page_no))
            .await?;

        let page = match data {
            Value::Array(page) => page,
            Value::Null => Vec::new(),
            Value::Object(obj) if obj.is_empty() => Vec::new(),
            other => {
                return Err(FundError::Decode {
                    url: config.base_url.clone(),
                    message: format!(
                        "list page {page_no} for {year}: expected an array, got {}",
                        json_kind(&other)
                    ),
                });
            }
        };
        if page.is_empty() {
            break;
        }

        tracing::debug!("dipa list page {page_no} for {year}: {} items", page.len());
        items.extend(page);
        page_no += 1;
    }

    Ok(items)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Map one list item into the canonical schema.
pub fn map_list_item(item: &Value) -> FundRecord {
    FundRecord {
        oper_inst_id: value_text(item.get("operInstId")),
        oper_inst_nm: clean_spaces(&value_text(item.get("operInstNm"))),
        // dataCreatDdtm is YYYYMM
        reg_dd: normalize_date(&value_text(item.get("dataCreatDdtm"))),
        form_totamt: value_text(item.get("asctTotAmt")),
        com_ind_nm: value_text(item.get("operInstTpNm")),
        ..FundRecord::blank()
    }
}
