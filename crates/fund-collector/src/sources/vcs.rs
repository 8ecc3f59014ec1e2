//! VCS fund search: JSON pages driven by a reported total count.
//!
//! The first page reports `total` and `rshSearch.pageSize`; the remaining
//! pages `2..=ceil(total / page_size)` are then fetched in order. Items
//! already use the canonical column names. The fund-name cell combines the
//! investment field and the fund name on separate lines.

use super::{FundSource, SourceConfig, SourceKind};
use crate::http::{HttpRequest, RetryingClient};
use crate::normalize::{clean_spaces, normalize_date, split_fund_name, value_text};
use crate::types::{FundRecord, FundResult, YearRange};
use async_trait::async_trait;
use serde_json::Value;

pub const SEARCH_URL: &str = "https://www.vcs.go.kr/web/portal/rsh/search";

pub struct VcsSource {
    config: SourceConfig,
    client: RetryingClient,
}

impl VcsSource {
    pub fn new(config: SourceConfig, client: RetryingClient) -> Self {
        Self { config, client }
    }

    async fn fetch_page(&self, cp: u64) -> FundResult<Value> {
        let request = HttpRequest::get(&self.config.base_url).param("cp", cp);
        self.client.request_json(&request).await
    }
}

#[async_trait]
impl FundSource for VcsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Vcs
    }

    async fn fetch_all(&self, range: YearRange) -> FundResult<Vec<FundRecord>> {
        let first = self.fetch_page(1).await?;
        let pages = total_pages(&first, self.config.page_size);
        tracing::info!("vcs: {pages} pages to fetch");

        let mut all = Vec::new();
        accumulate(&first, &range, &mut all);

        for cp in 2..=pages {
            let data = self.fetch_page(cp).await?;
            accumulate(&data, &range, &mut all);
        }

        tracing::info!("vcs: {} rows in range", all.len());
        Ok(all)
    }
}

/// Non-negative count from a JSON number or numeric string.
/// Fractional values round up.
fn number(value: Option<&Value>) -> Option<u64> {
    let text = match value? {
        Value::Number(n) => return n.as_u64().or_else(|| n.as_f64().and_then(round_up)),
        Value::String(s) => s.trim(),
        _ => return None,
    };
    text.parse::<u64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(round_up))
}

fn round_up(f: f64) -> Option<u64> {
    (f.is_finite() && f >= 0.0).then(|| f.ceil() as u64)
}

/// `max(1, ceil(total / page_size))`, where a zero or missing page size
/// falls back to `default_page_size`.
pub fn total_pages(first: &Value, default_page_size: u32) -> u64 {
    let total = number(first.get("total")).unwrap_or(0);
    let page_size = number(first.get("rshSearch").and_then(|s| s.get("pageSize")))
        .filter(|&n| n > 0)
        .unwrap_or_else(|| u64::from(default_page_size.max(1)));
    total.div_ceil(page_size).max(1)
}

fn accumulate(page: &Value, range: &YearRange, out: &mut Vec<FundRecord>) {
    let Some(items) = page.get("list").and_then(Value::as_array) else {
        return;
    };
    out.extend(items.iter().map(map_item).filter(|r| range.keep(r)));
}

/// Map one search item into the canonical schema.
pub fn map_item(item: &Value) -> FundRecord {
    let text = |column: &str| value_text(item.get(column));

    let mut invest_field = text("투자분야");
    let mut fund_nm_split = text("펀드명_분리");
    let mut fund_nm_raw = text("펀드명_원문");
    if item.get("fundNm").is_some() {
        let name = split_fund_name(&text("fundNm"));
        invest_field = name.field;
        fund_nm_split = name.name;
        fund_nm_raw = name.raw;
    }

    FundRecord {
        oper_inst_id: text("operInstId"),
        oper_inst_nm: clean_spaces(&text("operInstNm")),
        fund_nm: text("fundNm"),
        invest_field,
        fund_nm_split,
        fund_nm_raw,
        com_ind_nm: text("comIndNm"),
        com_ind_cd: text("comIndCd"),
        reg_dd: normalize_date(&text("regDd")),
        form_totamt: text("formTotamt"),
        contin_pd: text("continPd"),
        prsnt_invst_amt: text("prsntInvstAmt"),
        invst_pd: text("invstPd"),
    }
}
