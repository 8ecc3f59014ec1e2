//! DIPA list enriched with per-institution HTML detail pages.
//!
//! The list walk is the same as [`super::dipa`]. Every list item carrying an
//! institution id and a creation period triggers one detail request; the
//! detail page lists the partnerships of that institution for that period
//! in a table recognized by its headers. Output is stably sorted by
//! institution name.

use super::dipa::fetch_list_items;
use super::html::{body_rows, find_table_by_headers};
use super::{FundSource, SourceConfig, SourceKind};
use crate::http::{HttpRequest, RetryingClient};
use crate::normalize::{clean_spaces, normalize_date, value_text};
use crate::types::{FundRecord, FundResult, YearRange};
use async_trait::async_trait;
use scraper::Html;
use serde_json::Value;

pub const DETAIL_URL: &str = "https://dipa.kban.or.kr/pblntf/pblntfDetail";

const NAME_HEADER: &str = "조합명";
const DATE_HEADERS: [&str; 2] = ["등록일", "결성일"];
const MIN_CELLS: usize = 5;

/// One row of the detail table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub fund_name: String,
    pub registered: String,
    pub maturity: String,
    pub total_amount: String,
    pub invested_amount: String,
}

pub struct DipaDetailSource {
    config: SourceConfig,
    client: RetryingClient,
}

impl DipaDetailSource {
    pub fn new(config: SourceConfig, client: RetryingClient) -> Self {
        Self { config, client }
    }

    fn detail_url(&self) -> &str {
        self.config.detail_url.as_deref().unwrap_or(DETAIL_URL)
    }

    async fn fetch_year(&self, year: i32) -> FundResult<Vec<FundRecord>> {
        let items = fetch_list_items(&self.client, &self.config, year).await?;
        let mut records = Vec::new();

        for item in &items {
            let inst_id = value_text(item.get("operInstId"));
            let period = value_text(item.get("dataCreatDdtm"));
            if inst_id.is_empty() || period.is_empty() {
                continue;
            }

            let request = HttpRequest::get(self.detail_url())
                .param("operInstId", &inst_id)
                .param("dataCreatYM", &period);
            let html = self.client.request(&request).await?;
            let rows = parse_detail_rows(&html);
            tracing::debug!("dipa-detail {inst_id}/{period}: {} rows", rows.len());

            records.extend(rows.iter().map(|row| map_detail_row(item, row)));
        }

        Ok(records)
    }
}

#[async_trait]
impl FundSource for DipaDetailSource {
    fn kind(&self) -> SourceKind {
        SourceKind::DipaDetail
    }

    async fn fetch_all(&self, range: YearRange) -> FundResult<Vec<FundRecord>> {
        let mut all = Vec::new();
        for year in range.years() {
            let rows = self.fetch_year(year).await?;
            tracing::info!("dipa-detail: {} rows for {year}", rows.len());
            all.extend(rows);
        }
        all.sort_by(|a, b| a.oper_inst_nm.cmp(&b.oper_inst_nm));
        Ok(all)
    }
}

/// Rows of the partnership table in a detail page; empty when no table matches.
pub fn parse_detail_rows(html: &str) -> Vec<DetailRow> {
    let document = Html::parse_document(html);
    let Some(table) = find_table_by_headers(&document, NAME_HEADER, &DATE_HEADERS) else {
        return Vec::new();
    };

    body_rows(&table)
        .into_iter()
        .filter(|cells| cells.len() >= MIN_CELLS)
        .map(|cells| {
            let mut cells = cells.into_iter();
            let mut next = || cells.next().unwrap_or_default();
            DetailRow {
                fund_name: next(),
                registered: next(),
                maturity: next(),
                total_amount: next(),
                invested_amount: next(),
            }
        })
        .collect()
}

fn map_detail_row(item: &Value, row: &DetailRow) -> FundRecord {
    FundRecord {
        oper_inst_id: value_text(item.get("operInstId")),
        oper_inst_nm: clean_spaces(&value_text(item.get("operInstNm"))),
        com_ind_nm: value_text(item.get("operInstTpNm")),
        fund_nm: row.fund_name.clone(),
        fund_nm_split: row.fund_name.clone(),
        fund_nm_raw: row.fund_name.clone(),
        reg_dd: normalize_date(&row.registered),
        contin_pd: row.maturity.clone(),
        form_totamt: row.total_amount.clone(),
        prsnt_invst_amt: row.invested_amount.clone(),
        ..FundRecord::blank()
    }
}
