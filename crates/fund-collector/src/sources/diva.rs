//! DIVA partnership search: a stateful HTML form.
//!
//! A bootstrap GET captures the current value of every named input in the
//! search form (hidden tokens included). Pages are then POSTed with that
//! payload and an incrementing `PAGE_INDEX` over the same session until a
//! page yields no rows or the page cap is reached.

use super::html::{body_rows, form_defaults, set_param};
use super::{FundSource, SourceConfig, SourceKind};
use crate::http::{HttpRequest, RetryingClient};
use crate::normalize::normalize_date;
use crate::types::{FundRecord, FundResult, YearRange};
use async_trait::async_trait;
use scraper::Html;

pub const SEARCH_URL: &str = "http://diva.kvca.or.kr/div/dii/DivItmAssoInq";

const FORM_ID: &str = "asctInfo";
const PAGE_PARAM: &str = "PAGE_INDEX";
const MIN_CELLS: usize = 9;

pub struct DivaSource {
    config: SourceConfig,
    client: RetryingClient,
}

impl DivaSource {
    pub fn new(config: SourceConfig, client: RetryingClient) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl FundSource for DivaSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Diva
    }

    async fn fetch_all(&self, range: YearRange) -> FundResult<Vec<FundRecord>> {
        let session = self.client.session();

        let bootstrap = session
            .request(&HttpRequest::get(&self.config.base_url))
            .await?;
        let mut payload = parse_form_defaults(&bootstrap);
        tracing::debug!("diva: {} form fields captured", payload.len());

        let mut all = Vec::new();
        for page in 1..=self.config.max_pages {
            set_param(&mut payload, PAGE_PARAM, page.to_string());
            let request = HttpRequest::post(&self.config.base_url).with_params(payload.clone());
            let html = session.request(&request).await?;

            let rows = parse_rows(&html);
            if rows.is_empty() {
                tracing::debug!("diva: page {page} empty, stopping");
                break;
            }
            all.extend(rows.into_iter().filter(|r| range.keep(r)));
        }

        tracing::info!("diva: {} rows in range", all.len());
        Ok(all)
    }
}

/// Named inputs of the search form; empty when the form is missing.
pub fn parse_form_defaults(html: &str) -> Vec<(String, String)> {
    form_defaults(&Html::parse_document(html), FORM_ID)
}

/// Result rows of one page.
///
/// Cells: number, institution, fund name, registration date, total amount,
/// maturity, investment field, field code, support classification.
pub fn parse_rows(html: &str) -> Vec<FundRecord> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    body_rows(&root)
        .into_iter()
        .filter(|cells| cells.len() >= MIN_CELLS)
        .map(|cells| FundRecord {
            oper_inst_nm: cells[1].clone(),
            fund_nm: cells[2].clone(),
            reg_dd: normalize_date(&cells[3]),
            form_totamt: cells[4].clone(),
            contin_pd: cells[5].clone(),
            com_ind_nm: cells[6].clone(),
            com_ind_cd: cells[7].clone(),
            invst_pd: cells[8].clone(),
            invest_field: cells[6].clone(),
            fund_nm_split: cells[2].clone(),
            fund_nm_raw: cells[2].clone(),
            ..FundRecord::blank()
        })
        .collect()
}
