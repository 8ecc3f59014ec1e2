//! RCMS tech-finance funds: card-based HTML pages.
//!
//! Page 1 carries the pager; its highest page number decides how many more
//! pages are fetched. Each `.fund__item` card yields one record. Year
//! filtering runs once, after every page has been collected.

use super::html::{element_text, has_class, max_page, select_first, select_text, selector};
use super::{FundSource, SourceConfig, SourceKind};
use crate::filter::retain_in_range;
use crate::http::{HttpRequest, RetryingClient};
use crate::normalize::{clean_spaces, normalize_date};
use crate::types::{FundRecord, FundResult, YearRange};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

pub const LIST_URL: &str = "https://techfin.rcms.go.kr/ivsm/fndinfo/tchnFndInfo.do";

pub struct RcmsSource {
    config: SourceConfig,
    client: RetryingClient,
}

impl RcmsSource {
    pub fn new(config: SourceConfig, client: RetryingClient) -> Self {
        Self { config, client }
    }

    async fn fetch_page(&self, page: u32) -> FundResult<String> {
        let request = HttpRequest::get(&self.config.base_url).param("pageIndex", page);
        self.client.request(&request).await
    }
}

#[async_trait]
impl FundSource for RcmsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Rcms
    }

    async fn fetch_all(&self, range: YearRange) -> FundResult<Vec<FundRecord>> {
        let first = self.fetch_page(1).await?;
        let (last_page, mut all) = parse_first_page(&first);
        let last_page = last_page.min(self.config.max_pages);
        tracing::info!("rcms: {last_page} pages to fetch");

        for page in 2..=last_page {
            let html = self.fetch_page(page).await?;
            all.extend(parse_cards(&html));
        }

        let kept = retain_in_range(all, &range);
        tracing::info!("rcms: {} rows in range", kept.len());
        Ok(kept)
    }
}

fn parse_first_page(html: &str) -> (u32, Vec<FundRecord>) {
    let document = Html::parse_document(html);
    (max_page(&document), cards_in(&document))
}

/// Every fund card on a page.
pub fn parse_cards(html: &str) -> Vec<FundRecord> {
    cards_in(&Html::parse_document(html))
}

fn cards_in(document: &Html) -> Vec<FundRecord> {
    document
        .select(&selector(".fund__item"))
        .map(|card| parse_card(&card))
        .collect()
}

/// `.title` / `.content` pairs of every `.col` under `column_css`.
fn column_pairs(card: &ElementRef<'_>, column_css: &str) -> Vec<(String, String)> {
    card.select(&selector(&format!("{column_css} .col")))
        .map(|col| (select_text(&col, ".title", ""), select_text(&col, ".content", " ")))
        .collect()
}

fn parse_card(card: &ElementRef<'_>) -> FundRecord {
    let year: String = select_text(card, ".label__green", "")
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    let field = card
        .select(&selector(".label__inner .label"))
        .find(|label| !has_class(label, "label__green") && !has_class(label, "label__orange"))
        .map(|label| clean_spaces(&element_text(&label, "")))
        .unwrap_or_default();

    let title = clean_spaces(&select_text(card, ".top .title", ""));
    let fund_type = select_first(card, ".label__orange").map(|el| clean_spaces(&element_text(&el, "")));

    let mut record = FundRecord {
        fund_nm: title.clone(),
        fund_nm_split: title.clone(),
        fund_nm_raw: title,
        com_ind_nm: field.clone(),
        invest_field: field,
        com_ind_cd: fund_type.unwrap_or_default(),
        ..FundRecord::blank()
    };

    for (key, value) in column_pairs(card, ".left") {
        if key == "위탁운용사" {
            record.oper_inst_nm = clean_spaces(&value);
        }
    }

    for (key, value) in column_pairs(card, ".right") {
        match key.as_str() {
            "펀드규모" => record.form_totamt = clean_spaces(&value),
            "결성일자" => record.reg_dd = normalize_date(&value),
            "만기일자" => record.contin_pd = clean_spaces(&value),
            "투자 집행률" => record.prsnt_invst_amt = clean_spaces(&value),
            "투자기업" => record.invst_pd = clean_spaces(&value),
            _ => {}
        }
    }

    if record.reg_dd.is_empty() && !year.is_empty() {
        record.reg_dd = normalize_date(&format!("{year}-01-01"));
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{ok, ScriptedTransport};
    use crate::http::RetryPolicy;
    use std::time::Duration;

    fn card(year: &str, title: &str, reg: Option<&str>) -> String {
        let reg_col = reg
            .map(|r| format!(r#"<div class="col"><p class="title">결성일자</p><p class="content">{r}</p></div>"#))
            .unwrap_or_default();
        format!(
            r#"
            <div class="fund__item">
              <div class="top">
                <div class="label__inner">
                  <span class="label label__green">{year}</span>
                  <span class="label">바이오</span>
                  <span class="label label__orange">모태펀드</span>
                </div>
                <p class="title"> {title} </p>
              </div>
              <div class="bottom">
                <div class="left">
                  <div class="col"><p class="title">위탁운용사</p><p class="content">가나  인베스트먼트</p></div>
                </div>
                <div class="right">
                  <div class="col"><p class="title">펀드규모</p><p class="content">300 억원</p></div>
                  {reg_col}
                  <div class="col"><p class="title">만기일자</p><p class="content">2031.12.31</p></div>
                  <div class="col"><p class="title">투자 집행률</p><p class="content">45%</p></div>
                  <div class="col"><p class="title">투자기업</p><p class="content">가 사, 나 사</p></div>
                  <div class="col"><p class="title">비고</p><p class="content">무시</p></div>
                </div>
              </div>
            </div>"#
        )
    }

    fn page(cards: &[String], pager: &str) -> String {
        format!("<html><body><div class=\"list\">{}</div>{pager}</body></html>", cards.concat())
    }

    #[test]
    fn test_parse_card_fields() {
        let html = page(&[card("2023년", "바이오 1호 펀드", Some("20230610"))], "");
        let rows = parse_cards(&html);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.fund_nm, "바이오 1호 펀드");
        assert_eq!(r.fund_nm_split, r.fund_nm);
        assert_eq!(r.com_ind_nm, "바이오");
        assert_eq!(r.invest_field, "바이오");
        assert_eq!(r.com_ind_cd, "모태펀드");
        assert_eq!(r.oper_inst_nm, "가나 인베스트먼트");
        assert_eq!(r.form_totamt, "300 억원");
        assert_eq!(r.reg_dd, "2023-06-10");
        assert_eq!(r.contin_pd, "2031.12.31");
        assert_eq!(r.prsnt_invst_amt, "45%");
        assert_eq!(r.invst_pd, "가 사, 나 사");
        assert_eq!(r.oper_inst_id, "");
    }

    #[test]
    fn test_missing_registration_uses_year_label() {
        let rows = parse_cards(&page(&[card("2024년", "펀드", None)], ""));
        assert_eq!(rows[0].reg_dd, "2024-01-01");

        let rows = parse_cards(&page(&[card("미정", "펀드", None)], ""));
        assert_eq!(rows[0].reg_dd, "");
    }

    #[test]
    fn test_page_without_cards() {
        assert!(parse_cards("<html><body><p>검색 결과가 없습니다</p></body></html>").is_empty());
    }

    #[tokio::test]
    async fn test_fetches_all_pages_then_filters() {
        let pager = r#"<div class="paging"><a>1</a><a>2</a><a>3</a><a>다음</a></div>"#;
        let transport = ScriptedTransport::new(move |req| {
            let body = match req.param_value("pageIndex") {
                Some("1") => page(&[card("2023", "p1-a", None), card("2019", "p1-old", None)], pager),
                Some("2") => page(&[card("2024", "p2-a", Some("2024-03-01"))], pager),
                Some("3") => page(&[card("2025", "p3-a", None)], pager),
                other => panic!("unexpected page {other:?}"),
            };
            ok(body)
        });

        let config = SourceConfig::defaults_for(SourceKind::Rcms);
        let client = RetryingClient::new(transport.handle(), RetryPolicy::new(3, Duration::ZERO));
        let rows = RcmsSource::new(config, client)
            .fetch_all(YearRange::new(2023, 2024).unwrap())
            .await
            .unwrap();

        let names: Vec<_> = rows.iter().map(|r| r.fund_nm.as_str()).collect();
        assert_eq!(names, vec!["p1-a", "p2-a"]);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_single_page_without_pager() {
        let transport = ScriptedTransport::new(|_| ok(page(&[card("2023", "only", None)], "")));
        let config = SourceConfig::defaults_for(SourceKind::Rcms);
        let client = RetryingClient::new(transport.handle(), RetryPolicy::new(3, Duration::ZERO));
        let rows = RcmsSource::new(config, client)
            .fetch_all(YearRange::single(2023))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(transport.request_count(), 1);
    }
}
