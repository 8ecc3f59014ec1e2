//! Core data types: the canonical fund record, the error enum and the year range.

use serde::{Deserialize, Serialize};

/// One fund / investment-partnership disclosure entry in canonical form.
///
/// Every column is always present; unknown values are `""`. Records are
/// built from [`FundRecord::blank`] and then have their known columns
/// overwritten by the source adapter that parsed them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundRecord {
    #[serde(rename = "operInstId")]
    pub oper_inst_id: String,
    #[serde(rename = "operInstNm")]
    pub oper_inst_nm: String,
    #[serde(rename = "fundNm")]
    pub fund_nm: String,
    #[serde(rename = "투자분야")]
    pub invest_field: String,
    #[serde(rename = "펀드명_분리")]
    pub fund_nm_split: String,
    #[serde(rename = "펀드명_원문")]
    pub fund_nm_raw: String,
    #[serde(rename = "comIndNm")]
    pub com_ind_nm: String,
    #[serde(rename = "comIndCd")]
    pub com_ind_cd: String,
    /// Registration date, ISO `YYYY-MM-DD` or empty.
    #[serde(rename = "regDd")]
    pub reg_dd: String,
    #[serde(rename = "formTotamt")]
    pub form_totamt: String,
    #[serde(rename = "continPd")]
    pub contin_pd: String,
    #[serde(rename = "prsntInvstAmt")]
    pub prsnt_invst_amt: String,
    #[serde(rename = "invstPd")]
    pub invst_pd: String,
}

impl FundRecord {
    /// Column names in export order. Matches the serde names above.
    pub const COLUMNS: [&'static str; 13] = [
        "operInstId",
        "operInstNm",
        "fundNm",
        "투자분야",
        "펀드명_분리",
        "펀드명_원문",
        "comIndNm",
        "comIndCd",
        "regDd",
        "formTotamt",
        "continPd",
        "prsntInvstAmt",
        "invstPd",
    ];

    /// The zero record: every column set to `""`.
    pub fn blank() -> Self {
        Self::default()
    }

    /// All `(column, value)` pairs in [`FundRecord::COLUMNS`] order.
    pub fn fields(&self) -> [(&'static str, &str); 13] {
        let values = self.values();
        let mut out = [("", ""); 13];
        for (i, value) in values.into_iter().enumerate() {
            out[i] = (Self::COLUMNS[i], value);
        }
        out
    }

    /// Column values in [`FundRecord::COLUMNS`] order.
    pub fn values(&self) -> [&str; 13] {
        [
            self.oper_inst_id.as_str(),
            self.oper_inst_nm.as_str(),
            self.fund_nm.as_str(),
            self.invest_field.as_str(),
            self.fund_nm_split.as_str(),
            self.fund_nm_raw.as_str(),
            self.com_ind_nm.as_str(),
            self.com_ind_cd.as_str(),
            self.reg_dd.as_str(),
            self.form_totamt.as_str(),
            self.contin_pd.as_str(),
            self.prsnt_invst_amt.as_str(),
            self.invst_pd.as_str(),
        ]
    }

    /// Look up a column value by its column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

/// Closed interval of registration years, `from <= year <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    /// Build a range, rejecting `from > to`.
    pub fn new(from: i32, to: i32) -> FundResult<Self> {
        if from > to {
            return Err(FundError::InvalidInput(format!(
                "start year {from} is after end year {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// A range covering a single year.
    pub fn single(year: i32) -> Self {
        Self {
            from: year,
            to: year,
        }
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.from..=self.to
    }
}

/// Errors that can occur while collecting records.
#[derive(thiserror::Error, Debug)]
pub enum FundError {
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Decode error for {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type FundResult<T> = Result<T, FundError>;
