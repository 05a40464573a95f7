use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 單一欄位的匿名化設定（尚未編譯）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_config: Option<DateConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_config: Option<Vec<RangeSpec>>,
}

impl ActionSpec {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_salt(mut self, salt: &str) -> Self {
        self.salt = Some(salt.to_string());
        self
    }

    pub fn with_json_field(mut self, field: &str) -> Self {
        self.json_field = Some(field.to_string());
        self
    }

    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_config = Some(DateConfig {
            format: format.to_string(),
        });
        self
    }

    pub fn with_ranges(mut self, ranges: Vec<RangeSpec>) -> Self {
        self.range_config = Some(ranges);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateConfig {
    pub format: String,
}

/// 一個數值區間與其輸出標籤。
///
/// 所有欄位都是 `Option`：0 是合法的邊界值，不能拿來代表「未設定」。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Keyed record read in JSON mode. Keys are kept sorted on output.
pub type JsonRecord = BTreeMap<String, String>;

/// 一次處理的統計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessStats {
    pub records_read: u64,
    pub records_written: u64,
    pub sampled_out: u64,
    pub rows_skipped: u64,
    pub field_errors: u64,
}
