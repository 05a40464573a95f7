use crate::core::actions::ActionKind;
use crate::core::ranges::validate_range_spec;
use crate::domain::model::ActionSpec;
use crate::utils::error::{AnonError, Result};
use crate::utils::validation::{
    validate_delimiter, validate_non_empty_string, validate_positive_number,
    validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv: Option<CsvConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<JsonConfig>,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub id_column: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonConfig {
    pub id_field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(rename = "mod", default = "default_modulus")]
    pub modulus: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            modulus: default_modulus(),
        }
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            id_column: 0,
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_modulus() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingMode<'a> {
    Csv(&'a CsvConfig),
    Json(&'a JsonConfig),
}

impl AnonConfig {
    /// 從 JSON 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AnonError::IoError)?;
        Self::from_json_str(&content)
    }

    /// 從 JSON 字串解析配置
    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        serde_json::from_str(&processed_content).map_err(|e| AnonError::ConfigValidationError {
            field: "json_parsing".to_string(),
            message: format!("JSON parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ANON_SALT})，讓 salt 不必寫在設定檔裡
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            AnonError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => escape_json_fragment(&value),
                Err(_) => {
                    tracing::warn!("Environment variable {} is not set, leaving it as is", var_name);
                    caps[0].to_string()
                }
            }
        });

        Ok(result.into_owned())
    }

    /// Which processor this config selects. Exactly one of `csv` / `json` must be set.
    pub fn mode(&self) -> Result<ProcessingMode<'_>> {
        match (&self.csv, &self.json) {
            (Some(csv), None) => Ok(ProcessingMode::Csv(csv)),
            (None, Some(json)) => Ok(ProcessingMode::Json(json)),
            (Some(_), Some(_)) => Err(AnonError::ConfigValidationError {
                field: "csv/json".to_string(),
                message: "only one of csv or json can be configured".to_string(),
            }),
            (None, None) => Err(AnonError::ConfigValidationError {
                field: "csv/json".to_string(),
                message: "one of csv or json must be configured".to_string(),
            }),
        }
    }

    /// 驗證配置的合理性：和編譯時相同的結構規則，在開啟輸入前先回報
    pub fn validate_config(&self) -> Result<()> {
        let mode = self.mode()?;

        match mode {
            ProcessingMode::Csv(csv) => {
                validate_delimiter("csv.delimiter", &csv.delimiter)?;
            }
            ProcessingMode::Json(json) => {
                validate_non_empty_string("json.idField", &json.id_field)?;
            }
        }

        validate_positive_number("sampling.mod", self.sampling.modulus, 1)?;

        for (i, action) in self.actions.iter().enumerate() {
            match action.name.parse::<ActionKind>()? {
                ActionKind::Year => {
                    validate_required_field(
                        &format!("actions[{}].dateConfig", i),
                        &action.date_config,
                    )?;
                }
                ActionKind::Ranges => {
                    let ranges = validate_required_field(
                        &format!("actions[{}].rangeConfig", i),
                        &action.range_config,
                    )?;
                    for (index, range) in ranges.iter().enumerate() {
                        validate_range_spec(index, range)?;
                    }
                }
                ActionKind::Identity | ActionKind::Outcode | ActionKind::Hash => {}
            }

            if let ProcessingMode::Json(_) = mode {
                let field = validate_required_field(
                    &format!("actions[{}].jsonField", i),
                    &action.json_field,
                )?;
                validate_non_empty_string(&format!("actions[{}].jsonField", i), field)?;
            }
        }

        Ok(())
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

impl Validate for AnonConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// 環境變數值插進 JSON 字串裡，需要跳脫引號與反斜線
fn escape_json_fragment(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
