use crate::core::ranges::{first_match, RangeBucket};
use crate::domain::model::{ActionSpec, RangeSpec};
use crate::domain::ports::Transformation;
use crate::utils::error::{ApplyError, CompileError};
use chrono::format::{parse, Item, Pad, Parsed, StrftimeItems};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use sha1::{Digest, Sha1};
use std::fmt::Write;
use std::str::FromStr;

/// The closed set of action names a config may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Identity,
    Outcode,
    Hash,
    Year,
    Ranges,
}

impl FromStr for ActionKind {
    type Err = CompileError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            // "nothing" 是舊設定檔使用的名稱
            "identity" | "nothing" => Ok(ActionKind::Identity),
            "outcode" => Ok(ActionKind::Outcode),
            "hash" => Ok(ActionKind::Hash),
            "year" => Ok(ActionKind::Year),
            "ranges" => Ok(ActionKind::Ranges),
            other => Err(CompileError::UnknownActionName {
                name: other.to_string(),
            }),
        }
    }
}

/// 編譯後的匿名化動作，持有自己的設定（salt、日期格式、區間），之後只讀不寫
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Identity,
    Outcode,
    Hash { salt: String },
    Year { format: String },
    Ranges { buckets: Vec<RangeBucket> },
}

impl Action {
    /// Compiles one action spec. `rng` is only consulted for `hash` actions
    /// without a configured salt, and only once.
    pub fn compile<R: Rng>(spec: &ActionSpec, rng: &mut R) -> Result<Self, CompileError> {
        match spec.name.parse::<ActionKind>()? {
            ActionKind::Identity => Ok(Action::Identity),
            ActionKind::Outcode => Ok(Action::Outcode),
            ActionKind::Hash => {
                let salt = match &spec.salt {
                    Some(salt) => salt.clone(),
                    None => {
                        tracing::debug!("No salt configured for hash action, generating one");
                        random_salt(rng)
                    }
                };
                Ok(Action::hash(&salt))
            }
            ActionKind::Year => {
                let format = spec
                    .date_config
                    .as_ref()
                    .map(|c| c.format.as_str())
                    .ok_or_else(|| CompileError::InvalidDateFormat {
                        format: String::new(),
                        reason: "year action needs a dateConfig.format".to_string(),
                    })?;
                Action::year(format)
            }
            ActionKind::Ranges => Action::ranges(spec.range_config.as_deref().unwrap_or(&[])),
        }
    }

    pub fn hash(salt: &str) -> Self {
        Action::Hash {
            salt: salt.to_string(),
        }
    }

    pub fn year(format: &str) -> Result<Self, CompileError> {
        validate_date_format(format)?;
        Ok(Action::Year {
            format: format.to_string(),
        })
    }

    pub fn ranges(specs: &[RangeSpec]) -> Result<Self, CompileError> {
        if specs.is_empty() {
            return Err(CompileError::InvalidRangeSpec {
                index: 0,
                reason: "ranges action needs at least one range".to_string(),
            });
        }
        let buckets = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| RangeBucket::from_spec(index, spec))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Action::Ranges { buckets })
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Identity => ActionKind::Identity,
            Action::Outcode => ActionKind::Outcode,
            Action::Hash { .. } => ActionKind::Hash,
            Action::Year { .. } => ActionKind::Year,
            Action::Ranges { .. } => ActionKind::Ranges,
        }
    }
}

impl Transformation for Action {
    fn apply(&self, input: &str) -> Result<String, ApplyError> {
        match self {
            Action::Identity => Ok(input.to_string()),
            Action::Outcode => Ok(outcode(input).to_string()),
            Action::Hash { salt } => Ok(salted_sha1(input, salt)),
            Action::Year { format } => parse_year(format, input).map(|year| year.to_string()),
            Action::Ranges { buckets } => {
                let value = input
                    .parse::<f64>()
                    .map_err(|source| ApplyError::NumberParseFailure {
                        value: input.to_string(),
                        source,
                    })?;
                first_match(buckets, value)
                    .map(|bucket| bucket.output().to_string())
                    .ok_or_else(|| ApplyError::NoRangeMatched {
                        value: input.to_string(),
                    })
            }
        }
    }
}

fn random_salt<R: Rng>(rng: &mut R) -> String {
    rng.gen::<u64>().to_string()
}

/// UK postcode outcode: everything before the first space.
fn outcode(input: &str) -> &str {
    input.split_once(' ').map_or(input, |(prefix, _)| prefix)
}

/// Lowercase hex SHA-1 of `input` followed by `salt`.
fn salted_sha1(input: &str, salt: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

fn parse_year(format: &str, input: &str) -> Result<i32, ApplyError> {
    // chrono 會略過數字前的空白，格式沒有空白的位置就不接受空白
    if has_stray_whitespace(format, input) {
        return Err(ApplyError::UnexpectedWhitespace {
            value: input.to_string(),
        });
    }

    let failure = |source| ApplyError::DateParseFailure {
        value: input.to_string(),
        source,
    };

    let mut parsed = Parsed::new();
    parse(&mut parsed, input, StrftimeItems::new(format)).map_err(failure)?;

    // 只有年或年月的格式補成該期間的第一天，其他情況由 chrono 檢查日期是否存在
    let has_day = parsed.day().is_some()
        || parsed.ordinal().is_some()
        || parsed.isoweek().is_some()
        || parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some();
    if !has_day {
        if parsed.month().is_none() {
            parsed.set_month(1).map_err(failure)?;
        }
        parsed.set_day(1).map_err(failure)?;
    }

    parsed
        .to_naive_date()
        .map(|date| date.year())
        .map_err(failure)
}

fn has_stray_whitespace(format: &str, input: &str) -> bool {
    let allows_space = |item: &Item| {
        matches!(
            item,
            Item::Space(_) | Item::OwnedSpace(_) | Item::Numeric(_, Pad::Space)
        )
    };

    let leading = input.starts_with(char::is_whitespace)
        && !StrftimeItems::new(format)
            .next()
            .is_some_and(|item| allows_space(&item));
    let anywhere = input.contains(char::is_whitespace)
        && !StrftimeItems::new(format).any(|item| allows_space(&item));

    leading || anywhere
}

/// 用格式本身做一次來回：以參考時間輸出，再用同一格式解析回來，必須得到同一年
fn validate_date_format(format: &str) -> Result<(), CompileError> {
    let invalid = |reason: String| CompileError::InvalidDateFormat {
        format: format.to_string(),
        reason,
    };

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid("unknown or incomplete format specifier".to_string()));
    }

    let reference = NaiveDate::from_ymd_opt(2006, 1, 2)
        .and_then(|date| date.and_hms_opt(15, 4, 5))
        .ok_or_else(|| invalid("can't build the reference date".to_string()))?;

    let mut rendered = String::new();
    write!(rendered, "{}", reference.format(format))
        .map_err(|_| invalid("format can't render a local date".to_string()))?;

    match parse_year(format, &rendered) {
        Ok(2006) => Ok(()),
        Ok(other) => Err(invalid(format!(
            "round trip through '{}' gives year {}",
            rendered, other
        ))),
        Err(e) => Err(invalid(format!("format can't read back '{}': {}", rendered, e))),
    }
}
