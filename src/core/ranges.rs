use crate::domain::model::RangeSpec;
use crate::utils::error::CompileError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Exclusive(f64),
    Inclusive(f64),
}

/// 驗證過的區間：下界、上界至多各一個，而且一定有輸出
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBucket {
    lower: Option<Bound>,
    upper: Option<Bound>,
    output: String,
}

/// Checks the structural rules of one range spec. `index` is only used in the error.
pub fn validate_range_spec(index: usize, spec: &RangeSpec) -> Result<(), CompileError> {
    let invalid = |reason: &str| CompileError::InvalidRangeSpec {
        index,
        reason: reason.to_string(),
    };

    if (spec.gt.is_some() && spec.gte.is_some()) || (spec.lt.is_some() && spec.lte.is_some()) {
        return Err(invalid("you can only specify one of (gt, gte) and (lt, lte)"));
    }
    if spec.gt.is_none() && spec.gte.is_none() && spec.lt.is_none() && spec.lte.is_none() {
        return Err(invalid("you need to specify at least one of gt, gte, lt, lte"));
    }
    if spec.output.is_none() {
        return Err(invalid("you need to specify the output for a range"));
    }
    Ok(())
}

impl RangeBucket {
    pub fn from_spec(index: usize, spec: &RangeSpec) -> Result<Self, CompileError> {
        validate_range_spec(index, spec)?;

        let lower = match (spec.gt, spec.gte) {
            (Some(v), _) => Some(Bound::Exclusive(v)),
            (None, Some(v)) => Some(Bound::Inclusive(v)),
            (None, None) => None,
        };
        let upper = match (spec.lt, spec.lte) {
            (Some(v), _) => Some(Bound::Exclusive(v)),
            (None, Some(v)) => Some(Bound::Inclusive(v)),
            (None, None) => None,
        };

        Ok(Self {
            lower,
            upper,
            output: spec.output.clone().unwrap_or_default(),
        })
    }

    pub fn contains(&self, value: f64) -> bool {
        let above_lower = match self.lower {
            None => true,
            Some(Bound::Exclusive(b)) => value > b,
            Some(Bound::Inclusive(b)) => value >= b,
        };
        let below_upper = match self.upper {
            None => true,
            Some(Bound::Exclusive(b)) => value < b,
            Some(Bound::Inclusive(b)) => value <= b,
        };
        above_lower && below_upper
    }

    pub fn output(&self) -> &str {
        &self.output
    }
}

/// First bucket (in declaration order) containing `value`.
pub fn first_match(buckets: &[RangeBucket], value: f64) -> Option<&RangeBucket> {
    buckets.iter().find(|bucket| bucket.contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: f64 = 0.0;
    const MAX: f64 = 100.0;

    fn bucket(spec: RangeSpec) -> RangeBucket {
        RangeBucket::from_spec(
            0,
            &RangeSpec {
                output: Some("out".to_string()),
                ..spec
            },
        )
        .unwrap()
    }

    #[test]
    fn test_only_lt() {
        let r = bucket(RangeSpec { lt: Some(MAX), ..Default::default() });
        assert!(r.contains(MAX - 1.0));
        assert!(!r.contains(MAX));
        assert!(!r.contains(MAX + 1.0));
    }

    #[test]
    fn test_only_lte() {
        let r = bucket(RangeSpec { lte: Some(MAX), ..Default::default() });
        assert!(r.contains(MAX - 1.0));
        assert!(r.contains(MAX));
        assert!(!r.contains(MAX + 1.0));
    }

    #[test]
    fn test_only_gt() {
        let r = bucket(RangeSpec { gt: Some(MIN), ..Default::default() });
        assert!(!r.contains(MIN - 1.0));
        assert!(!r.contains(MIN));
        assert!(r.contains(MIN + 1.0));
    }

    #[test]
    fn test_only_gte() {
        let r = bucket(RangeSpec { gte: Some(MIN), ..Default::default() });
        assert!(!r.contains(MIN - 1.0));
        assert!(r.contains(MIN));
        assert!(r.contains(MIN + 1.0));
    }

    #[test]
    fn test_gt_and_lt_are_exclusive() {
        let r = bucket(RangeSpec {
            gt: Some(MIN),
            lt: Some(MAX),
            ..Default::default()
        });
        assert!(!r.contains(MIN));
        assert!(r.contains(50.0));
        assert!(!r.contains(MAX));
    }

    #[test]
    fn test_gte_and_lte_are_inclusive() {
        let r = bucket(RangeSpec {
            gte: Some(MIN),
            lte: Some(MAX),
            ..Default::default()
        });
        assert!(!r.contains(-1.0));
        assert!(r.contains(MIN));
        assert!(r.contains(MAX));
        assert!(!r.contains(101.0));
    }

    #[test]
    fn test_mixed_bounds() {
        let gt_lte = bucket(RangeSpec {
            gt: Some(MIN),
            lte: Some(MAX),
            ..Default::default()
        });
        assert!(!gt_lte.contains(MIN));
        assert!(gt_lte.contains(MAX));

        let gte_lt = bucket(RangeSpec {
            gte: Some(MIN),
            lt: Some(MAX),
            ..Default::default()
        });
        assert!(gte_lt.contains(MIN));
        assert!(!gte_lt.contains(MAX));
    }

    #[test]
    fn test_zero_is_a_real_bound() {
        let r = bucket(RangeSpec { lt: Some(0.0), ..Default::default() });
        assert!(r.contains(-0.5));
        assert!(!r.contains(0.0));
    }

    #[test]
    fn test_validation_rules() {
        let output = Some("0-100".to_string());
        let no_bounds = RangeSpec { output: output.clone(), ..Default::default() };
        let both_lower = RangeSpec {
            gt: Some(2.0),
            gte: Some(2.0),
            output: output.clone(),
            ..Default::default()
        };
        let both_upper = RangeSpec {
            lt: Some(2.0),
            lte: Some(2.0),
            output: output.clone(),
            ..Default::default()
        };
        let no_output = RangeSpec {
            gte: Some(2.0),
            lt: Some(2.0),
            ..Default::default()
        };
        let valid = RangeSpec {
            gte: Some(2.0),
            lte: Some(2.0),
            output,
            ..Default::default()
        };

        assert!(validate_range_spec(0, &no_bounds).is_err());
        assert!(validate_range_spec(0, &both_lower).is_err());
        assert!(validate_range_spec(0, &both_upper).is_err());
        assert!(validate_range_spec(0, &no_output).is_err());
        assert!(validate_range_spec(0, &valid).is_ok());

        match validate_range_spec(3, &no_output) {
            Err(CompileError::InvalidRangeSpec { index, reason }) => {
                assert_eq!(index, 3);
                assert!(reason.contains("output"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_first_match_wins() {
        let buckets = vec![
            RangeBucket::from_spec(
                0,
                &RangeSpec {
                    lte: Some(10.0),
                    output: Some("low".to_string()),
                    ..Default::default()
                },
            )
            .unwrap(),
            RangeBucket::from_spec(
                1,
                &RangeSpec {
                    gte: Some(5.0),
                    output: Some("high".to_string()),
                    ..Default::default()
                },
            )
            .unwrap(),
        ];

        assert_eq!(first_match(&buckets, 7.0).map(RangeBucket::output), Some("low"));
        assert_eq!(first_match(&buckets, 11.0).map(RangeBucket::output), Some("high"));
        assert!(first_match(&buckets[..1], 11.0).is_none());
    }
}
