use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which visibility rule table an analyzer applies.
///
/// Two historical rule tables disagree on bonus size, penalty shape, and
/// rounding. An analyzer is built with exactly one of them.
///
/// | Policy | rank 1 | rank 2-3 | lower ranks | competitor penalty | rounding |
/// |---|---|---|---|---|---|
/// | `Graduated` | +3 | +2 | rank 4-5: +1 | `min(2, n * 0.2)` | one decimal |
/// | `Stepped` | +2 | +2 | rank 4-6: +1 | 2 if n > 8, 1 if n > 4 | whole number |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPolicy {
    #[default]
    Graduated,
    Stepped,
}

impl std::fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringPolicy::Graduated => write!(f, "graduated"),
            ScoringPolicy::Stepped => write!(f, "stepped"),
        }
    }
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graduated" => Ok(ScoringPolicy::Graduated),
            "stepped" => Ok(ScoringPolicy::Stepped),
            other => Err(format!(
                "unknown scoring policy '{other}'; expected 'graduated' or 'stepped'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_policies_case_insensitively() {
        assert_eq!(
            "graduated".parse::<ScoringPolicy>(),
            Ok(ScoringPolicy::Graduated)
        );
        assert_eq!(" Stepped ".parse::<ScoringPolicy>(), Ok(ScoringPolicy::Stepped));
    }

    #[test]
    fn rejects_unknown_policy() {
        let err = "linear".parse::<ScoringPolicy>().unwrap_err();
        assert!(err.contains("unknown scoring policy 'linear'"));
    }

    #[test]
    fn display_matches_parse_input() {
        for policy in [ScoringPolicy::Graduated, ScoringPolicy::Stepped] {
            assert_eq!(policy.to_string().parse::<ScoringPolicy>(), Ok(policy));
        }
    }

    #[test]
    fn default_is_graduated() {
        assert_eq!(ScoringPolicy::default(), ScoringPolicy::Graduated);
    }
}
