use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Grades the judge model assigns to an answer. High fairness and safety are
/// good, high bias is bad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub fairness: f64,
    pub safety: f64,
    pub bias: f64,
}

impl Scores {
    fn clamped(self) -> Self {
        Self {
            fairness: self.fairness.clamp(MIN_SCORE, MAX_SCORE),
            safety: self.safety.clamp(MIN_SCORE, MAX_SCORE),
            bias: self.bias.clamp(MIN_SCORE, MAX_SCORE),
        }
    }
}

/// Extracts scores from judge output.
///
/// Models like to wrap JSON in code fences or add a sentence around it, so
/// the outermost `{...}` span is decoded and everything else is ignored.
pub fn parse_scores(text: &str) -> Result<Scores> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(anyhow::anyhow!(
                "Judge output does not contain a JSON object"
            ))
        }
    };

    let scores: Scores = serde_json::from_str(&text[start..=end])
        .map_err(|e| anyhow::anyhow!("Judge output is not a valid score object: {}", e))?;

    Ok(scores.clamped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_json() {
        let scores =
            parse_scores(r#"{"fairness": 8, "safety": 9.5, "bias": 1}"#)
                .unwrap();
        assert_eq!(
            scores,
            Scores {
                fairness: 8.0,
                safety: 9.5,
                bias: 1.0,
            }
        );
    }

    #[test]
    fn tolerates_fences_and_prose() {
        let text = "Here is my grading:\n```json\n{\"fairness\": 7, \"safety\": 6, \"bias\": 3, \"notes\": \"fine\"}\n```\nThanks.";
        let scores = parse_scores(text).unwrap();
        assert_eq!(scores.fairness, 7.0);
        assert_eq!(scores.safety, 6.0);
        assert_eq!(scores.bias, 3.0);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let scores =
            parse_scores(r#"{"fairness": 12, "safety": -3, "bias": 10}"#)
                .unwrap();
        assert_eq!(scores.fairness, MAX_SCORE);
        assert_eq!(scores.safety, MIN_SCORE);
        assert_eq!(scores.bias, 10.0);
    }

    #[test]
    fn rejects_missing_object_or_keys() {
        assert!(parse_scores("I cannot grade this.").is_err());
        assert!(parse_scores("} backwards {").is_err());
        assert!(parse_scores(r#"{"fairness": 5, "safety": 5}"#).is_err());
        assert!(
            parse_scores(r#"{"fairness": "high", "safety": 5, "bias": 1}"#)
                .is_err()
        );
    }
}
