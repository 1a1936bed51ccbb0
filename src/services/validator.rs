use bon::Builder;

use crate::models::config::ValidationConfig;
use crate::models::error::ValidationError;
use crate::models::types::PromptRequest;

/// Rejects prompts that must not reach a generator.
#[derive(Debug, Clone, Default, Builder)]
pub struct Validator {
    max_prompt_chars: Option<usize>,
}

impl Validator {
    pub fn from_config(cfg: &ValidationConfig) -> Self {
        Self { max_prompt_chars: cfg.max_prompt_chars }
    }

    pub fn validate(&self, raw: &str) -> Result<PromptRequest, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }
        if let Some(max) = self.max_prompt_chars {
            let len = trimmed.chars().count();
            if len > max {
                return Err(ValidationError::TooLong { len, max });
            }
        }
        Ok(PromptRequest::from_trimmed(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n \r\n")]
    fn rejects_blank_prompts(#[case] raw: &str) {
        assert_eq!(Validator::default().validate(raw), Err(ValidationError::Empty));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let req = Validator::default().validate("  What is AI?\n").unwrap();
        assert_eq!(req.as_str(), "What is AI?");
    }

    #[test]
    fn tolerates_arbitrary_text_by_default() {
        let long = "x".repeat(100_000);
        assert!(Validator::default().validate(&long).is_ok());
        assert!(Validator::default().validate("{{ }} \u{0} ☃").is_ok());
    }

    #[test]
    fn enforces_optional_limit_in_chars() {
        let v = Validator::builder().max_prompt_chars(3).build();
        assert!(v.validate(" абв ").is_ok());
        assert_eq!(v.validate("абвг"), Err(ValidationError::TooLong { len: 4, max: 3 }));
    }

    #[test]
    fn limit_ignores_surrounding_whitespace() {
        let v = Validator::builder().max_prompt_chars(5).build();
        let padded = format!("{}hello{}", " ".repeat(100), "\n".repeat(100));
        assert_eq!(v.validate(&padded).unwrap().as_str(), "hello");
    }
}
