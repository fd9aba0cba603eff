//! Reward quote model.

use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Stored quote revealed for an achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub quote_en: String,
    pub quote_ja: String,
    pub author: String,
}

/// Quote content before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuote {
    pub quote_en: String,
    pub quote_ja: String,
    pub author: String,
}

impl NewQuote {
    /// Ensures every text field carries content.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("quote_en", &self.quote_en),
            ("quote_ja", &self.quote_ja),
            ("author", &self.author),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyQuoteField(field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_names_the_empty_field() {
        let quote = NewQuote {
            quote_en: "Stay hungry.".to_string(),
            quote_ja: " ".to_string(),
            author: "Steve Jobs".to_string(),
        };
        assert_eq!(
            quote.validate().unwrap_err(),
            ValidationError::EmptyQuoteField("quote_ja")
        );
    }
}
