use crate::config::{AliasStrategy, Config};
use crate::{CastGraphError, Result};

/// Result of configuration validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the configuration is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings
    pub warnings: Vec<String>,
    /// List of tuning suggestions
    pub suggestions: Vec<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl ValidationResult {
    /// Create a new (valid) validation result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error and mark validation as failed
    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
        self.is_valid = false;
    }

    /// Add a warning (doesn't affect validity)
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Add a tuning suggestion
    pub fn add_suggestion(&mut self, suggestion: String) {
        self.suggestions.push(suggestion);
    }

    /// Turn a failed validation into a validation error
    pub fn into_result(self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(CastGraphError::Validation {
                message: self.errors.join("; "),
            })
        }
    }
}

/// Trait for configuration validation
pub trait Validatable {
    /// Validate configuration with standard checks
    fn validate(&self) -> ValidationResult;
    /// Validate configuration with strict checks (includes warnings and suggestions)
    fn validate_strict(&self) -> ValidationResult;
}

impl Validatable for Config {
    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.chunking.max_words == 0 {
            result.add_error("Chunk size must be at least one word".to_string());
        }

        if self.proximity.window == 0 {
            result.add_error("Proximity window must be greater than 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.alias.jaro_winkler_threshold) {
            result.add_error("Jaro-Winkler threshold must be between 0.0 and 1.0".to_string());
        }

        if self.alias.partial_token_sort_threshold > 100 {
            result.add_error("Partial token-sort threshold must be between 0 and 100".to_string());
        }

        if self.ner.person_groups.is_empty() {
            result.add_error("At least one person entity group is required".to_string());
        }

        if self.llm.enabled && self.llm.ollama.chat_model.trim().is_empty() {
            result.add_error("LLM clustering is enabled but no chat model is set".to_string());
        }

        result
    }

    fn validate_strict(&self) -> ValidationResult {
        let mut result = self.validate();

        if self.proximity.window > 100 {
            result.add_warning(
                "Proximity window is very large (>100 tokens), most mention pairs will interact"
                    .to_string(),
            );
        } else if self.proximity.window < 5 {
            result.add_warning(
                "Proximity window is very small (<5 tokens), few interactions will be found"
                    .to_string(),
            );
        }

        match self.alias.strategy {
            AliasStrategy::PartialTokenSort if self.alias.partial_token_sort_threshold < 60 => {
                result.add_warning(
                    "Partial token-sort threshold below 60 merges unrelated characters".to_string(),
                );
            },
            AliasStrategy::JaroWinkler if self.alias.jaro_winkler_threshold < 0.7 => {
                result.add_warning(
                    "Jaro-Winkler threshold below 0.7 merges unrelated characters".to_string(),
                );
            },
            _ => {},
        }

        if self.chunking.max_words > 2000 {
            result.add_suggestion(
                "Chunks above 2000 words usually exceed tagger context limits".to_string(),
            );
        }

        if !self.graph.weighted {
            result.add_suggestion(
                "Enable graph.weighted to keep interaction counts as edge weights".to_string(),
            );
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let result = Config::default().validate();
        assert!(result.is_valid, "{:?}", result.errors);
        assert!(Config::default().validate().into_result().is_ok());
    }

    #[test]
    fn test_invalid_thresholds_are_rejected() {
        let mut config = Config::default();
        config.alias.jaro_winkler_threshold = 1.5;
        config.alias.partial_token_sort_threshold = 120;
        config.proximity.window = 0;

        let result = config.validate();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 3);
        assert!(matches!(
            result.into_result(),
            Err(CastGraphError::Validation { .. })
        ));
    }

    #[test]
    fn test_strict_validation_warns_on_loose_threshold() {
        let mut config = Config::default();
        config.alias.partial_token_sort_threshold = 40;

        let result = config.validate_strict();
        assert!(result.is_valid);
        assert!(!result.warnings.is_empty());
        assert!(!result.suggestions.is_empty());
    }
}
