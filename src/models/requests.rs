//! Request DTOs for the dashboard API
//!
//! Defines the structure of incoming HTTP request bodies.

use regex::Regex;
use serde::Deserialize;

/// Maximum accepted length of an invalidation pattern
pub const MAX_PATTERN_LENGTH: usize = 256;

/// Request body for POST /cache/invalidate
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Regular expression matched against cache keys
    pub pattern: String,
}

impl InvalidateRequest {
    /// Validates and compiles the pattern.
    ///
    /// Returns an error message if validation fails.
    pub fn compile(&self) -> Result<Regex, String> {
        if self.pattern.is_empty() {
            return Err("Pattern cannot be empty".to_string());
        }
        if self.pattern.len() > MAX_PATTERN_LENGTH {
            return Err(format!(
                "Pattern exceeds maximum length of {} characters",
                MAX_PATTERN_LENGTH
            ));
        }
        Regex::new(&self.pattern).map_err(|e| format!("Invalid pattern: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidate_request_deserialize() {
        let json = r#"{"pattern": "^api:GET:/blocks"}"#;
        let req: InvalidateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.pattern, "^api:GET:/blocks");
        assert!(req.compile().unwrap().is_match("api:GET:/blocks/1"));
    }

    #[test]
    fn test_compile_empty_pattern() {
        let req = InvalidateRequest {
            pattern: "".to_string(),
        };
        assert!(req.compile().is_err());
    }

    #[test]
    fn test_compile_invalid_regex() {
        let req = InvalidateRequest {
            pattern: "(unclosed".to_string(),
        };
        assert!(req.compile().unwrap_err().contains("Invalid pattern"));
    }
}
