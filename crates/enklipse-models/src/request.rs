//! Clip submission payloads.

use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::clip::ClipId;
use crate::narrator::{find_voice, DEFAULT_NARRATOR};

pub const MIN_TITLE_CHARS: usize = 3;
pub const MAX_TITLE_CHARS: usize = 30;
pub const MIN_SCRIPT_WORDS: usize = 100;
pub const MAX_SCRIPT_WORDS: usize = 500;

/// Request body for `POST /clip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClipRequest {
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[validate(custom(function = "validate_script"))]
    pub script: String,

    /// Voice id from the narrator catalog
    #[validate(custom(function = "validate_narrator"))]
    #[serde(default = "default_narrator")]
    pub narrator: String,

    #[serde(default = "default_captions")]
    pub captions_required: bool,
}

impl CreateClipRequest {
    /// Create a request with the default narrator and captions enabled.
    pub fn new(title: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            title: title.into().trim().to_string(),
            script: script.into(),
            narrator: default_narrator(),
            captions_required: default_captions(),
        }
    }

    pub fn with_narrator(mut self, narrator: impl Into<String>) -> Self {
        self.narrator = narrator.into();
        self
    }

    pub fn with_captions(mut self, captions_required: bool) -> Self {
        self.captions_required = captions_required;
        self
    }

    pub fn word_count(&self) -> usize {
        count_words(&self.script)
    }
}

/// Response body for `POST /clip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClipResponse {
    pub clip_id: ClipId,
}

/// Count whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn default_narrator() -> String {
    DEFAULT_NARRATOR.to_string()
}

fn default_captions() -> bool {
    true
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let chars = title.trim().chars().count();
    if chars < MIN_TITLE_CHARS {
        return Err(invalid(
            "title_too_short",
            format!("Title must be at least {} characters", MIN_TITLE_CHARS),
        ));
    }
    if chars > MAX_TITLE_CHARS {
        return Err(invalid(
            "title_too_long",
            format!("Title must not exceed {} characters", MAX_TITLE_CHARS),
        ));
    }
    Ok(())
}

fn validate_script(script: &str) -> Result<(), ValidationError> {
    let words = count_words(script);
    if !(MIN_SCRIPT_WORDS..=MAX_SCRIPT_WORDS).contains(&words) {
        return Err(invalid(
            "script_word_count",
            format!(
                "Script must be between {} and {} words (got {})",
                MIN_SCRIPT_WORDS, MAX_SCRIPT_WORDS, words
            ),
        ));
    }
    Ok(())
}

fn validate_narrator(narrator: &str) -> Result<(), ValidationError> {
    if find_voice(narrator).is_none() {
        return Err(invalid("unknown_narrator", format!("Unknown narrator voice '{}'", narrator)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_valid_request() {
        let req = CreateClipRequest::new("Ocean facts", words(120)).with_narrator("nova");
        assert!(req.validate().is_ok());
        assert_eq!(req.word_count(), 120);
    }

    #[test]
    fn test_title_bounds() {
        let short = CreateClipRequest::new("ab", words(150));
        let errors = short.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let long = CreateClipRequest::new("x".repeat(31), words(150));
        assert!(long.validate().is_err());

        let edge = CreateClipRequest::new("x".repeat(30), words(150));
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_script_word_bounds() {
        assert!(CreateClipRequest::new("Title", words(99)).validate().is_err());
        assert!(CreateClipRequest::new("Title", words(100)).validate().is_ok());
        assert!(CreateClipRequest::new("Title", words(500)).validate().is_ok());
        assert!(CreateClipRequest::new("Title", words(501)).validate().is_err());
    }

    #[test]
    fn test_unknown_narrator_rejected() {
        let req = CreateClipRequest::new("Title", words(150)).with_narrator("robot");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("narrator"));
    }

    #[test]
    fn test_wire_format() {
        let req = CreateClipRequest::new("Title", "a b c");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["captionsRequired"], true);
        assert_eq!(json["narrator"], "alloy");

        let resp: CreateClipResponse = serde_json::from_str(r#"{"clipId": "c-9"}"#).unwrap();
        assert_eq!(resp.clip_id.as_str(), "c-9");
    }
}
