//! Reading settings and validation.
//!
//! [`ReadingSettings`] is captured by value when a session starts, so later
//! changes made by the caller never reach an in-flight session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slowest accepted reading speed multiplier.
pub const MIN_SPEED: f32 = 0.5;

/// Fastest accepted reading speed multiplier.
pub const MAX_SPEED: f32 = 2.0;

/// Below this speed, backends that only offer a normal and a slow voice
/// should pick the slow one.
pub const SLOW_SPEED_THRESHOLD: f32 = 0.8;

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "pt";

/// Languages offered by the reader UI, as `(code, display name)` pairs.
///
/// Backends may accept other codes; this list is what the language picker shows.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("pt", "Portuguese"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
];

/// Voice settings for one reading session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingSettings {
    /// Language code passed to the synthesis backend (e.g. `"pt"`, `"en"`).
    pub language: String,

    /// Speed multiplier (0.5–2.0, default 1.0).
    pub speed: f32,
}

impl Default for ReadingSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            speed: 1.0,
        }
    }
}

impl ReadingSettings {
    pub fn new(language: impl Into<String>, speed: f32) -> Self {
        Self {
            language: language.into(),
            speed,
        }
    }

    /// Whether a two-speed backend should use its slow voice.
    #[must_use]
    pub fn is_slow(&self) -> bool {
        self.speed < SLOW_SPEED_THRESHOLD
    }

    /// Check that the settings can be handed to a backend.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.language.trim().is_empty() {
            return Err(SettingsError::EmptyLanguage);
        }
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(SettingsError::InvalidSpeed(self.speed));
        }
        Ok(())
    }
}

/// Returns `true` if `code` is one of [`SUPPORTED_LANGUAGES`].
pub fn is_supported_language(code: &str) -> bool {
    SUPPORTED_LANGUAGES.iter().any(|(c, _)| *c == code)
}

/// Errors from settings validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("Reading speed must be between 0.5 and 2.0, got {0}")]
    InvalidSpeed(f32),

    #[error("Language code cannot be empty")]
    EmptyLanguage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = ReadingSettings::default();
        assert_eq!(settings.language, "pt");
        assert!((settings.speed - 1.0).abs() < f32::EPSILON);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_speed_bounds_are_inclusive() {
        assert!(ReadingSettings::new("en", MIN_SPEED).validate().is_ok());
        assert!(ReadingSettings::new("en", MAX_SPEED).validate().is_ok());
    }

    #[test]
    fn test_speed_out_of_range() {
        assert_eq!(
            ReadingSettings::new("en", 0.25).validate(),
            Err(SettingsError::InvalidSpeed(0.25))
        );
        assert_eq!(
            ReadingSettings::new("en", 3.0).validate(),
            Err(SettingsError::InvalidSpeed(3.0))
        );
        assert!(ReadingSettings::new("en", f32::NAN).validate().is_err());
    }

    #[test]
    fn test_empty_language() {
        assert_eq!(
            ReadingSettings::new("  ", 1.0).validate(),
            Err(SettingsError::EmptyLanguage)
        );
    }

    #[test]
    fn test_slow_threshold() {
        assert!(ReadingSettings::new("pt", 0.5).is_slow());
        assert!(ReadingSettings::new("pt", 0.79).is_slow());
        assert!(!ReadingSettings::new("pt", 0.8).is_slow());
        assert!(!ReadingSettings::new("pt", 1.5).is_slow());
    }

    #[test]
    fn test_supported_languages() {
        assert!(is_supported_language("pt"));
        assert!(is_supported_language("it"));
        assert!(!is_supported_language("ja"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: ReadingSettings = serde_json::from_str(r#"{"speed": 1.5}"#).unwrap();
        assert_eq!(settings.language, "pt");
        assert!((settings.speed - 1.5).abs() < f32::EPSILON);
    }
}
