//! Analysis lifecycle signal and the alert values derived from it.
//!
//! The lifecycle value is owned by an external store; this crate only reads
//! it. Spellings are normalised at the boundary, so `"analyzed error"`,
//! `"Analyzed-Error"` and `"analyzed_error"` are all [`LifecycleState::AnalyzedError`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    ResponseWaiting,
    Analyzing,
    Analyzed,
    AnalyzedError,
    /// Application-defined value this crate does not react to
    Other(String),
}

impl LifecycleState {
    pub fn as_str(&self) -> &str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::ResponseWaiting => "response_waiting",
            LifecycleState::Analyzing => "analyzing",
            LifecycleState::Analyzed => "analyzed",
            LifecycleState::AnalyzedError => "analyzed_error",
            LifecycleState::Other(raw) => raw,
        }
    }

    /// States that make the alert visible
    pub fn shows_alert(&self) -> bool {
        matches!(
            self,
            LifecycleState::ResponseWaiting | LifecycleState::Analyzing | LifecycleState::Analyzed
        )
    }

    /// Terminal states that arm the dismissal timer
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Analyzed | LifecycleState::AnalyzedError)
    }
}

impl FromStr for LifecycleState {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(LifecycleState::from(raw))
    }
}

impl From<&str> for LifecycleState {
    fn from(raw: &str) -> Self {
        let canonical: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                other => other.to_ascii_lowercase(),
            })
            .collect();

        match canonical.as_str() {
            "idle" => LifecycleState::Idle,
            "response_waiting" => LifecycleState::ResponseWaiting,
            "analyzing" => LifecycleState::Analyzing,
            "analyzed" => LifecycleState::Analyzed,
            "analyzed_error" => LifecycleState::AnalyzedError,
            _ => LifecycleState::Other(raw.to_string()),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LifecycleState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LifecycleState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(LifecycleState::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertVisibility {
    #[default]
    Hidden,
    Visible,
}

/// Icon shown inside the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertGlyph {
    Notification,
    Error,
}

impl AlertGlyph {
    pub fn for_state(state: &LifecycleState) -> Self {
        match state {
            LifecycleState::AnalyzedError => AlertGlyph::Error,
            _ => AlertGlyph::Notification,
        }
    }
}

/// What the presentation layer needs to render the alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub visibility: AlertVisibility,
    pub glyph: AlertGlyph,
    pub state: LifecycleState,
}

impl AlertView {
    pub fn new(visibility: AlertVisibility, state: LifecycleState) -> Self {
        Self {
            visibility,
            glyph: AlertGlyph::for_state(&state),
            state,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == AlertVisibility::Visible
    }
}

impl Default for AlertView {
    fn default() -> Self {
        Self::new(AlertVisibility::Hidden, LifecycleState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_spellings_normalise() {
        for raw in ["analyzed error", "analyzed_error", " Analyzed-Error "] {
            assert_eq!(LifecycleState::from(raw), LifecycleState::AnalyzedError, "{}", raw);
        }
    }

    #[test]
    fn test_unknown_value_is_kept_verbatim() {
        let state = LifecycleState::from("uploading");
        assert_eq!(state, LifecycleState::Other("uploading".to_string()));
        assert!(!state.shows_alert());
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_serde_uses_canonical_spelling() {
        let json = serde_json::to_string(&LifecycleState::AnalyzedError).unwrap();
        assert_eq!(json, "\"analyzed_error\"");

        let parsed: LifecycleState = serde_json::from_str("\"analyzed error\"").unwrap();
        assert_eq!(parsed, LifecycleState::AnalyzedError);
    }

    #[test]
    fn test_glyph_follows_state() {
        assert_eq!(AlertGlyph::for_state(&LifecycleState::AnalyzedError), AlertGlyph::Error);
        assert_eq!(AlertGlyph::for_state(&LifecycleState::Analyzed), AlertGlyph::Notification);
        assert_eq!(AlertGlyph::for_state(&LifecycleState::Idle), AlertGlyph::Notification);
    }
}
