use serde::{Deserialize, Serialize};
use std::fmt;

/// The ordered stages a document side goes through.
///
/// `idle → detecting → adjusting → highlighting → extracting → validating
/// → complete`, with one branch: after `validating` completes for the first
/// side of a dual-sided document the machine enters `waiting_for_back`,
/// which accepts the back-side image and re-enters `detecting`.
///
/// Exactly one page is current at any time; the stage is session-wide, not
/// per-page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Detecting,
    Adjusting,
    Highlighting,
    Extracting,
    Validating,
    WaitingForBack,
    Complete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Detecting => "detecting",
            Self::Adjusting => "adjusting",
            Self::Highlighting => "highlighting",
            Self::Extracting => "extracting",
            Self::Validating => "validating",
            Self::WaitingForBack => "waiting_for_back",
            Self::Complete => "complete",
        }
    }

    /// Stages that accept a new source image.
    pub fn accepts_source(&self) -> bool {
        matches!(self, Self::Idle | Self::WaitingForBack)
    }

    /// Corner handles are editable only while adjusting; everything is
    /// locked once an extraction call may be in flight.
    pub fn allows_corner_editing(&self) -> bool {
        matches!(self, Self::Adjusting)
    }

    /// Back navigation re-enables handle editing without re-detection.
    pub fn allows_back_to_adjust(&self) -> bool {
        matches!(self, Self::Highlighting | Self::Complete)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_and_waiting_accept_a_source() {
        assert!(Stage::Idle.accepts_source());
        assert!(Stage::WaitingForBack.accepts_source());
        for stage in [
            Stage::Detecting,
            Stage::Adjusting,
            Stage::Highlighting,
            Stage::Extracting,
            Stage::Validating,
            Stage::Complete,
        ] {
            assert!(!stage.accepts_source(), "{stage} should reject sources");
        }
    }

    #[test]
    fn editing_is_locked_outside_adjusting() {
        assert!(Stage::Adjusting.allows_corner_editing());
        assert!(!Stage::Extracting.allows_corner_editing());
        assert!(!Stage::Validating.allows_corner_editing());
        assert!(!Stage::Highlighting.allows_corner_editing());
    }
}
