use serde::{Deserialize, Serialize};

/// Predefined shortcut phrases, sent through the normal message pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickAction {
    Medications,
    Appointments,
    Emergency,
    Mood,
}

impl QuickAction {
    /// All actions, in panel order
    pub const ALL: [QuickAction; 4] = [
        QuickAction::Medications,
        QuickAction::Appointments,
        QuickAction::Emergency,
        QuickAction::Mood,
    ];

    /// The text sent on the user's behalf
    pub fn phrase(&self) -> &'static str {
        match self {
            QuickAction::Medications => "Show me my medications",
            QuickAction::Appointments => "What are my upcoming appointments?",
            QuickAction::Emergency => "I need help",
            QuickAction::Mood => "I want to talk about how I feel",
        }
    }

    /// Button label
    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::Medications => "Medications",
            QuickAction::Appointments => "Appointments",
            QuickAction::Emergency => "Call Help",
            QuickAction::Mood => "How I Feel",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "medications" | "medication" | "meds" => Some(QuickAction::Medications),
            "appointments" | "appointment" => Some(QuickAction::Appointments),
            "emergency" | "help" => Some(QuickAction::Emergency),
            "mood" | "feel" => Some(QuickAction::Mood),
            _ => None,
        }
    }
}
