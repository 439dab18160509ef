//! Local stand-in for the remote reply, used whenever the chat service fails

pub const MEDICATIONS_REPLY: &str = "It's time for your morning pills! You have Lisinopril 10mg and Metformin 500mg. Have you taken them today?";
pub const APPOINTMENTS_REPLY: &str = "You have an appointment with Dr. Johnson tomorrow at 2:00 PM for your cardiology check-up. Would you like me to book a ride?";
pub const EMERGENCY_REPLY: &str = "I'm here to help! If this is a medical emergency, please call 911. Otherwise, I can contact your caregiver Sarah. What would you like me to do?";
pub const MOOD_REPLY: &str = "I'm glad you want to share how you're feeling. On a scale of 1 to 10, how would you rate your mood today? Remember, it's okay to have ups and downs.";
pub const DEFAULT_REPLY: &str = "I understand. Is there anything specific I can help you with today? I can remind you about medications, appointments, or just chat with you.";

/// Keyword rules, checked in order. The first rule with a matching keyword wins.
const RULES: &[(&[&str], &str)] = &[
    (&["pill", "medication"], MEDICATIONS_REPLY),
    (&["appointment", "doctor"], APPOINTMENTS_REPLY),
    (&["help", "emergency"], EMERGENCY_REPLY),
    (&["feel", "mood"], MOOD_REPLY),
];

/// Pick a canned reply for the user's text by substring keyword match
pub fn fallback_reply(user_text: &str) -> &'static str {
    let lower = user_text.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}
