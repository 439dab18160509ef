use crate::api::UserProfile;
use crate::constants::DEFAULT_DISPLAY_NAME;

/// An authenticated identity plus the bearer credential held by the client
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: u64,
    pub display_name: String,
    pub token: String,
    pub profile: UserProfile,
}

impl Session {
    /// Build a session from a token and the profile it was issued for
    pub fn new(token: impl Into<String>, profile: UserProfile) -> Self {
        let display_name = profile
            .full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DISPLAY_NAME)
            .to_string();

        Self {
            user_id: profile.id,
            display_name,
            token: token.into(),
            profile,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Route guard: may the chat screen be shown?
pub fn has_valid_session(session: Option<&Session>) -> bool {
    session.is_some_and(Session::is_authenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(full_name: Option<&str>) -> UserProfile {
        UserProfile {
            id: 1,
            email: "mary@example.com".to_string(),
            full_name: full_name.map(str::to_string),
            date_of_birth: None,
            phone_number: None,
            emergency_contact: None,
            is_elder: true,
            caregiver_id: None,
            created_at: None,
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Session::new("t", profile(Some("Mary Johnson"))).display_name, "Mary Johnson");
        assert_eq!(Session::new("t", profile(None)).display_name, "Friend");
        assert_eq!(Session::new("t", profile(Some("  "))).display_name, "Friend");
    }

    #[test]
    fn test_route_guard() {
        let session = Session::new("jwt-abc", profile(None));
        assert!(has_valid_session(Some(&session)));
        assert!(!has_valid_session(None));
        assert!(!has_valid_session(Some(&Session::new("", profile(None)))));
    }
}
