/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `users`: Account management, invitations, and recommendations
/// - `posts`: Post lifecycle, applications, and organizer decisions

pub mod auth;
pub mod health;
pub mod posts;
pub mod users;

use crewmatch_shared::models::user::User;
use serde::Serialize;
use uuid::Uuid;

/// Simple message response used by mutation endpoints
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// User representation returned to clients
///
/// Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Profile text
    pub bio: Option<String>,

    /// Platform role
    pub role: crewmatch_shared::models::user::Role,

    /// Skill names, when loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,

    /// When the account was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl UserResponse {
    /// Builds a response from a user row, without skills
    pub fn from_user(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            role: user.role,
            skills: None,
            created_at: user.created_at,
        }
    }

    /// Builds a response from a user row with its skill names
    pub fn with_skills(user: User, skills: Vec<String>) -> Self {
        Self {
            skills: Some(skills),
            ..Self::from_user(user)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crewmatch_shared::models::user::Role;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            bio: None,
            role: Role::Volunteer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        let response = UserResponse::from_user(sample_user());
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"username\":\"ada\""));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_user_response_skills_omitted_when_absent() {
        let response = UserResponse::from_user(sample_user());
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("skills"));

        let response = UserResponse::with_skills(sample_user(), vec!["rust".to_string()]);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"skills\":[\"rust\"]"));
    }
}
