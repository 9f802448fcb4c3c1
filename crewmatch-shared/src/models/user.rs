/// User model and database operations
///
/// Users have a unique username, an Argon2id password hash, a role, and a set
/// of skills held in the `users_skills` join table.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('VOLUNTEER', 'ORGANIZER', 'ADMIN');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     bio TEXT,
///     role user_role NOT NULL DEFAULT 'VOLUNTEER',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::skill;

/// Platform roles
///
/// Organizers create and manage posts, volunteers apply and receive
/// invitations, admins can list all users. Self-service updates may only set
/// `Volunteer` or `Organizer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Applies to posts and receives invitations
    Volunteer,

    /// Creates posts and decides on applicants
    Organizer,

    /// Can list all users
    Admin,
}

impl Role {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Volunteer => "VOLUNTEER",
            Role::Organizer => "ORGANIZER",
            Role::Admin => "ADMIN",
        }
    }

    /// Whether this role may be chosen on registration or self-update
    ///
    /// Admin is never assignable through the public surface.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::Volunteer | Role::Organizer)
    }

    /// Whether this role may create and manage posts
    pub fn can_create_posts(&self) -> bool {
        matches!(self, Role::Organizer | Role::Admin)
    }
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Username, unique across all users
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash, never plaintext
    pub password_hash: String,

    /// Optional profile text
    pub bio: Option<String>,

    /// Platform role
    pub role: Role,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Username (must be unique)
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Optional profile text
    pub bio: Option<String>,

    /// Platform role
    pub role: Role,

    /// Skill names to associate with the account
    pub skills: Vec<String>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New username
    pub username: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New profile text
    pub bio: Option<String>,

    /// New role
    pub role: Option<Role>,

    /// New password hash
    pub password_hash: Option<String>,
}

impl UpdateUser {
    /// Whether any field would be written
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.bio.is_none()
            && self.role.is_none()
            && self.password_hash.is_none()
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, bio, role, created_at, updated_at";

impl User {
    /// Creates a new user together with its skill associations
    ///
    /// Runs in one transaction: the account row and the `users_skills` rows
    /// commit together or not at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is already taken (unique constraint
    /// violation) or the database connection fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, bio, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.bio)
        .bind(data.role)
        .fetch_one(&mut *tx)
        .await?;

        if !data.skills.is_empty() {
            skill::replace_for_user(&mut tx, user.id, &data.skills).await?;
        }

        tx.commit().await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a username is taken by someone other than `exclude_id`
    ///
    /// Used before a self-update so a user keeping their current username is
    /// not reported as a conflict.
    pub async fn username_taken(
        pool: &PgPool,
        username: &str,
        exclude_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 AND id <> $2)",
        )
        .bind(username)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;

        Ok(taken)
    }

    /// Updates a user's profile fields and, optionally, its skill set
    ///
    /// Only non-None fields in `data` are written; a `Some` skill list
    /// replaces the user's `users_skills` associations. Both writes run in a
    /// single transaction so a partial failure leaves nothing behind.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if the user doesn't exist.
    pub async fn update_with_skills(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
        skills: Option<&[String]>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Build the update dynamically from the fields that are present.
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.bio.is_some() {
            bind_count += 1;
            query.push_str(&format!(", bio = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(bio) = data.bio {
            q = q.bind(bio);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }

        let user = match q.fetch_optional(&mut *tx).await? {
            Some(user) => user,
            None => return Ok(None),
        };

        if let Some(names) = skills {
            skill::replace_for_user(&mut tx, id, names).await?;
        }

        tx.commit().await?;

        Ok(Some(user))
    }

    /// Deletes a user by ID
    ///
    /// Skill associations and invitations cascade at the schema level.
    ///
    /// # Returns
    ///
    /// True if the user was deleted, false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_self_assignable() {
        assert!(Role::Volunteer.is_self_assignable());
        assert!(Role::Organizer.is_self_assignable());
        assert!(!Role::Admin.is_self_assignable());
    }

    #[test]
    fn test_role_can_create_posts() {
        assert!(!Role::Volunteer.can_create_posts());
        assert!(Role::Organizer.can_create_posts());
        assert!(Role::Admin.can_create_posts());
    }

    #[test]
    fn test_role_serde_uppercase() {
        let json = serde_json::to_string(&Role::Organizer).unwrap();
        assert_eq!(json, "\"ORGANIZER\"");

        let role: Role = serde_json::from_str("\"VOLUNTEER\"").unwrap();
        assert_eq!(role, Role::Volunteer);
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());

        let update = UpdateUser {
            email: Some("new@example.com".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
