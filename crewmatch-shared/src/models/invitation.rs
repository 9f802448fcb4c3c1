/// Invitation/application model and database operations
///
/// A row in `post_invitations` relates a post and a user, whether the user
/// applied or the organizer invited them. Status moves from `pending` to
/// `accepted` or `rejected`; rows are never hard-deleted.
///
/// Status transitions are single conditional UPDATEs so a near-simultaneous
/// pair of decisions cannot both succeed: the affected-row count decides the
/// outcome, and the follow-up read on the zero-row path only picks the right
/// status code.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE invitation_status AS ENUM ('pending', 'accepted', 'rejected');
///
/// CREATE TABLE post_invitations (
///     post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     status invitation_status NOT NULL DEFAULT 'pending',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (post_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;

/// Status of an invitation or application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Awaiting a decision
    Pending,

    /// Accepted by the deciding party
    Accepted,

    /// Rejected by the deciding party
    Rejected,
}

impl InvitationStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
        }
    }
}

/// Outcome of a conditional status write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The row was updated to the target status
    Updated,

    /// The row already had the target status; nothing was written
    AlreadySet,

    /// No invitation exists for this (post, user) pair
    NotFound,
}

/// Invitation model relating a post and a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    /// Post ID
    pub post_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Current status
    pub status: InvitationStatus,

    /// When the relation was created
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}

/// Invitation joined with its post's title, for listing a user's inbox
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvitationSummary {
    /// Post ID
    pub post_id: Uuid,

    /// Post title
    pub post_title: String,

    /// Current status
    pub status: InvitationStatus,

    /// When the relation was created
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Creates the relation for an application or an organizer invitation
    ///
    /// A single insert-if-absent: if a relation already exists for the
    /// (post, user) pair, nothing is written and None is returned.
    pub async fn create(
        pool: &PgPool,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO post_invitations (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            RETURNING post_id, user_id, status, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(invitation)
    }

    /// Finds the invitation for a (post, user) pair
    pub async fn find(
        pool: &PgPool,
        post_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT post_id, user_id, status, created_at, updated_at
            FROM post_invitations
            WHERE post_id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(invitation)
    }

    /// Moves an invitation to the given status with a single conditional write
    ///
    /// The UPDATE only fires when the row exists and is not already in the
    /// target status, which removes the check-then-act race between two
    /// near-simultaneous decisions.
    pub async fn set_status(
        pool: &PgPool,
        post_id: Uuid,
        user_id: Uuid,
        status: InvitationStatus,
    ) -> Result<StatusChange, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE post_invitations
            SET status = $3, updated_at = NOW()
            WHERE post_id = $1 AND user_id = $2 AND status <> $3
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(status)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(StatusChange::Updated);
        }

        // Zero rows: either the row is already in the target status or it
        // doesn't exist. This read only picks the status code.
        match Self::find(pool, post_id, user_id).await? {
            Some(_) => Ok(StatusChange::AlreadySet),
            None => Ok(StatusChange::NotFound),
        }
    }

    /// Lists the invitations addressed to a user, newest first
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<InvitationSummary>, sqlx::Error> {
        let invitations = sqlx::query_as::<_, InvitationSummary>(
            r#"
            SELECT pi.post_id, p.title AS post_title, pi.status, pi.created_at
            FROM post_invitations pi
            JOIN posts p ON p.id = pi.post_id
            WHERE pi.user_id = $1
            ORDER BY pi.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(invitations)
    }

    /// Lists the users related to a post with the given status
    ///
    /// `Pending` yields the applicants awaiting a decision, `Accepted` the
    /// users working on the post.
    pub async fn users_with_status(
        pool: &PgPool,
        post_id: Uuid,
        status: InvitationStatus,
    ) -> Result<Vec<User>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.bio, u.role,
                   u.created_at, u.updated_at
            FROM users u
            JOIN post_invitations pi ON pi.user_id = u.id
            WHERE pi.post_id = $1 AND pi.status = $2
            ORDER BY pi.created_at
            "#,
        )
        .bind(post_id)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(InvitationStatus::Pending.as_str(), "pending");
        assert_eq!(InvitationStatus::Accepted.as_str(), "accepted");
        assert_eq!(InvitationStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&InvitationStatus::Accepted).unwrap();
        assert_eq!(json, "\"accepted\"");

        let status: InvitationStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(status, InvitationStatus::Rejected);
    }

    #[test]
    fn test_status_change_equality() {
        assert_eq!(StatusChange::Updated, StatusChange::Updated);
        assert_ne!(StatusChange::Updated, StatusChange::AlreadySet);
    }
}
