/// Post model and database operations
///
/// A post is a project listing owned by an organizer, with a set of required
/// skills. Reads aggregate the required-skill names into the row so list
/// endpoints return complete posts in one statement.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE posts (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::skill;
use super::user::User;

/// Post model with its aggregated required-skill names
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    /// Unique post ID (UUID v4)
    pub id: Uuid,

    /// Owner's user ID
    pub owner_id: Uuid,

    /// Post title
    pub title: String,

    /// Post description
    pub description: String,

    /// Required skill names
    pub skills: Vec<String>,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new post
#[derive(Debug, Clone)]
pub struct CreatePost {
    /// Owner's user ID
    pub owner_id: Uuid,

    /// Post title
    pub title: String,

    /// Post description
    pub description: String,

    /// Required skill names
    pub skills: Vec<String>,
}

/// Input for updating an existing post
///
/// All fields are optional. Only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    /// New title
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,
}

/// SELECT list that aggregates the required-skill names into the row
const POST_SELECT: &str = r#"
    SELECT p.id, p.owner_id, p.title, p.description,
           COALESCE(array_agg(s.name ORDER BY s.name) FILTER (WHERE s.name IS NOT NULL), '{}') AS skills,
           p.created_at, p.updated_at
    FROM posts p
    LEFT JOIN posts_skills ps ON ps.post_id = p.id
    LEFT JOIN skills s ON s.id = ps.skill_id
"#;

impl Post {
    /// Creates a new post together with its required skills
    ///
    /// Both writes run in one transaction.
    pub async fn create(pool: &PgPool, data: CreatePost) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let post_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO posts (owner_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(data.owner_id)
        .bind(&data.title)
        .bind(&data.description)
        .fetch_one(&mut *tx)
        .await?;

        if !data.skills.is_empty() {
            skill::replace_for_post(&mut tx, post_id, &data.skills).await?;
        }

        tx.commit().await?;

        // Committed above; the read is outside the transaction on purpose.
        Self::find_by_id(pool, post_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Finds a post by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "{POST_SELECT} WHERE p.id = $1 GROUP BY p.id"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(post)
    }

    /// Lists all posts, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "{POST_SELECT} GROUP BY p.id ORDER BY p.created_at DESC"
        ))
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }

    /// Updates a post's fields and, optionally, its required skills
    ///
    /// Runs in one transaction. Ownership is checked by the caller.
    ///
    /// # Returns
    ///
    /// The updated post if found, None if the post doesn't exist.
    pub async fn update_with_skills(
        pool: &PgPool,
        id: Uuid,
        data: UpdatePost,
        skills: Option<&[String]>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query = String::from("UPDATE posts SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }

        query.push_str(" WHERE id = $1 RETURNING id");

        let mut q = sqlx::query_scalar::<_, Uuid>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }

        if q.fetch_optional(&mut *tx).await?.is_none() {
            return Ok(None);
        }

        if let Some(names) = skills {
            skill::replace_for_post(&mut tx, id, names).await?;
        }

        tx.commit().await?;

        Self::find_by_id(pool, id).await
    }

    /// Deletes a post by ID
    ///
    /// # Returns
    ///
    /// True if the post was deleted, false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists posts whose required skills intersect the user's skills
    ///
    /// A post matches when at least one of its required skills is also one of
    /// the user's skills. Posts with no required skills never match.
    pub async fn matching_user_skills(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            {POST_SELECT}
            WHERE EXISTS (
                SELECT 1
                FROM posts_skills ps2
                JOIN users_skills us ON us.skill_id = ps2.skill_id
                WHERE ps2.post_id = p.id AND us.user_id = $1
            )
            GROUP BY p.id
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }

    /// Lists posts the user has been accepted into
    pub async fn joined_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"
            {POST_SELECT}
            WHERE EXISTS (
                SELECT 1 FROM post_invitations pi
                WHERE pi.post_id = p.id AND pi.user_id = $1 AND pi.status = 'accepted'
            )
            GROUP BY p.id
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(posts)
    }

    /// Lists users whose skills intersect this post's required skills
    ///
    /// The owner is excluded from recommendations.
    pub async fn recommended_users(
        pool: &PgPool,
        post_id: Uuid,
    ) -> Result<Vec<User>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT DISTINCT u.id, u.username, u.email, u.password_hash, u.bio, u.role,
                   u.created_at, u.updated_at
            FROM users u
            JOIN users_skills us ON us.user_id = u.id
            JOIN posts_skills ps ON ps.skill_id = us.skill_id
            WHERE ps.post_id = $1
              AND u.id <> (SELECT owner_id FROM posts WHERE id = $1)
            "#,
        )
        .bind(post_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_post_default() {
        let update = UpdatePost::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
    }

    #[test]
    fn test_post_select_aggregates_skills() {
        assert!(POST_SELECT.contains("array_agg"));
        assert!(POST_SELECT.contains("posts_skills"));
    }
}
