/// Skill vocabulary and join-table maintenance
///
/// Skills are a shared vocabulary: users advertise them and posts require
/// them. Association rows live in `users_skills` and `posts_skills`; skill
/// matching intersects the two through `skill_id`.
///
/// Replacement helpers take a transaction, not a pool, so callers can commit
/// a skill change together with the profile or post write it belongs to.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Inserts a skill by name if absent and returns its id
///
/// The no-op `DO UPDATE` makes the statement return a row in both the insert
/// and the already-exists case.
async fn ensure_skill(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<Uuid, sqlx::Error> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO skills (name)
        VALUES ($1)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

/// Replaces a user's skill associations with the given names
///
/// Unknown skills are created on the fly. Must run inside the caller's
/// transaction so the replacement commits atomically with the rest of the
/// update.
pub async fn replace_for_user(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM users_skills WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    for name in names {
        let skill_id = ensure_skill(tx, name).await?;

        sqlx::query(
            "INSERT INTO users_skills (user_id, skill_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(skill_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Replaces a post's required-skill associations with the given names
pub async fn replace_for_post(
    tx: &mut Transaction<'_, Postgres>,
    post_id: Uuid,
    names: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM posts_skills WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut **tx)
        .await?;

    for name in names {
        let skill_id = ensure_skill(tx, name).await?;

        sqlx::query(
            "INSERT INTO posts_skills (post_id, skill_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(skill_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Lists a user's skill names, alphabetically
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT s.name
        FROM skills s
        JOIN users_skills us ON us.skill_id = s.id
        WHERE us.user_id = $1
        ORDER BY s.name
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(names)
}
