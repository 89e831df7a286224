use sqlx::SqlitePool;
use uuid::Uuid;

/// Make sure a user called `name` exists and return its id.
pub async fn seed_user(pool: &SqlitePool, name: &str) -> Result<String, sqlx::Error> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    if let Some((id,)) = existing {
        tracing::debug!("User '{}' already exists, skipping seed", name);
        return Ok(id);
    }

    let user_id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO users (id, name, created_at) VALUES (?, ?, ?)")
        .bind(&user_id)
        .bind(name)
        .bind(&now)
        .execute(pool)
        .await?;

    tracing::info!("User '{}' created", name);
    Ok(user_id)
}
