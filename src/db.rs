use std::str::FromStr;

use sqlx::{
    prelude::FromRow,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{AppError, AppResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    send_messages INTEGER NOT NULL DEFAULT 1,
    is_activated INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS rubrics (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    sort_order INTEGER NOT NULL DEFAULT 0,
    super_id INTEGER REFERENCES rubrics(id) ON DELETE CASCADE
);
CREATE TABLE IF NOT EXISTS bbs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rubric_id INTEGER NOT NULL REFERENCES rubrics(id) ON DELETE CASCADE,
    author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    price REAL NOT NULL DEFAULT 0,
    contacts TEXT NOT NULL DEFAULT '',
    is_active INTEGER NOT NULL DEFAULT 1,
    views INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS likes (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    bb_id INTEGER NOT NULL REFERENCES bbs(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, bb_id)
);
CREATE TABLE IF NOT EXISTS recent_bbs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    bb_id INTEGER NOT NULL REFERENCES bbs(id) ON DELETE CASCADE,
    attended_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bb_id INTEGER NOT NULL REFERENCES bbs(id) ON DELETE CASCADE,
    author_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
    author_name TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS page_hits (
    url TEXT PRIMARY KEY,
    count INTEGER NOT NULL DEFAULT 0
);
";

pub async fn connect(url: &str) -> AppResult<SqlitePool> {
    // foreign_keys must be on, the cascades below rely on it
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    Ok(SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?)
}

pub async fn init_schema(pool: &SqlitePool) -> AppResult<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub send_messages: bool,
    pub is_activated: bool,
}

/// A category tree node. `super_id` is `None` for super-rubrics and
/// always set for sub-rubrics; the tree is one level deep.
#[derive(Debug, Clone, FromRow)]
pub struct Rubric {
    pub id: i64,
    pub name: String,
    pub sort_order: i64,
    pub super_id: Option<i64>,
}

/// A single classified ad ("bb" after the original bulletin board).
#[derive(Debug, Clone, FromRow)]
pub struct Bb {
    pub id: i64,
    pub rubric_id: i64,
    pub author_id: i64,
    pub title: String,
    pub content: String,
    pub price: f64,
    pub contacts: String,
    pub is_active: bool,
    pub views: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub bb_id: i64,
    pub author_id: Option<i64>,
    pub author_name: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: i64,
}

pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

pub async fn get_bb(pool: &SqlitePool, id: i64) -> AppResult<Bb> {
    sqlx::query_as::<_, Bb>("SELECT * FROM bbs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> AppResult<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn user_by_name(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?)
}

#[cfg(test)]
mod tests {
    use crate::testing;

    #[tokio::test]
    async fn deleting_a_user_cascades_to_their_bbs() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let user = testing::user(&pool, "alex").await;
        testing::bb(&pool, rubric, user, "car", 1).await;
        testing::bb(&pool, rubric, user, "truck", 2).await;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user)
            .execute(&pool)
            .await
            .unwrap();

        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bbs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn deleting_a_bb_cascades_to_comments_and_likes() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let user = testing::user(&pool, "alex").await;
        let bb = testing::bb(&pool, rubric, user, "car", 1).await;
        crate::comments::add_user(&pool, bb, user, "nice").await.unwrap();
        crate::likes::toggle(&pool, user, bb).await.unwrap();

        sqlx::query("DELETE FROM bbs WHERE id = ?")
            .bind(bb)
            .execute(&pool)
            .await
            .unwrap();

        let comments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&pool)
            .await
            .unwrap();
        let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((comments, likes), (0, 0));
    }
}
