//! Comments under a listing. A comment belongs to either a registered
//! author or a guest who solved the session captcha; `is_active` is the
//! moderation switch.

use rand::Rng;
use sqlx::SqlitePool;

use crate::{db, db::Comment, include_res, res, AppResult};

pub async fn active_for(pool: &SqlitePool, bb_id: i64) -> AppResult<Vec<Comment>> {
    Ok(sqlx::query_as::<_, Comment>(
        "SELECT * FROM comments WHERE bb_id = ? AND is_active = 1 ORDER BY created_at, id",
    )
    .bind(bb_id)
    .fetch_all(pool)
    .await?)
}

pub async fn add_user(
    pool: &SqlitePool,
    bb_id: i64,
    author_id: i64,
    content: &str,
) -> AppResult<()> {
    let author = db::get_user(pool, author_id).await?;
    sqlx::query(
        "INSERT INTO comments (bb_id, author_id, author_name, content, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(bb_id)
    .bind(author_id)
    .bind(&author.username)
    .bind(content)
    .bind(db::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn add_guest(
    pool: &SqlitePool,
    bb_id: i64,
    author_name: &str,
    content: &str,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO comments (bb_id, author_name, content, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(bb_id)
    .bind(author_name)
    .bind(content)
    .bind(db::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Challenge shown to guests instead of a third-party captcha service.
/// The expected answer lives in the session until the form comes back.
pub fn captcha_challenge() -> (String, String) {
    let mut rng = rand::rng();
    let a: i64 = rng.random_range(1..=9);
    let b: i64 = rng.random_range(1..=9);
    (format!("{a} + {b} = ?"), (a + b).to_string())
}

pub fn render(comments: &[Comment]) -> String {
    let mut out = String::new();
    for comment in comments {
        out += &include_res!(str, "/pages/comment.html")
            .replace("{author}", &res::escape(&comment.author_name))
            .replace("{content}", &res::escape(&comment.content));
    }
    out
}
