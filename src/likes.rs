//! Like toggling. Membership in the `likes` table is the single source
//! of truth; the count shown anywhere is derived from it on demand.

use axum::{debug_handler, extract::State, Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session, AppResult};

pub const LIKED_MARKUP: &str =
    "<i class=\"fas fa-heart\" style=\"color:#009cf0;\"></i>\nIn favorites";
pub const UNLIKED_MARKUP: &str =
    "<i class=\"far fa-heart\" style=\"color:#009cf0;\"></i>\nAdd to favorites";

/// Flip `user_id`'s membership in the listing's like set. Runs in a
/// transaction so two interleaved toggles cannot lose an update.
/// Returns the new membership state and the derived count.
pub async fn toggle(pool: &SqlitePool, user_id: i64, bb_id: i64) -> AppResult<(bool, i64)> {
    let mut tx = pool.begin().await?;

    let liked: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM likes WHERE user_id = ? AND bb_id = ?")
            .bind(user_id)
            .bind(bb_id)
            .fetch_optional(&mut *tx)
            .await?;

    let now_liked = if liked.is_some() {
        sqlx::query("DELETE FROM likes WHERE user_id = ? AND bb_id = ?")
            .bind(user_id)
            .bind(bb_id)
            .execute(&mut *tx)
            .await?;
        false
    } else {
        sqlx::query("INSERT INTO likes (user_id, bb_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(bb_id)
            .execute(&mut *tx)
            .await?;
        true
    };

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE bb_id = ?")
        .bind(bb_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((now_liked, count))
}

pub async fn is_liked(pool: &SqlitePool, user_id: i64, bb_id: i64) -> AppResult<bool> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM likes WHERE user_id = ? AND bb_id = ?")
            .bind(user_id)
            .bind(bb_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

pub async fn count(pool: &SqlitePool, bb_id: i64) -> AppResult<i64> {
    Ok(sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE bb_id = ?")
        .bind(bb_id)
        .fetch_one(pool)
        .await?)
}

#[derive(Deserialize)]
pub struct LikeForm {
    pub bb_id: i64,
}

#[debug_handler]
pub async fn like_bb(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(LikeForm { bb_id }): Form<LikeForm>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session, "/").await?;
    db::get_bb(&db_pool, bb_id).await?;

    let (now_liked, _) = toggle(&db_pool, user_id, bb_id).await?;
    let result = if now_liked { LIKED_MARKUP } else { UNLIKED_MARKUP };
    Ok(Json(json!({ "result": result })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn double_toggle_restores_original_state() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let user = testing::user(&pool, "alex").await;
        let bb = testing::bb(&pool, rubric, user, "car", 1).await;

        assert_eq!(toggle(&pool, user, bb).await.unwrap(), (true, 1));
        assert_eq!(toggle(&pool, user, bb).await.unwrap(), (false, 0));
        assert!(!is_liked(&pool, user, bb).await.unwrap());
    }

    #[tokio::test]
    async fn count_tracks_set_size() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let alex = testing::user(&pool, "alex").await;
        let kim = testing::user(&pool, "kim").await;
        let bb = testing::bb(&pool, rubric, alex, "car", 1).await;

        toggle(&pool, alex, bb).await.unwrap();
        let (_, count_after_second) = toggle(&pool, kim, bb).await.unwrap();
        assert_eq!(count_after_second, 2);
        assert_eq!(count(&pool, bb).await.unwrap(), 2);
    }
}
