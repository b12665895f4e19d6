//! Per-user recently-viewed history, capped at three listings.

use sqlx::SqlitePool;

use crate::{db, db::Bb, AppResult};

pub const MAX_RECENT: usize = 3;

/// Remember that `user_id` opened `bb_id`. Anonymous viewers and repeat
/// views of an already-remembered listing are no-ops; a repeat view does
/// not bump recency. When the cap is exceeded the single oldest entry
/// goes.
pub async fn record(pool: &SqlitePool, user_id: Option<i64>, bb_id: i64) -> AppResult<()> {
    let Some(user_id) = user_id else {
        return Ok(());
    };

    let mut tx = pool.begin().await?;

    let existing: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT id, bb_id FROM recent_bbs WHERE user_id = ? ORDER BY attended_at, id",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    if existing.iter().any(|&(_, b)| b == bb_id) {
        return Ok(());
    }

    sqlx::query("INSERT INTO recent_bbs (user_id, bb_id, attended_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(bb_id)
        .bind(db::now())
        .execute(&mut *tx)
        .await?;

    if existing.len() >= MAX_RECENT {
        let (oldest, _) = existing[0];
        sqlx::query("DELETE FROM recent_bbs WHERE id = ?")
            .bind(oldest)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Up to three listings, most recently added first.
pub async fn recent(pool: &SqlitePool, user_id: i64) -> AppResult<Vec<Bb>> {
    Ok(sqlx::query_as::<_, Bb>(
        "SELECT b.* FROM bbs b
         JOIN recent_bbs r ON r.bb_id = b.id
         WHERE r.user_id = ?
         ORDER BY r.attended_at DESC, r.id DESC
         LIMIT 3",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    async fn titles(pool: &SqlitePool, user: i64) -> Vec<String> {
        recent(pool, user)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect()
    }

    #[tokio::test]
    async fn fourth_view_evicts_the_oldest() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let user = testing::user(&pool, "testuser1").await;
        let mut bbs = Vec::new();
        for (i, title) in ["bb1", "bb2", "bb3", "bb4"].iter().enumerate() {
            bbs.push(testing::bb(&pool, rubric, user, title, i as i64).await);
        }

        for &bb in &bbs {
            record(&pool, Some(user), bb).await.unwrap();
        }

        assert_eq!(titles(&pool, user).await, ["bb4", "bb3", "bb2"]);
    }

    #[tokio::test]
    async fn repeat_view_does_not_reorder() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let user = testing::user(&pool, "testuser1").await;
        let bb1 = testing::bb(&pool, rubric, user, "bb1", 1).await;
        let bb2 = testing::bb(&pool, rubric, user, "bb2", 2).await;
        let bb3 = testing::bb(&pool, rubric, user, "bb3", 3).await;

        for bb in [bb1, bb2, bb3, bb1] {
            record(&pool, Some(user), bb).await.unwrap();
        }

        // size and order both unchanged by the duplicate
        assert_eq!(titles(&pool, user).await, ["bb3", "bb2", "bb1"]);
    }

    #[tokio::test]
    async fn anonymous_views_are_not_recorded() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let user = testing::user(&pool, "testuser1").await;
        let bb = testing::bb(&pool, rubric, user, "bb1", 1).await;

        record(&pool, None, bb).await.unwrap();

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recent_bbs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }
}
