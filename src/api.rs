//! Small JSON read surface over the same query service the HTML pages
//! use.

use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    comments, db,
    db::{Bb, Comment},
    listings::query::{self, ListingFilter},
    session, AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bbs", get(list_bbs))
        .route("/bbs/{pk}", get(bb_detail))
        .route("/bbs/{pk}/comments", get(bb_comments).post(post_comment))
}

#[derive(Serialize)]
pub struct BbDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub price: f64,
    pub created_at: i64,
}

impl From<Bb> for BbDto {
    fn from(bb: Bb) -> Self {
        Self {
            id: bb.id,
            title: bb.title,
            content: bb.content,
            price: bb.price,
            created_at: bb.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct BbDetailDto {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub price: f64,
    pub rubric: String,
    pub contacts: String,
    pub created_at: i64,
}

#[derive(Serialize)]
pub struct CommentDto {
    pub bb: i64,
    pub author: Option<String>,
    pub content: String,
    pub created_at: i64,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        let author = if comment.author_name.is_empty() {
            None
        } else {
            Some(comment.author_name)
        };
        Self {
            bb: comment.bb_id,
            author,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[debug_handler]
pub async fn list_bbs(State(db_pool): State<SqlitePool>) -> AppResult<Json<Vec<BbDto>>> {
    let bbs = query::all(&db_pool, &ListingFilter::active()).await?;
    Ok(Json(bbs.into_iter().map(BbDto::from).collect()))
}

#[debug_handler]
pub async fn bb_detail(
    State(db_pool): State<SqlitePool>,
    Path(pk): Path<i64>,
) -> AppResult<Json<BbDetailDto>> {
    let bb = db::get_bb(&db_pool, pk).await?;
    if !bb.is_active {
        return Err(crate::AppError::NotFound);
    }
    let rubric = sqlx::query_scalar::<_, String>("SELECT name FROM rubrics WHERE id = ?")
        .bind(bb.rubric_id)
        .fetch_one(&db_pool)
        .await?;

    Ok(Json(BbDetailDto {
        id: bb.id,
        title: bb.title,
        content: bb.content,
        price: bb.price,
        rubric,
        contacts: bb.contacts,
        created_at: bb.created_at,
    }))
}

#[debug_handler]
pub async fn bb_comments(
    State(db_pool): State<SqlitePool>,
    Path(pk): Path<i64>,
) -> AppResult<Json<Vec<CommentDto>>> {
    let bb = db::get_bb(&db_pool, pk).await?;
    if !bb.is_active {
        return Err(crate::AppError::NotFound);
    }
    let comments = comments::active_for(&db_pool, pk).await?;
    Ok(Json(comments.into_iter().map(CommentDto::from).collect()))
}

#[derive(Deserialize)]
pub struct NewComment {
    pub content: String,
}

/// API clients do not get the login redirect dance; a missing session
/// is a plain 401.
#[debug_handler]
pub async fn post_comment(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(pk): Path<i64>,
    Json(new_comment): Json<NewComment>,
) -> AppResult<Response> {
    let Some(user_id) = session::user_id(&session).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };
    let bb = db::get_bb(&db_pool, pk).await?;
    if !bb.is_active {
        return Err(crate::AppError::NotFound);
    }

    if new_comment.content.trim().is_empty() {
        return Ok(StatusCode::UNPROCESSABLE_ENTITY.into_response());
    }
    comments::add_user(&db_pool, pk, user_id, new_comment.content.trim()).await?;
    Ok(StatusCode::CREATED.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{testing, AppError};

    #[tokio::test]
    async fn comments_of_inactive_listings_are_hidden() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let alex = testing::user(&pool, "alex").await;
        let bb = testing::bb_full(&pool, rubric, alex, "car", 1, false).await;
        comments::add_user(&pool, bb, alex, "still here").await.unwrap();

        let result = bb_comments(State(pool.clone()), Path(bb)).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
