//! Front page feed and the search form it shares with every other
//! listing page.

use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{catalog, db, include_res, res, AppResult};

use super::{
    query::{self, ListingFilter},
    render_items,
};

pub const FEED_SIZE: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub rubric: Option<i64>,
    pub keyword: Option<String>,
}

async fn render_feed(
    pool: &SqlitePool,
    bbs: &[db::Bb],
    selected: Option<i64>,
    keyword: &str,
    message: &str,
) -> AppResult<Response> {
    let body = include_res!(str, "/pages/index.html")
        .replace("{rubric_options}", &catalog::options_html(pool, selected).await?)
        .replace("{keyword}", &res::escape(keyword))
        .replace("{message}", message)
        .replace("{bb_items}", &render_items(bbs));
    Ok(Html(body).into_response())
}

#[debug_handler]
pub async fn index(State(db_pool): State<SqlitePool>) -> AppResult<Response> {
    let bbs = query::latest(&db_pool, &ListingFilter::active(), FEED_SIZE).await?;
    render_feed(&db_pool, &bbs, None, "", "").await
}

/// Search posts from the feed, rubric pages and detail pages all land
/// here; path parameters of the posting page are irrelevant to the
/// result.
#[debug_handler]
pub async fn search(
    State(db_pool): State<SqlitePool>,
    Form(SearchForm { rubric, keyword }): Form<SearchForm>,
) -> AppResult<Response> {
    let Some(rubric) = rubric else {
        // invalid form input re-renders the feed with a message
        let bbs = query::latest(&db_pool, &ListingFilter::active(), FEED_SIZE).await?;
        return render_feed(&db_pool, &bbs, None, "", "Choose a rubric to search in.").await;
    };

    let filter = ListingFilter::in_rubric(rubric).with_keyword(keyword.clone());
    let bbs = query::latest(&db_pool, &filter, FEED_SIZE).await?;
    render_feed(
        &db_pool,
        &bbs,
        Some(rubric),
        keyword.as_deref().unwrap_or(""),
        "",
    )
    .await
}

/// Public page of another user's listings; only active ones show.
#[debug_handler]
pub async fn foreign_user(
    State(db_pool): State<SqlitePool>,
    Path(pk): Path<i64>,
) -> AppResult<Response> {
    let user = db::get_user(&db_pool, pk).await?;

    let filter = ListingFilter {
        author: Some(user.id),
        ..ListingFilter::default()
    };
    let bbs = query::latest(&db_pool, &filter, FEED_SIZE).await?;

    let body = include_res!(str, "/pages/foreign_user.html")
        .replace("{username}", &res::escape(&user.username))
        .replace("{bb_items}", &render_items(&bbs));
    Ok(Html(body).into_response())
}
