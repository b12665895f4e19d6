//! The signed-in user's own views: their listings (management view,
//! inactive included), listings they liked, and their recently-viewed
//! history.

use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    db, include_res,
    listings::{
        query::{self, ListingFilter},
        render_items,
    },
    recent, res, session, AppResult,
};

#[debug_handler]
pub async fn profile(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, "/accounts/profile").await?;
    let user = db::get_user(&db_pool, user_id).await?;

    // the management view shows the owner everything, active or not
    let filter = ListingFilter {
        author: Some(user_id),
        include_inactive: true,
        ..ListingFilter::default()
    };
    let bbs = query::all(&db_pool, &filter).await?;
    let recent_bbs = recent::recent(&db_pool, user_id).await?;

    let body = include_res!(str, "/pages/profile_bbs.html")
        .replace("{username}", &res::escape(&user.username))
        .replace("{bb_items}", &render_items(&bbs))
        .replace("{recent_items}", &render_items(&recent_bbs));
    Ok(Html(body).into_response())
}

#[debug_handler]
pub async fn liked(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, "/accounts/profile/liked").await?;

    let filter = ListingFilter {
        liked_by: Some(user_id),
        ..ListingFilter::default()
    };
    let bbs = query::all(&db_pool, &filter).await?;

    let body =
        include_res!(str, "/pages/profile_liked.html").replace("{bb_items}", &render_items(&bbs));
    Ok(Html(body).into_response())
}
