//! Listing detail page: the one read path that mutates state. Each
//! request bumps the listing's view counter and the per-URL hit
//! counter once, and files the listing into the viewer's
//! recently-viewed history.

use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    catalog, comments, db,
    db::Bb,
    include_res, likes, recent, res,
    session::{self, CAPTCHA_ANSWER},
    AppError, AppResult,
};

use super::{query, render_items};

/// One atomic increment per detail request; the read-modify-write of
/// the original could lose concurrent updates.
pub async fn bump_views(pool: &SqlitePool, bb_id: i64) -> AppResult<i64> {
    Ok(
        sqlx::query_scalar("UPDATE bbs SET views = views + 1 WHERE id = ? RETURNING views")
            .bind(bb_id)
            .fetch_one(pool)
            .await?,
    )
}

/// Per-URL hit counter, kept separately from the listing's own counter.
pub async fn hit(pool: &SqlitePool, url: &str) -> AppResult<i64> {
    Ok(sqlx::query_scalar(
        "INSERT INTO page_hits (url, count) VALUES (?, 1)
         ON CONFLICT(url) DO UPDATE SET count = count + 1
         RETURNING count",
    )
    .bind(url)
    .fetch_one(pool)
    .await?)
}

/// Deactivated listings stay reachable for their owner only.
pub(crate) fn visible_to(bb: &Bb, viewer: Option<i64>) -> bool {
    bb.is_active || viewer == Some(bb.author_id)
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub comment_error: Option<String>,
}

/// Shared by the public detail page and the owner's profile detail.
pub(crate) async fn render_detail(
    pool: &SqlitePool,
    session: &Session,
    bb: &Bb,
    url: &str,
    comment_error: &str,
) -> AppResult<Response> {
    let views = bump_views(pool, bb.id).await?;
    let count_views = hit(pool, url).await?;

    let viewer = session::user_id(session).await?;
    recent::record(pool, viewer, bb.id).await?;

    let author = db::get_user(pool, bb.author_id).await?;
    let related = query::related(pool, bb).await?;
    let like_count = likes::count(pool, bb.id).await?;
    let comment_list = comments::active_for(pool, bb.id).await?;

    let (like_markup, guest_fields) = match viewer {
        Some(user_id) => {
            let markup = if likes::is_liked(pool, user_id, bb.id).await? {
                likes::LIKED_MARKUP
            } else {
                likes::UNLIKED_MARKUP
            };
            (markup.to_owned(), String::new())
        }
        None => {
            let (question, answer) = comments::captcha_challenge();
            session.insert(CAPTCHA_ANSWER, answer).await?;
            let fields = include_res!(str, "/pages/guest_fields.html")
                .replace("{captcha_question}", &question);
            (String::new(), fields)
        }
    };

    let body = include_res!(str, "/pages/detail.html")
        .replace("{rubric_options}", &catalog::options_html(pool, Some(bb.rubric_id)).await?)
        .replace("{rubric_pk}", &bb.rubric_id.to_string())
        .replace("{pk}", &bb.id.to_string())
        .replace("{title}", &res::escape(&bb.title))
        .replace("{content}", &res::markdown(&bb.content))
        .replace("{price}", &format!("{:.0}", bb.price))
        .replace("{contacts}", &res::escape(&bb.contacts))
        .replace("{author}", &res::escape(&author.username))
        .replace("{author_pk}", &author.id.to_string())
        .replace("{created_at}", &res::format_ts(bb.created_at))
        .replace("{views}", &views.to_string())
        .replace("{count_views}", &count_views.to_string())
        .replace("{like_count}", &like_count.to_string())
        .replace("{like_markup}", &like_markup)
        .replace("{related_items}", &render_items(&related))
        .replace("{comments}", &comments::render(&comment_list))
        .replace("{guest_fields}", &guest_fields)
        .replace("{comment_error}", comment_error);
    Ok(Html(body).into_response())
}

#[debug_handler]
pub async fn detail(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path((rubric_pk, pk)): Path<(i64, i64)>,
    Query(DetailQuery { comment_error }): Query<DetailQuery>,
) -> AppResult<Response> {
    let bb = db::get_bb(&db_pool, pk).await?;
    if bb.rubric_id != rubric_pk {
        return Err(AppError::NotFound);
    }

    if !visible_to(&bb, session::user_id(&session).await?) {
        return Err(AppError::NotFound);
    }

    let url = format!("/{rubric_pk}/{pk}");
    let error = match comment_error.as_deref() {
        Some("captcha") => "Wrong captcha answer, try again.",
        Some(_) => "Comment could not be saved.",
        None => "",
    };
    render_detail(&db_pool, &session, &bb, &url, error).await
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub author: Option<String>,
    pub content: String,
    pub captcha: Option<String>,
}

#[debug_handler]
pub async fn add_comment(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path((rubric_pk, pk)): Path<(i64, i64)>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let bb = db::get_bb(&db_pool, pk).await?;
    if bb.rubric_id != rubric_pk {
        return Err(AppError::NotFound);
    }
    if !visible_to(&bb, session::user_id(&session).await?) {
        return Err(AppError::NotFound);
    }

    let back = format!("/{rubric_pk}/{pk}");
    if form.content.trim().is_empty() {
        return Ok(Redirect::to(&format!("{back}?comment_error=empty")).into_response());
    }

    match session::user_id(&session).await? {
        Some(user_id) => {
            comments::add_user(&db_pool, bb.id, user_id, form.content.trim()).await?;
        }
        None => {
            let expected: Option<String> = session.get(CAPTCHA_ANSWER).await?;
            let given = form.captcha.unwrap_or_default();
            if expected.is_none() || expected.as_deref() != Some(given.trim()) {
                return Ok(
                    Redirect::to(&format!("{back}?comment_error=captcha")).into_response()
                );
            }
            session.remove::<String>(CAPTCHA_ANSWER).await?;

            let name = form.author.unwrap_or_default();
            let name = if name.trim().is_empty() { "guest" } else { name.trim() };
            comments::add_guest(&db_pool, bb.id, name, form.content.trim()).await?;
        }
    }

    Ok(Redirect::to(&back).into_response())
}
