//! Owner-side listing management. A listing that exists but belongs to
//! someone else is reported as missing, the same as one that does not
//! exist at all.

use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    catalog, db,
    db::Bb,
    include_res,
    listings::detail::render_detail,
    res, session, AppError, AppResult,
};

async fn own_bb(pool: &SqlitePool, user_id: i64, pk: i64) -> AppResult<Bb> {
    let bb = db::get_bb(pool, pk).await?;
    if bb.author_id != user_id {
        return Err(AppError::NotFound);
    }
    Ok(bb)
}

#[derive(Debug, Deserialize)]
pub struct BbForm {
    pub rubric: Option<i64>,
    pub title: String,
    pub content: Option<String>,
    pub price: Option<f64>,
    pub contacts: Option<String>,
    pub is_active: Option<String>,
}

struct FormPage<'a> {
    action: &'a str,
    heading: &'a str,
    rubric: Option<i64>,
    title: &'a str,
    content: &'a str,
    price: f64,
    contacts: &'a str,
    is_active: bool,
    message: &'a str,
}

async fn render_form(pool: &SqlitePool, page: FormPage<'_>) -> AppResult<Response> {
    let body = include_res!(str, "/pages/bb_form.html")
        .replace("{action}", page.action)
        .replace("{heading}", page.heading)
        .replace("{rubric_options}", &catalog::options_html(pool, page.rubric).await?)
        .replace("{title}", &res::escape(page.title))
        .replace("{content}", &res::escape(page.content))
        .replace("{price}", &format!("{:.0}", page.price))
        .replace("{contacts}", &res::escape(page.contacts))
        .replace("{is_active_checked}", if page.is_active { " checked" } else { "" })
        .replace("{message}", page.message);
    Ok(Html(body).into_response())
}

fn empty_form<'a>(action: &'a str, heading: &'a str) -> FormPage<'a> {
    FormPage {
        action,
        heading,
        rubric: None,
        title: "",
        content: "",
        price: 0.0,
        contacts: "",
        is_active: true,
        message: "",
    }
}

#[debug_handler]
pub async fn add_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    session::require_user(&session, "/accounts/profile/add").await?;
    render_form(&db_pool, empty_form("/accounts/profile/add", "New listing")).await
}

#[debug_handler]
pub async fn add(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<BbForm>,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, "/accounts/profile/add").await?;

    let action = "/accounts/profile/add";
    if form.title.trim().is_empty() {
        let mut page = empty_form(action, "New listing");
        page.message = "The title must not be empty.";
        return render_form(&db_pool, page).await;
    }
    let Some(rubric) = form.rubric else {
        let mut page = empty_form(action, "New listing");
        page.message = "Choose a rubric.";
        return render_form(&db_pool, page).await;
    };
    catalog::sub_rubric(&db_pool, rubric).await?;

    sqlx::query(
        "INSERT INTO bbs (rubric_id, author_id, title, content, price, contacts, is_active, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(rubric)
    .bind(user_id)
    .bind(form.title.trim())
    .bind(form.content.unwrap_or_default())
    .bind(form.price.unwrap_or(0.0))
    .bind(form.contacts.unwrap_or_default())
    .bind(form.is_active.is_some())
    .bind(db::now())
    .execute(&db_pool)
    .await?;

    Ok(Redirect::to("/accounts/profile").into_response())
}

#[debug_handler]
pub async fn change_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(pk): Path<i64>,
) -> AppResult<Response> {
    let user_id =
        session::require_user(&session, &format!("/accounts/profile/change/{pk}")).await?;
    let bb = own_bb(&db_pool, user_id, pk).await?;

    render_form(
        &db_pool,
        FormPage {
            action: &format!("/accounts/profile/change/{pk}"),
            heading: "Edit listing",
            rubric: Some(bb.rubric_id),
            title: &bb.title,
            content: &bb.content,
            price: bb.price,
            contacts: &bb.contacts,
            is_active: bb.is_active,
            message: "",
        },
    )
    .await
}

#[debug_handler]
pub async fn change(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(pk): Path<i64>,
    Form(form): Form<BbForm>,
) -> AppResult<Response> {
    let user_id =
        session::require_user(&session, &format!("/accounts/profile/change/{pk}")).await?;
    let bb = own_bb(&db_pool, user_id, pk).await?;

    if form.title.trim().is_empty() {
        return render_form(
            &db_pool,
            FormPage {
                action: &format!("/accounts/profile/change/{pk}"),
                heading: "Edit listing",
                rubric: Some(bb.rubric_id),
                title: &bb.title,
                content: &bb.content,
                price: bb.price,
                contacts: &bb.contacts,
                is_active: bb.is_active,
                message: "The title must not be empty.",
            },
        )
        .await;
    }
    let rubric = form.rubric.unwrap_or(bb.rubric_id);
    catalog::sub_rubric(&db_pool, rubric).await?;

    sqlx::query(
        "UPDATE bbs SET rubric_id = ?, title = ?, content = ?, price = ?, contacts = ?, is_active = ?
         WHERE id = ?",
    )
    .bind(rubric)
    .bind(form.title.trim())
    .bind(form.content.unwrap_or_default())
    .bind(form.price.unwrap_or(0.0))
    .bind(form.contacts.unwrap_or_default())
    .bind(form.is_active.is_some())
    .bind(pk)
    .execute(&db_pool)
    .await?;

    Ok(Redirect::to("/accounts/profile").into_response())
}

#[debug_handler]
pub async fn delete_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(pk): Path<i64>,
) -> AppResult<Response> {
    let user_id =
        session::require_user(&session, &format!("/accounts/profile/delete/{pk}")).await?;
    let bb = own_bb(&db_pool, user_id, pk).await?;

    let body = include_res!(str, "/pages/bb_delete.html")
        .replace("{pk}", &bb.id.to_string())
        .replace("{title}", &res::escape(&bb.title));
    Ok(Html(body).into_response())
}

#[debug_handler]
pub async fn delete(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(pk): Path<i64>,
) -> AppResult<Response> {
    let user_id =
        session::require_user(&session, &format!("/accounts/profile/delete/{pk}")).await?;
    own_bb(&db_pool, user_id, pk).await?;

    sqlx::query("DELETE FROM bbs WHERE id = ?")
        .bind(pk)
        .execute(&db_pool)
        .await?;

    Ok(Redirect::to("/accounts/profile").into_response())
}

/// Detail of one of the owner's listings, inactive ones included.
#[debug_handler]
pub async fn own_detail(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(pk): Path<i64>,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, &format!("/accounts/profile/{pk}")).await?;
    let bb = own_bb(&db_pool, user_id, pk).await?;

    let url = format!("/accounts/profile/{pk}");
    render_detail(&db_pool, &session, &bb, &url, "").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn someone_elses_listing_reads_as_missing() {
        let pool = testing::pool().await;
        let rubric = testing::rubric(&pool, "cars", None).await;
        let alex = testing::user(&pool, "alex").await;
        let kim = testing::user(&pool, "kim").await;
        let bb = testing::bb(&pool, rubric, alex, "car", 1).await;

        assert!(own_bb(&pool, alex, bb).await.is_ok());
        assert!(matches!(own_bb(&pool, kim, bb).await, Err(AppError::NotFound)));
    }
}
