//! Registration, login and account settings. Password hashing is the
//! argon2 default profile behind two small helpers; session state is
//! tower-sessions, same as everywhere else.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, include_res, res, session, session::USER_ID, AppResult};

const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn register_form(message: &str) -> Response {
    Html(include_res!(str, "/pages/register.html").replace("{message}", message)).into_response()
}

#[debug_handler]
pub async fn register_page() -> impl IntoResponse {
    register_form("")
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: Option<String>,
    pub password1: String,
    pub password2: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub send_messages: Option<String>,
}

#[debug_handler]
pub async fn register(
    State(db_pool): State<SqlitePool>,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    let username = form.username.trim();
    if username.is_empty() {
        return Ok(register_form("Pick a username."));
    }
    if form.password1.len() < MIN_PASSWORD_LEN {
        return Ok(register_form("Password must be at least 8 characters."));
    }
    if form.password1 != form.password2 {
        return Ok(register_form("The passwords do not match."));
    }
    if db::user_by_name(&db_pool, username).await?.is_some() {
        return Ok(register_form("That username is taken."));
    }

    // no activation mail round-trip, accounts go live immediately
    sqlx::query(
        "INSERT INTO users (username, password_hash, email, first_name, last_name, send_messages, is_activated)
         VALUES (?, ?, ?, ?, ?, ?, 1)",
    )
    .bind(username)
    .bind(hash_password(&form.password1)?)
    .bind(form.email.unwrap_or_default().trim())
    .bind(form.first_name.unwrap_or_default().trim())
    .bind(form.last_name.unwrap_or_default().trim())
    .bind(form.send_messages.is_some())
    .execute(&db_pool)
    .await?;

    tracing::info!("registered user {username}");
    Ok(Redirect::to("/accounts/login").into_response())
}

fn login_form(next: &str, message: &str) -> Response {
    Html(
        include_res!(str, "/pages/login.html")
            .replace("{next}", &res::escape(next))
            .replace("{message}", message),
    )
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[debug_handler]
pub async fn login_page(Query(LoginQuery { next }): Query<LoginQuery>) -> impl IntoResponse {
    login_form(next.as_deref().unwrap_or(""), "")
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[debug_handler]
pub async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let next = form.next.as_deref().unwrap_or("");

    let Some(user) = db::user_by_name(&db_pool, form.username.trim()).await? else {
        return Ok(login_form(next, "Wrong username or password."));
    };
    if !user.is_activated || !verify_password(&form.password, &user.password_hash) {
        return Ok(login_form(next, "Wrong username or password."));
    }

    session.insert(USER_ID, user.id).await?;
    tracing::info!("user {} logged in", user.username);

    let target = if next.is_empty() { "/accounts/profile" } else { next };
    Ok(Redirect::to(target).into_response())
}

#[debug_handler]
pub async fn logout(session: Session) -> AppResult<Redirect> {
    session.clear().await;
    Ok(Redirect::to("/"))
}

fn password_change_form(message: &str) -> Response {
    Html(include_res!(str, "/pages/password_change.html").replace("{message}", message))
        .into_response()
}

#[debug_handler]
pub async fn password_change_page(session: Session) -> AppResult<Response> {
    session::require_user(&session, "/accounts/password/change").await?;
    Ok(password_change_form(""))
}

#[derive(Debug, Deserialize)]
pub struct PasswordChangeForm {
    pub old_password: String,
    pub new_password1: String,
    pub new_password2: String,
}

#[debug_handler]
pub async fn password_change(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<PasswordChangeForm>,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, "/accounts/password/change").await?;
    let user = db::get_user(&db_pool, user_id).await?;

    if !verify_password(&form.old_password, &user.password_hash) {
        return Ok(password_change_form("The current password is wrong."));
    }
    if form.new_password1.len() < MIN_PASSWORD_LEN {
        return Ok(password_change_form("Password must be at least 8 characters."));
    }
    if form.new_password1 != form.new_password2 {
        return Ok(password_change_form("The passwords do not match."));
    }

    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(hash_password(&form.new_password1)?)
        .bind(user_id)
        .execute(&db_pool)
        .await?;

    Ok(Redirect::to("/accounts/profile").into_response())
}

fn info_form(user: &db::User, message: &str) -> Response {
    Html(
        include_res!(str, "/pages/change_user_info.html")
            .replace("{username}", &res::escape(&user.username))
            .replace("{email}", &res::escape(&user.email))
            .replace("{first_name}", &res::escape(&user.first_name))
            .replace("{last_name}", &res::escape(&user.last_name))
            .replace(
                "{send_messages_checked}",
                if user.send_messages { " checked" } else { "" },
            )
            .replace("{message}", message),
    )
    .into_response()
}

#[debug_handler]
pub async fn change_info_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, "/accounts/profile/change").await?;
    let user = db::get_user(&db_pool, user_id).await?;
    Ok(info_form(&user, ""))
}

#[derive(Debug, Deserialize)]
pub struct UserInfoForm {
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub send_messages: Option<String>,
}

#[debug_handler]
pub async fn change_info(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<UserInfoForm>,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, "/accounts/profile/change").await?;
    let user = db::get_user(&db_pool, user_id).await?;

    let username = form.username.trim();
    if username.is_empty() {
        return Ok(info_form(&user, "Pick a username."));
    }
    if username != user.username && db::user_by_name(&db_pool, username).await?.is_some() {
        return Ok(info_form(&user, "That username is taken."));
    }

    sqlx::query(
        "UPDATE users SET username = ?, email = ?, first_name = ?, last_name = ?, send_messages = ?
         WHERE id = ?",
    )
    .bind(username)
    .bind(form.email.unwrap_or_default().trim())
    .bind(form.first_name.unwrap_or_default().trim())
    .bind(form.last_name.unwrap_or_default().trim())
    .bind(form.send_messages.is_some())
    .bind(user_id)
    .execute(&db_pool)
    .await?;

    Ok(Redirect::to("/accounts/profile").into_response())
}

#[debug_handler]
pub async fn delete_user_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, "/accounts/profile/delete").await?;
    let user = db::get_user(&db_pool, user_id).await?;
    Ok(Html(
        include_res!(str, "/pages/delete_user.html")
            .replace("{username}", &res::escape(&user.username)),
    )
    .into_response())
}

/// Deleting the account cascades to every listing the user owns.
#[debug_handler]
pub async fn delete_user(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user_id = session::require_user(&session, "/accounts/profile/delete").await?;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&db_pool)
        .await?;
    session.clear().await;

    Ok(Redirect::to("/").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrips() {
        let hash = hash_password("Test1111").unwrap();
        assert!(verify_password("Test1111", &hash));
        assert!(!verify_password("Test2222", &hash));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("whatever", "not-a-phc-string"));
    }
}
