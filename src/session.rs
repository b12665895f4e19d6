use tower_sessions::Session;

use crate::{AppError, AppResult};

pub const USER_ID: &str = "user_id";
pub const CAPTCHA_ANSWER: &str = "captcha_answer";

/// Id of the signed-in user, if any.
pub async fn user_id(session: &Session) -> AppResult<Option<i64>> {
    Ok(session.get::<i64>(USER_ID).await?)
}

/// Owner-only handlers call this first; `next` is where the login page
/// should send the user back to.
pub async fn require_user(session: &Session, next: &str) -> AppResult<i64> {
    user_id(session)
        .await?
        .ok_or_else(|| AppError::login_required(next))
}
