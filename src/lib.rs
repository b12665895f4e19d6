pub mod accounts;
pub mod api;
pub mod catalog;
pub mod comments;
pub mod db;
pub mod likes;
pub mod listings;
pub mod pages;
pub mod recent;
pub mod res;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use axum::{
    extract::FromRef,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

pub type AppResult<T> = Result<T, AppError>;

/// Per-request failure. Everything unexpected collapses into `Internal`;
/// the other variants carry a routing decision of their own.
#[derive(Debug)]
pub enum AppError {
    /// Missing records, unknown pages and ownership violations alike.
    /// Ownership failures look identical to missing records so the
    /// response never leaks whether the record exists.
    NotFound,
    /// Owner-only action hit without a session; redirects to the login
    /// page, carrying the original target as the return path.
    LoginRequired(String),
    Internal(anyhow::Error),
}

impl AppError {
    pub fn login_required(next: &str) -> Self {
        Self::LoginRequired(next.to_owned())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Html(include_res!(str, "/pages/not_found.html")),
            )
                .into_response(),
            Self::LoginRequired(next) => {
                Redirect::to(&format!("/accounts/login?next={next}")).into_response()
            }
            Self::Internal(err) => {
                tracing::error!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{}\n\n{}", err, err.backtrace()),
                )
                    .into_response()
            }
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn login_redirect_carries_the_return_path() {
        let response = AppError::login_required("/accounts/profile/add").into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers().get(LOCATION).unwrap();
        assert_eq!(location, "/accounts/login?next=/accounts/profile/add");
    }

    #[test]
    fn not_found_renders_as_404() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
