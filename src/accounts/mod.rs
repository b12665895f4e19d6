//! Everything behind `/accounts`: registration, sessions, the owner's
//! listing management and account settings.

mod auth;
mod bbs;
mod profile;

pub use auth::{hash_password, verify_password};

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route(
            "/password/change",
            get(auth::password_change_page).post(auth::password_change),
        )
        .route("/profile", get(profile::profile))
        .route("/profile/liked", get(profile::liked))
        .route("/profile/add", get(bbs::add_page).post(bbs::add))
        .route(
            "/profile/change",
            get(auth::change_info_page).post(auth::change_info),
        )
        .route("/profile/change/{pk}", get(bbs::change_page).post(bbs::change))
        .route(
            "/profile/delete",
            get(auth::delete_user_page).post(auth::delete_user),
        )
        .route("/profile/delete/{pk}", get(bbs::delete_page).post(bbs::delete))
        .route("/profile/{pk}", get(bbs::own_detail))
}
