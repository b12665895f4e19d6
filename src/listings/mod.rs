pub mod by_rubric;
pub mod detail;
pub mod feed;
pub mod query;

use axum::{
    routing::{get, post},
    Router,
};

use crate::{db::Bb, include_res, likes, res, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(feed::index).post(feed::search))
        .route("/like_bb", post(likes::like_bb))
        .route("/user/{pk}", get(feed::foreign_user))
        .route("/super/{pk}", get(by_rubric::by_super))
        .route("/{slug}", get(by_rubric::by_slug).post(feed::search))
        .route("/{rubric_pk}/{pk}", get(detail::detail).post(feed::search))
        .route("/{rubric_pk}/{pk}/comment", post(detail::add_comment))
}

/// Listing rows for any of the list views.
pub(crate) fn render_items(bbs: &[Bb]) -> String {
    let mut out = String::new();
    for bb in bbs {
        out += &include_res!(str, "/pages/bb_item.html")
            .replace("{rubric_pk}", &bb.rubric_id.to_string())
            .replace("{pk}", &bb.id.to_string())
            .replace("{title}", &res::escape(&bb.title))
            .replace("{price}", &format!("{:.0}", bb.price))
            .replace("{created_at}", &res::format_ts(bb.created_at));
    }
    out
}
