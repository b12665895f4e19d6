//! Rubric-scoped listing pages, paginated two to a page.

use axum::{
    debug_handler,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{catalog, db::Rubric, include_res, pages, res, AppResult};

use super::{
    query::{self, ListingFilter, ListingPage},
    render_items,
};

pub const PER_PAGE: i64 = 2;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub keyword: Option<String>,
    pub page: Option<i64>,
}

/// One `?page=N` link per page, the current one unmarked up.
fn pagination_html(page: &ListingPage, keyword: &str) -> String {
    let mut out = String::new();
    let keyword_param = if keyword.is_empty() {
        String::new()
    } else {
        format!("&keyword={}", urlencoding::encode(keyword))
    };
    for n in 1..=page.pages {
        if n == page.number {
            out += &format!("<span class=\"current\">{n}</span>\n");
        } else {
            out += &format!("<a href=\"?page={n}{keyword_param}\">{n}</a>\n");
        }
    }
    out
}

async fn render_rubric_page(
    pool: &SqlitePool,
    rubric: &Rubric,
    filter: ListingFilter,
    list_query: ListQuery,
) -> AppResult<Response> {
    let keyword = list_query.keyword.clone().unwrap_or_default();
    let filter = filter.with_keyword(list_query.keyword);
    let page = query::page(pool, &filter, list_query.page.unwrap_or(1), PER_PAGE).await?;

    let body = include_res!(str, "/pages/by_rubric.html")
        .replace("{rubric_name}", &res::escape(&rubric.name))
        .replace("{rubric_options}", &catalog::options_html(pool, filter.rubric).await?)
        .replace("{keyword}", &res::escape(&keyword))
        .replace("{bb_items}", &render_items(&page.bbs))
        .replace("{pagination}", &pagination_html(&page, &keyword));
    Ok(Html(body).into_response())
}

/// A single root segment is either a sub-rubric id or the name of a
/// fixed informational page.
#[debug_handler]
pub async fn by_slug(
    State(db_pool): State<SqlitePool>,
    Path(slug): Path<String>,
    Query(list_query): Query<ListQuery>,
) -> AppResult<Response> {
    match slug.parse::<i64>() {
        Ok(pk) => {
            let rubric = catalog::sub_rubric(&db_pool, pk).await?;
            render_rubric_page(
                &db_pool,
                &rubric,
                ListingFilter::in_rubric(rubric.id),
                list_query,
            )
            .await
        }
        Err(_) => pages::render(&slug),
    }
}

/// Super-rubric view spans every sub-rubric beneath it.
#[debug_handler]
pub async fn by_super(
    State(db_pool): State<SqlitePool>,
    Path(pk): Path<i64>,
    Query(list_query): Query<ListQuery>,
) -> AppResult<Response> {
    let rubric = catalog::super_rubric(&db_pool, pk).await?;
    let filter = ListingFilter {
        super_rubric: Some(rubric.id),
        ..ListingFilter::default()
    };
    render_rubric_page(&db_pool, &rubric, filter, list_query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_links_urlencode_the_keyword() {
        let page = ListingPage {
            bbs: Vec::new(),
            number: 1,
            pages: 3,
            total: 5,
        };
        let html = pagination_html(&page, "fast & red");

        assert!(html.contains("<span class=\"current\">1</span>"));
        assert!(html.contains("?page=2&keyword=fast%20%26%20red"));
        assert!(html.contains("?page=3&keyword=fast%20%26%20red"));
    }

    #[test]
    fn plain_keywords_stay_readable_in_links() {
        let page = ListingPage {
            bbs: Vec::new(),
            number: 2,
            pages: 2,
            total: 3,
        };
        let html = pagination_html(&page, "lada");

        assert!(html.contains("?page=1&keyword=lada"));
        assert!(html.contains("<span class=\"current\">2</span>"));
    }
}
