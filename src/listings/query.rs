//! Listing query service: filter, order, paginate.

use sqlx::SqlitePool;

use crate::{db::Bb, AppResult};

/// Predicates AND together. `include_inactive` is only ever set on an
/// owner's own management views.
#[derive(Debug, Default, Clone)]
pub struct ListingFilter {
    pub rubric: Option<i64>,
    pub super_rubric: Option<i64>,
    pub keyword: Option<String>,
    pub author: Option<i64>,
    pub liked_by: Option<i64>,
    pub include_inactive: bool,
}

impl ListingFilter {
    pub fn active() -> Self {
        Self::default()
    }

    pub fn in_rubric(id: i64) -> Self {
        Self {
            rubric: Some(id),
            ..Self::default()
        }
    }

    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword.filter(|k| !k.trim().is_empty());
        self
    }

    fn clauses(&self) -> String {
        let mut join = String::new();
        let mut conds = Vec::new();
        if self.liked_by.is_some() {
            join = " JOIN likes l ON l.bb_id = b.id".to_owned();
            conds.push("l.user_id = ?".to_owned());
        }
        if !self.include_inactive {
            conds.push("b.is_active = 1".to_owned());
        }
        if self.rubric.is_some() {
            conds.push("b.rubric_id = ?".to_owned());
        }
        if self.super_rubric.is_some() {
            conds.push("b.rubric_id IN (SELECT id FROM rubrics WHERE super_id = ?)".to_owned());
        }
        if self.author.is_some() {
            conds.push("b.author_id = ?".to_owned());
        }
        if self.keyword.is_some() {
            // case-insensitive substring against title OR body
            conds.push(
                "(instr(lower(b.title), lower(?)) > 0 OR instr(lower(b.content), lower(?)) > 0)"
                    .to_owned(),
            );
        }
        let mut sql = join;
        if !conds.is_empty() {
            sql += " WHERE ";
            sql += &conds.join(" AND ");
        }
        sql
    }

    fn bind<'q, O>(
        &'q self,
        mut query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(user) = self.liked_by {
            query = query.bind(user);
        }
        if let Some(rubric) = self.rubric {
            query = query.bind(rubric);
        }
        if let Some(super_rubric) = self.super_rubric {
            query = query.bind(super_rubric);
        }
        if let Some(author) = self.author {
            query = query.bind(author);
        }
        if let Some(keyword) = &self.keyword {
            query = query.bind(keyword.as_str()).bind(keyword.as_str());
        }
        query
    }
}

/// One page of results. `number` is what the caller actually got after
/// clamping, `pages` is always at least 1.
#[derive(Debug)]
pub struct ListingPage {
    pub bbs: Vec<Bb>,
    pub number: i64,
    pub pages: i64,
    pub total: i64,
}

/// Newest first; listings created in the same second keep their
/// insertion order.
const ORDER: &str = " ORDER BY b.created_at DESC, b.id ASC";

/// 1-indexed, out-of-range page numbers clamp to the nearest valid page.
pub async fn page(
    pool: &SqlitePool,
    filter: &ListingFilter,
    page_num: i64,
    per_page: i64,
) -> AppResult<ListingPage> {
    let clauses = filter.clauses();

    let count_sql = format!("SELECT COUNT(*) AS n FROM bbs b{clauses}");
    let (total,): (i64,) = filter
        .bind(sqlx::query_as(&count_sql))
        .fetch_one(pool)
        .await?;

    let pages = ((total + per_page - 1) / per_page).max(1);
    let number = page_num.clamp(1, pages);

    let select_sql = format!(
        "SELECT b.* FROM bbs b{clauses}{ORDER} LIMIT {per_page} OFFSET {}",
        (number - 1) * per_page
    );
    let bbs = filter
        .bind(sqlx::query_as::<_, Bb>(&select_sql))
        .fetch_all(pool)
        .await?;

    Ok(ListingPage {
        bbs,
        number,
        pages,
        total,
    })
}

/// Unpaginated variant for the front feed and profile views.
pub async fn latest(
    pool: &SqlitePool,
    filter: &ListingFilter,
    limit: i64,
) -> AppResult<Vec<Bb>> {
    let clauses = filter.clauses();
    let sql = format!("SELECT b.* FROM bbs b{clauses}{ORDER} LIMIT {limit}");
    Ok(filter
        .bind(sqlx::query_as::<_, Bb>(&sql))
        .fetch_all(pool)
        .await?)
}

/// Everything the filter matches, for the profile views that never
/// paginate.
pub async fn all(pool: &SqlitePool, filter: &ListingFilter) -> AppResult<Vec<Bb>> {
    let clauses = filter.clauses();
    let sql = format!("SELECT b.* FROM bbs b{clauses}{ORDER}");
    Ok(filter
        .bind(sqlx::query_as::<_, Bb>(&sql))
        .fetch_all(pool)
        .await?)
}

/// Up to nine other active listings in the same rubric whose title
/// contains the first character of this one's title.
// TODO: matching on the first title character is oddly narrow; confirm
// the intended matching rule with product before tightening this.
pub async fn related(pool: &SqlitePool, bb: &Bb) -> AppResult<Vec<Bb>> {
    let Some(first) = bb.title.chars().next() else {
        return Ok(Vec::new());
    };

    Ok(sqlx::query_as::<_, Bb>(
        "SELECT b.* FROM bbs b
         WHERE b.is_active = 1 AND b.rubric_id = ? AND b.id <> ?
           AND instr(lower(b.title), lower(?)) > 0
         ORDER BY b.created_at DESC, b.id ASC
         LIMIT 9",
    )
    .bind(bb.rubric_id)
    .bind(bb.id)
    .bind(first.to_string())
    .fetch_all(pool)
    .await?)
}
