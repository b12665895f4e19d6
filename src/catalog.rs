//! Rubric tree queries. The tree is two levels: super-rubrics group
//! sub-rubrics, and only sub-rubrics ever own listings.

use sqlx::SqlitePool;

use crate::{db::Rubric, include_res, res, AppError, AppResult};

pub async fn super_rubrics(pool: &SqlitePool) -> AppResult<Vec<Rubric>> {
    Ok(sqlx::query_as::<_, Rubric>(
        "SELECT * FROM rubrics WHERE super_id IS NULL ORDER BY sort_order, name",
    )
    .fetch_all(pool)
    .await?)
}

pub async fn sub_rubrics(pool: &SqlitePool) -> AppResult<Vec<Rubric>> {
    Ok(sqlx::query_as::<_, Rubric>(
        "SELECT * FROM rubrics WHERE super_id IS NOT NULL ORDER BY sort_order, name",
    )
    .fetch_all(pool)
    .await?)
}

pub async fn sub_rubric(pool: &SqlitePool, id: i64) -> AppResult<Rubric> {
    sqlx::query_as::<_, Rubric>("SELECT * FROM rubrics WHERE id = ? AND super_id IS NOT NULL")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn super_rubric(pool: &SqlitePool, id: i64) -> AppResult<Rubric> {
    sqlx::query_as::<_, Rubric>("SELECT * FROM rubrics WHERE id = ? AND super_id IS NULL")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound)
}

/// `<option>` list for the search form select. Every page renders the
/// rubric tree through this, passed explicitly into the template.
pub async fn options_html(pool: &SqlitePool, selected: Option<i64>) -> AppResult<String> {
    let mut out = String::new();
    for rubric in sub_rubrics(pool).await? {
        out += &include_res!(str, "/pages/rubric_option.html")
            .replace("{id}", &rubric.id.to_string())
            .replace("{name}", &res::escape(&rubric.name))
            .replace(
                "{selected}",
                if selected == Some(rubric.id) { " selected" } else { "" },
            );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn rubrics_come_back_in_sort_order() {
        let pool = testing::pool().await;
        let sup = testing::rubric(&pool, "sup", None).await;
        sqlx::query("INSERT INTO rubrics (name, sort_order, super_id) VALUES ('1cars', 1, ?), ('2cars', 3, ?), ('3cars', 2, ?)")
            .bind(sup).bind(sup).bind(sup)
            .execute(&pool)
            .await
            .unwrap();

        let names: Vec<String> = sub_rubrics(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, ["1cars", "3cars", "2cars"]);
    }

    #[tokio::test]
    async fn super_rubrics_never_have_a_parent() {
        let pool = testing::pool().await;
        let sup = testing::rubric(&pool, "super", None).await;
        testing::rubric(&pool, "rubric", Some(sup)).await;
        testing::rubric(&pool, "rubric2", Some(sup)).await;
        testing::rubric(&pool, "sup2", None).await;

        let supers = super_rubrics(&pool).await.unwrap();
        assert_eq!(supers.len(), 2);
        assert!(supers.iter().all(|r| r.super_id.is_none()));
    }

    #[tokio::test]
    async fn sub_rubric_lookup_rejects_supers() {
        let pool = testing::pool().await;
        let sup = testing::rubric(&pool, "super", None).await;
        let sub = testing::rubric(&pool, "cars", Some(sup)).await;

        assert!(sub_rubric(&pool, sub).await.is_ok());
        assert!(matches!(
            sub_rubric(&pool, sup).await,
            Err(crate::AppError::NotFound)
        ));
    }
}
