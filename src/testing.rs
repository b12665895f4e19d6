//! Shared fixtures for the module tests: an in-memory database plus
//! tiny row factories.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::db;

pub(crate) async fn pool() -> SqlitePool {
    // a single connection, otherwise every pooled connection would get
    // its own empty :memory: database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    db::init_schema(&pool).await.unwrap();
    pool
}

pub(crate) async fn user(pool: &SqlitePool, username: &str) -> i64 {
    sqlx::query(
        "INSERT INTO users (username, password_hash, is_activated) VALUES (?, 'x', 1)",
    )
    .bind(username)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

pub(crate) async fn rubric(pool: &SqlitePool, name: &str, super_id: Option<i64>) -> i64 {
    sqlx::query("INSERT INTO rubrics (name, super_id) VALUES (?, ?)")
        .bind(name)
        .bind(super_id)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

pub(crate) async fn bb(
    pool: &SqlitePool,
    rubric_id: i64,
    author_id: i64,
    title: &str,
    created_at: i64,
) -> i64 {
    bb_full(pool, rubric_id, author_id, title, created_at, true).await
}

pub(crate) async fn bb_full(
    pool: &SqlitePool,
    rubric_id: i64,
    author_id: i64,
    title: &str,
    created_at: i64,
    is_active: bool,
) -> i64 {
    sqlx::query(
        "INSERT INTO bbs (rubric_id, author_id, title, content, price, contacts, is_active, created_at)
         VALUES (?, ?, ?, 'red', 20000, 'Call', ?, ?)",
    )
    .bind(rubric_id)
    .bind(author_id)
    .bind(title)
    .bind(is_active)
    .bind(created_at)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}
