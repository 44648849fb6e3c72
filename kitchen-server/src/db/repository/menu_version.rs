//! Menu Version Repository
//!
//! Single row (id = 1), created by the initial migration at version 1.
//! Only ever incremented, always inside the transaction of the menu mutation
//! that caused it.

use super::{RepoError, RepoResult};
use sqlx::{Executor, Sqlite, SqliteConnection};

pub async fn current<'e, E>(executor: E) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let version = sqlx::query_scalar::<_, i64>("SELECT version FROM menu_version WHERE id = 1")
        .fetch_optional(executor)
        .await?;
    version.ok_or_else(|| RepoError::NotFound("menu_version row missing".into()))
}

/// Increment by exactly one and return the new value
pub async fn bump(conn: &mut SqliteConnection) -> RepoResult<i64> {
    let version = sqlx::query_scalar::<_, i64>(
        "UPDATE menu_version SET version = version + 1 WHERE id = 1 RETURNING version",
    )
    .fetch_optional(conn)
    .await?;
    version.ok_or_else(|| RepoError::NotFound("menu_version row missing".into()))
}
