use crate::types::{FileRecord, NewFileRecord};
use sqlx::PgPool;

/// Look up the record stored for `(kind, version)`
pub async fn find_by_key(
    pool: &PgPool,
    kind: &str,
    version: &str,
) -> Result<Option<FileRecord>, sqlx::Error> {
    sqlx::query_as::<_, FileRecord>(
        r#"
        SELECT type AS kind, version, content, hash AS fingerprint, processed_at AS stored_at
        FROM file_data
        WHERE type = $1 AND version = $2
        "#,
    )
    .bind(kind)
    .bind(version)
    .fetch_optional(pool)
    .await
}

/// Insert a new record. Fails with a unique violation if the key already exists.
pub async fn insert(pool: &PgPool, p: &NewFileRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO file_data (type, version, content, hash, processed_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&p.kind)
    .bind(&p.version)
    .bind(&p.content)
    .bind(&p.fingerprint)
    .bind(p.stored_at)
    .execute(pool)
    .await?;
    Ok(())
}

