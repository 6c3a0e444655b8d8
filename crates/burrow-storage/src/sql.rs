//! Helpers shared by the SQL backends.
//!
//! Timestamps are persisted as microseconds since the Unix epoch and clicks
//! as signed 64-bit integers.

use burrow_core::error::StorageError;
use burrow_core::repository::{Result, UrlRecord};
use burrow_core::shortcode::ShortCode;
use jiff::Timestamp;
use sqlx::{ColumnIndex, Decode, Row, Type};

/// The statements a backend runs, in its own placeholder syntax.
///
/// Bind order: `insert` (short_code, original_url, created_at) returning `id`;
/// `select` (short_code); `update` (original_url, clicks, last_accessed,
/// short_code); `delete` (short_code); `list` (limit, offset).
pub(crate) struct Statements {
    pub insert: &'static str,
    pub select: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    pub list: &'static str,
}

pub(crate) fn record_from_row<'r, R>(row: &'r R) -> Result<UrlRecord>
where
    R: Row,
    &'static str: ColumnIndex<R>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
    String: Decode<'r, R::Database> + Type<R::Database>,
{
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let last_accessed: Option<i64> = row.try_get("last_accessed").map_err(map_sqlx_error)?;
    let clicks: i64 = row.try_get("clicks").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;

    Ok(UrlRecord {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        short_code: ShortCode::new_unchecked(short_code),
        original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
        clicks: parse_clicks(clicks)?,
        created_at: parse_timestamp("created_at", created_at)?,
        last_accessed: last_accessed
            .map(|micros| parse_timestamp("last_accessed", micros))
            .transpose()?,
    })
}

/// `NotFound` when a keyed write touched no row.
pub(crate) fn expect_affected(rows_affected: u64, code: &ShortCode) -> Result<()> {
    if rows_affected == 0 {
        return Err(StorageError::NotFound(code.to_string()));
    }
    Ok(())
}

/// Implements `Repository` for a type with a `pool` field, running the
/// given [`Statements`].
macro_rules! impl_repository {
    ($repository:ty, $statements:expr) => {
        #[::async_trait::async_trait]
        impl ::burrow_core::repository::Repository for $repository {
            async fn create(
                &self,
                new_url: ::burrow_core::repository::NewUrl,
            ) -> ::burrow_core::repository::Result<::burrow_core::repository::UrlRecord> {
                let (created_micros, created_at) = $crate::sql::now_micros();

                let result = ::sqlx::query($statements.insert)
                    .bind(new_url.short_code.as_str())
                    .bind(new_url.original_url.as_str())
                    .bind(created_micros)
                    .fetch_one(&self.pool)
                    .await;

                match result {
                    Ok(row) => {
                        let id: i64 = ::sqlx::Row::try_get(&row, "id")
                            .map_err($crate::sql::map_sqlx_error)?;
                        Ok(new_url.into_record(id, created_at))
                    }
                    Err(err) if $crate::sql::is_unique_violation(&err) => {
                        ::tracing::debug!(code = %new_url.short_code, "short code already taken");
                        Err(::burrow_core::error::StorageError::AlreadyExists(
                            new_url.short_code.into_inner(),
                        ))
                    }
                    Err(err) => Err($crate::sql::map_sqlx_error(err)),
                }
            }

            async fn read(
                &self,
                code: &::burrow_core::shortcode::ShortCode,
            ) -> ::burrow_core::repository::Result<::burrow_core::repository::UrlRecord> {
                let row = ::sqlx::query($statements.select)
                    .bind(code.as_str())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err($crate::sql::map_sqlx_error)?;

                match row {
                    Some(row) => $crate::sql::record_from_row(&row),
                    None => Err(::burrow_core::error::StorageError::NotFound(
                        code.to_string(),
                    )),
                }
            }

            async fn update(
                &self,
                record: &::burrow_core::repository::UrlRecord,
            ) -> ::burrow_core::repository::Result<()> {
                let result = ::sqlx::query($statements.update)
                    .bind(record.original_url.as_str())
                    .bind($crate::sql::encode_clicks(record.clicks)?)
                    .bind(record.last_accessed.map(|ts| ts.as_microsecond()))
                    .bind(record.short_code.as_str())
                    .execute(&self.pool)
                    .await
                    .map_err($crate::sql::map_sqlx_error)?;

                $crate::sql::expect_affected(result.rows_affected(), &record.short_code)
            }

            async fn delete(
                &self,
                code: &::burrow_core::shortcode::ShortCode,
            ) -> ::burrow_core::repository::Result<()> {
                let result = ::sqlx::query($statements.delete)
                    .bind(code.as_str())
                    .execute(&self.pool)
                    .await
                    .map_err($crate::sql::map_sqlx_error)?;

                $crate::sql::expect_affected(result.rows_affected(), code)
            }

            async fn list(
                &self,
                limit: u64,
                offset: u64,
            ) -> ::burrow_core::repository::Result<Vec<::burrow_core::repository::UrlRecord>> {
                let rows = ::sqlx::query($statements.list)
                    .bind($crate::sql::page_bound(limit))
                    .bind($crate::sql::page_bound(offset))
                    .fetch_all(&self.pool)
                    .await
                    .map_err($crate::sql::map_sqlx_error)?;

                rows.iter().map(|row| $crate::sql::record_from_row(row)).collect()
            }

            async fn close(&self) -> ::burrow_core::repository::Result<()> {
                self.pool.close().await;
                Ok(())
            }
        }
    };
}

pub(crate) use impl_repository;

/// Current time truncated to the precision the SQL backends persist.
pub(crate) fn now_micros() -> (i64, Timestamp) {
    let micros = Timestamp::now().as_microsecond();
    // The value came from a valid timestamp, so it is in range.
    let ts = Timestamp::from_microsecond(micros).unwrap_or(Timestamp::UNIX_EPOCH);
    (micros, ts)
}

pub(crate) fn parse_timestamp(column: &str, micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{micros}': {e}"))
    })
}

pub(crate) fn parse_clicks(clicks: i64) -> Result<u64> {
    u64::try_from(clicks)
        .map_err(|_| StorageError::InvalidData(format!("negative click count '{clicks}'")))
}

pub(crate) fn encode_clicks(clicks: u64) -> Result<i64> {
    i64::try_from(clicks)
        .map_err(|_| StorageError::InvalidData(format!("click count '{clicks}' out of range")))
}

/// Clamps a page bound into the signed range SQL `LIMIT`/`OFFSET` accept.
pub(crate) fn page_bound(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}
