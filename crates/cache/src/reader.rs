use crate::db::open_read_only;
use crate::error::{ErrorKind, Result};
use crate::models::{CacheRef, RefRow};
use exn::ResultExt;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::instrument;

// Well below SQLite's default limit on bound parameters.
const BATCH_SIZE: usize = 500;

/// Read-only lookups over a docset's content cache (`refs` and `metadata`).
///
/// The cache is a cold, pre-built index: every `uuid` maps to exactly one
/// [`CacheRef`] for the lifetime of the docset, so results may be cached by
/// callers. Nothing is ever written through this type.
#[derive(Debug, Clone)]
pub struct CacheReader {
    pool: SqlitePool,
}
impl CacheReader {
    /// Open the cache database at `path`.
    ///
    /// Fails with [`ErrorKind::NotFound`] when the file is missing and
    /// [`ErrorKind::Database`] when it is not a readable SQLite database.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self { pool: open_read_only(path).await? })
    }

    /// Wrap an already-open pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve one content identifier. An unknown `uuid` is `Ok(None)`.
    pub async fn get(&self, uuid: impl AsRef<str>) -> Result<Option<CacheRef>> {
        let row: Option<RefRow> = sqlx::query_as(include_str!("../queries/get_ref.sql"))
            .bind(uuid.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(CacheRef::try_from).transpose()
    }

    /// Resolve many identifiers at once.
    ///
    /// Identifiers without a row are left out of the result; a partial map
    /// is a normal outcome.
    #[instrument(level = "debug", skip_all, fields(requested = tracing::field::Empty))]
    pub async fn get_many<I, S>(&self, uuids: I) -> Result<HashMap<String, CacheRef>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let uuids: BTreeSet<String> = uuids.into_iter().map(|u| u.as_ref().to_string()).collect();
        tracing::Span::current().record("requested", uuids.len());
        let uuids: Vec<String> = uuids.into_iter().collect();
        let mut found = HashMap::with_capacity(uuids.len());
        for batch in uuids.chunks(BATCH_SIZE) {
            let mut query: QueryBuilder<'_, Sqlite> =
                QueryBuilder::new(r#"SELECT uuid, data_id, "offset", "length" FROM refs WHERE uuid IN ("#);
            let mut separated = query.separated(", ");
            for uuid in batch {
                separated.push_bind(uuid);
            }
            separated.push_unseparated(")");
            let rows: Vec<RefRow> =
                query.build_query_as().fetch_all(&self.pool).await.or_raise(|| ErrorKind::Database)?;
            for row in rows {
                let cache_ref = CacheRef::try_from(row)?;
                found.insert(cache_ref.uuid.clone(), cache_ref);
            }
        }
        Ok(found)
    }

    /// Whether `uuid` has a row, without decoding it.
    pub async fn exists(&self, uuid: impl AsRef<str>) -> Result<bool> {
        sqlx::query_scalar(include_str!("../queries/ref_exists.sql"))
            .bind(uuid.as_ref())
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Every distinct blob identifier referenced by the cache, ascending.
    pub async fn list_blob_ids(&self) -> Result<Vec<i64>> {
        sqlx::query_scalar(include_str!("../queries/list_blob_ids.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Number of references pointing into blob `data_id`.
    pub async fn count_refs(&self, data_id: i64) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_refs.sql"))
            .bind(data_id)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }

    pub async fn get_metadata(&self, key: impl AsRef<str>) -> Result<Option<String>> {
        let value: Option<Option<String>> = sqlx::query_scalar(include_str!("../queries/get_metadata.sql"))
            .bind(key.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(value.flatten())
    }

    /// Release the underlying connections. Safe to call more than once.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}
