//! # Record Store
//!
//! Shared persistent state of the forwarding workflow, kept in
//! [SurrealDB](https://surrealdb.com) through the `any` engine: `mem://` for
//! tests and throwaway runs, `rocksdb://` (feature `storage-rocksdb`) or a
//! remote `ws://`/`http://` server for everything else.
//!
//! Every record is one row holding its key (`ident`), its JSON body and the
//! few columns other records are looked up by. Unique indexes on `ident`,
//! codes and emails are defined at startup.
//!
//! Reads go straight to the engine. Writes are staged on a [`Batch`] and
//! committed as one transaction, with guarded updates that fail the batch
//! when a record changed after it was read.
//!
//! ## Example
//!
//! ```rust
//! use fhub_store::{Store, StoreError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), StoreError> {
//!     let store = Store::builder().url("mem://").session("fhub", "main").init().await?;
//!     let batch = store.batch();
//!     assert!(batch.is_empty());
//!     batch.commit().await?;
//!     Ok(())
//! }
//! ```

mod batch;
mod error;
mod record;
mod schema;

pub use batch::Batch;
pub use error::{StoreError, StoreErrorExt};
pub use record::{Column, Columns, MAINTENANCE_KEY, Record};

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use surrealdb::Surreal;
use surrealdb::engine::any::{Any, connect};
use surrealdb::opt::auth::Root;
use tracing::{info, instrument, warn};

#[derive(Debug)]
struct StoreInner {
    instance: Surreal<Any>,
    ns: String,
    db: String,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        info!(ns = %self.ns, db = %self.db, "Record store handle dropped");
    }
}

/// Cheaply cloneable handle to the record store.
#[derive(Debug, Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Creates a new [`StoreBuilder`].
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// A fresh, empty `mem://` store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::builder().url("mem://").session("fhub", "main").init().await
    }

    /// Starts a write batch.
    pub fn batch(&self) -> Batch {
        Batch::new(self.clone())
    }

    /// The record stored under `key`.
    pub async fn get<T: Record>(&self, key: &str) -> Result<Option<T>, StoreError> {
        self.find_by(Column::Ident, key).await
    }

    /// The first record whose `column` equals `value`.
    pub async fn find_by<T: Record>(
        &self,
        column: Column,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        Ok(self.list_by(column, value).await?.into_iter().next())
    }

    /// Every record of the table, ordered by key.
    pub async fn list<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let sql = format!("SELECT VALUE body FROM {}", T::TABLE);
        self.bodies(sql, None).await
    }

    /// Records whose `column` equals `value`, ordered by key.
    pub async fn list_by<T: Record>(
        &self,
        column: Column,
        value: &str,
    ) -> Result<Vec<T>, StoreError> {
        let sql =
            format!("SELECT VALUE body FROM {} WHERE {} = $needle", T::TABLE, column.as_str());
        self.bodies(sql, Some(value.to_owned())).await
    }

    async fn bodies<T: Record>(
        &self,
        sql: String,
        needle: Option<String>,
    ) -> Result<Vec<T>, StoreError> {
        let mut query = self.query(sql);
        if let Some(needle) = needle {
            query = query.bind(("needle", needle));
        }
        let bodies = query
            .await
            .context(format!("Reading {}", T::TABLE))?
            .take::<Vec<String>>(0)
            .context(format!("Reading {}", T::TABLE))?;

        let mut records = bodies
            .iter()
            .map(|body| serde_json::from_str::<T>(body))
            .collect::<Result<Vec<_>, _>>()
            .context(format!("Decoding {}", T::TABLE))?;
        records.sort_by(|a, b| a.key().cmp(b.key()));
        Ok(records)
    }
}

impl Deref for Store {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.inner.instance
    }
}

/// Maps a failed transaction to the error the caller can act on.
pub(crate) fn engine_error(source: surrealdb::Error) -> StoreError {
    let text = source.to_string();
    if text.contains(batch::STALE_MARKER) {
        return StoreError::Stale { message: "Record changed concurrently".into(), context: None };
    }
    if text.contains("already contains")
        && let Some(index) = text.split('`').nth(1)
    {
        return StoreError::Duplicate {
            field: schema::column_of(index).to_owned().into(),
            message: text.into(),
            context: None,
        };
    }
    StoreError::Surreal { source, context: Some("Committing batch".into()) }
}

/// A fluent builder for the [`Store`].
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct StoreBuilder {
    url: Option<String>,
    ns: Option<String>,
    db: Option<String>,
    auth: Option<(String, String)>,
}

impl StoreBuilder {
    /// Sets the connection URL (`mem://`, `rocksdb://path`, `ws://host`).
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the namespace and database name.
    pub fn session(mut self, namespace: impl Into<String>, database: impl Into<String>) -> Self {
        self.ns = Some(namespace.into());
        self.db = Some(database.into());
        self
    }

    /// Root credentials, needed for remote servers.
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some((username.into(), password.into()));
        self
    }

    /// Connects, waits for the engine to report healthy and applies the schema.
    ///
    /// # Errors
    /// * [`StoreError::Validation`] if the URL, namespace or database is missing.
    /// * [`StoreError::Connection`] if the engine fails to start or stays unhealthy.
    /// * [`StoreError::Auth`] if the credentials are rejected.
    /// * [`StoreError::Surreal`] if session activation or the schema fails.
    #[instrument(skip(self), fields(url = self.url, ns = self.ns, db = self.db))]
    pub async fn init(self) -> Result<Store, StoreError> {
        let url = self
            .url
            .ok_or(StoreError::Validation { message: "URL is required".into(), context: None })?;
        let ns = self.ns.ok_or(StoreError::Validation {
            message: "Namespace is required".into(),
            context: None,
        })?;
        let db = self.db.ok_or(StoreError::Validation {
            message: "Database is required".into(),
            context: None,
        })?;

        let instance = connect(&url).await.map_err(|e| StoreError::Connection {
            message: e.to_string().into(),
            context: Some("Initializing engine".into()),
        })?;

        let mut delay = Duration::from_millis(500);
        for attempt in 1..=3 {
            if instance.health().await.is_ok() {
                break;
            }
            if attempt == 3 {
                return Err(StoreError::Connection {
                    message: "Unhealthy after retries".into(),
                    context: Some(url.into()),
                });
            }
            warn!(attempt, ?delay, "Store engine not ready, retrying");
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        if let Some((username, password)) = self.auth {
            instance.signin(Root { username, password }).await.map_err(|e| StoreError::Auth {
                message: e.to_string().into(),
                context: Some(url.into()),
            })?;
        }

        instance.use_ns(&ns).use_db(&db).await.context("Activating session")?;

        instance
            .query(schema::script())
            .await
            .context("Applying schema")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Applying schema")?;

        let version =
            instance.version().await.map_or_else(|_| "unknown".to_owned(), |v| v.to_string());
        info!(namespace = %ns, database = %db, %version, "Record store ready");

        Ok(Store { inner: Arc::new(StoreInner { instance, ns, db }) })
    }
}
