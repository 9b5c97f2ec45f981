use crate::record::{Column, Columns, Record};
use crate::{Store, StoreError, StoreErrorExt, engine_error};
use std::fmt::Write as _;
use tracing::{debug, instrument};

/// Marker thrown by a guarded update whose record changed since it was read.
pub(crate) const STALE_MARKER: &str = "fhub-stale";

/// Writes staged for one transaction.
///
/// Nothing reaches the engine until [`Batch::commit`], which sends every
/// statement inside one `BEGIN`/`COMMIT` block: a failing statement (unique
/// index hit, stale guard) cancels all of them.
#[derive(Debug)]
#[must_use = "a batch does nothing until committed"]
pub struct Batch {
    store: Store,
    statements: Vec<String>,
    binds: Vec<(String, String)>,
}

impl Batch {
    pub(crate) const fn new(store: Store) -> Self {
        Self { store, statements: Vec::new(), binds: Vec::new() }
    }

    /// Number of staged statements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.statements.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Inserts a new record; fails at commit when any unique column is taken.
    pub fn create<T: Record>(&mut self, record: &T) -> Result<&mut Self, StoreError> {
        let content = self.content(record)?;
        self.statements.push(format!("CREATE {} CONTENT {content};", T::TABLE));
        Ok(self)
    }

    /// Inserts or replaces a record regardless of its current body.
    pub fn put<T: Record>(&mut self, record: &T) -> Result<&mut Self, StoreError> {
        let key = self.bind(record.key().to_owned());
        let content = self.content(record)?;
        self.statements.push(format!(
            "DELETE {table} WHERE ident = {key}; CREATE {table} CONTENT {content};",
            table = T::TABLE
        ));
        Ok(self)
    }

    /// Replaces `previous` with `next`, guarded on the stored body still being `previous`.
    ///
    /// A concurrent writer that got there first makes the whole batch fail
    /// with [`StoreError::Stale`].
    pub fn update<T: Record>(&mut self, previous: &T, next: &T) -> Result<&mut Self, StoreError> {
        if previous.key() != next.key() {
            return Err(StoreError::Internal {
                message: format!("Key changed from {} to {}", previous.key(), next.key()).into(),
                context: Some(T::TABLE.into()),
            });
        }
        let key = self.bind(next.key().to_owned());
        let expected = self.bind(encode(previous)?);
        let body = self.bind(encode(next)?);

        let mut set = format!("body = {body}");
        let columns = next.columns();
        for column in [Column::Owner, Column::Parent, Column::Code, Column::Email] {
            let value = match column_value(&columns, column) {
                Some(value) => self.bind(value.to_owned()),
                None => "NONE".to_owned(),
            };
            let _ = write!(set, ", {} = {value}", column.as_str());
        }

        let hit = format!("$hit{}", self.statements.len());
        self.statements.push(format!(
            "LET {hit} = (UPDATE {table} SET {set} WHERE ident = {key} AND body = {expected} \
             RETURN VALUE ident); IF array::len({hit}) = 0 {{ THROW \"{STALE_MARKER}\" }};",
            table = T::TABLE
        ));
        Ok(self)
    }

    /// Removes the record stored under `key`, if any.
    pub fn delete<T: Record>(&mut self, key: &str) -> &mut Self {
        let key = self.bind(key.to_owned());
        self.statements.push(format!("DELETE {} WHERE ident = {key};", T::TABLE));
        self
    }

    /// Applies every staged write atomically.
    ///
    /// # Errors
    /// * [`StoreError::Duplicate`] when a unique column is already taken.
    /// * [`StoreError::Stale`] when a guarded update lost a race.
    /// * [`StoreError::Surreal`] for any other engine failure.
    #[instrument(skip(self), fields(statements = self.statements.len()))]
    pub async fn commit(self) -> Result<(), StoreError> {
        if self.statements.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "BEGIN TRANSACTION;\n{}\nCOMMIT TRANSACTION;",
            self.statements.join("\n")
        );
        let mut query = self.store.query(sql);
        for (name, value) in self.binds {
            query = query.bind((name, value));
        }
        query
            .await
            .context("Sending batch")?
            .check()
            .map_err(|e| engine_error(surrealdb::Error::from(e)))?;

        debug!("Batch committed");
        Ok(())
    }

    fn bind(&mut self, value: String) -> String {
        let name = format!("p{}", self.binds.len());
        let placeholder = format!("${name}");
        self.binds.push((name, value));
        placeholder
    }

    fn content<T: Record>(&mut self, record: &T) -> Result<String, StoreError> {
        let ident = self.bind(record.key().to_owned());
        let body = self.bind(encode(record)?);
        let mut content = format!("{{ ident: {ident}, body: {body}");
        for (column, value) in record.columns().iter() {
            let value = self.bind(value.to_owned());
            let _ = write!(content, ", {}: {value}", column.as_str());
        }
        content.push_str(" }");
        Ok(content)
    }
}

fn column_value(columns: &Columns, column: Column) -> Option<&str> {
    match column {
        Column::Ident => None,
        Column::Owner => columns.owner.as_deref(),
        Column::Parent => columns.parent.as_deref(),
        Column::Code => columns.code.as_deref(),
        Column::Email => columns.email.as_deref(),
    }
}

fn encode<T: Record>(record: &T) -> Result<String, StoreError> {
    serde_json::to_string(record).context(format!("Encoding {}", T::TABLE))
}
