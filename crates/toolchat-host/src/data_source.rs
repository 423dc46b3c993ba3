//! Data sources the SQL tool can query

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;
use thiserror::Error;
use toolchat_core::logging::Logger;

pub const DEFAULT_DATABASE_PATH: &str = "datasources/databases/demo-database.db";

/// Result rows, each a list of column values in select order
pub type Rows = Vec<Vec<Value>>;

#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("Database path does not exist: {}", .0.display())]
    MissingDatabase(PathBuf),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("query task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Execute `sql` verbatim and return every row
    async fn execute(&self, sql: &str) -> Result<Rows, DataSourceError>;

    /// Short human-readable description, for logs
    fn describe(&self) -> String;
}

/// A SQLite database file
///
/// Each query opens its own connection; nothing is held between calls.
pub struct SqliteDataSource {
    path: PathBuf,
    logger: Arc<dyn Logger>,
}

impl SqliteDataSource {
    pub fn new(path: impl Into<PathBuf>, logger: Arc<dyn Logger>) -> Self {
        Self {
            path: path.into(),
            logger,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(bytes.iter().map(|b| format!("{:02x}", b)).collect()),
    }
}

fn run_query(path: &Path, sql: &str) -> Result<Rows, DataSourceError> {
    let connection = Connection::open(path)?;
    let mut statement = connection.prepare(sql)?;
    let columns = statement.column_count();

    let mut rows = statement.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns);
        for i in 0..columns {
            values.push(column_value(row.get_ref(i)?));
        }
        out.push(values);
    }
    Ok(out)
}

#[async_trait]
impl DataSource for SqliteDataSource {
    async fn execute(&self, sql: &str) -> Result<Rows, DataSourceError> {
        self.logger.debug(&format!("[SqliteDataSource] executing query: {}", sql));

        // Connection::open would silently create an empty database
        if !self.path.exists() {
            self.logger.error(&format!(
                "[SqliteDataSource] Database path does not exist: {}",
                self.path.display()
            ));
            return Err(DataSourceError::MissingDatabase(self.path.clone()));
        }

        let path = self.path.clone();
        let sql = sql.to_string();
        let rows = tokio::task::spawn_blocking(move || run_query(&path, &sql)).await??;

        self.logger.info(&format!("[SqliteDataSource] query returned {} rows", rows.len()));
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("SqliteDataSource(database_path='{}')", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use toolchat_core::logging::NoOpLogger;

    fn seeded(dir: &TempDir) -> SqliteDataSource {
        let path = dir.path().join("demo.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, score REAL, avatar BLOB);
             INSERT INTO users (name, score, avatar) VALUES ('ada', 9.5, x'CAFE');
             INSERT INTO users (name, score, avatar) VALUES ('linus', NULL, NULL);",
        )
        .unwrap();
        SqliteDataSource::new(path, Arc::new(NoOpLogger))
    }

    #[tokio::test]
    async fn test_select_rows() {
        let dir = TempDir::new().unwrap();
        let ds = seeded(&dir);

        let rows = ds.execute("SELECT id, name, score, avatar FROM users ORDER BY id").await.unwrap();

        assert_eq!(
            rows,
            vec![
                vec![json!(1), json!("ada"), json!(9.5), json!("cafe")],
                vec![json!(2), json!("linus"), Value::Null, Value::Null],
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_result() {
        let dir = TempDir::new().unwrap();
        let rows = seeded(&dir)
            .execute("SELECT * FROM users WHERE name = 'nobody'")
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.db");
        let ds = SqliteDataSource::new(&path, Arc::new(NoOpLogger));

        let err = ds.execute("SELECT 1").await.unwrap_err();

        assert!(matches!(err, DataSourceError::MissingDatabase(_)));
        assert_eq!(err.to_string(), format!("Database path does not exist: {}", path.display()));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_bad_sql() {
        let dir = TempDir::new().unwrap();
        let err = seeded(&dir).execute("SELEC nonsense").await.unwrap_err();
        assert!(matches!(err, DataSourceError::Sqlite(_)));
    }

    #[tokio::test]
    async fn test_write_statement() {
        let dir = TempDir::new().unwrap();
        let ds = seeded(&dir);
        let rows = ds.execute("INSERT INTO users (name) VALUES ('grace')").await.unwrap();
        assert!(rows.is_empty());

        let count = ds.execute("SELECT COUNT(*) FROM users").await.unwrap();
        assert_eq!(count, vec![vec![json!(3)]]);
    }
}
