use anyhow::Context;
use rusqlite::Connection;
use serde::Deserialize;
use std::{path::Path, time::Duration};

use crate::error::Result;

/// Schema definition for the SQLite database
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    /// Schema holding only the `product` table.
    pub fn product() -> Self {
        Self::new().add_table(
            TableDefinition::new("product")
                .with_column(ColumnDefinition::new("id", DataType::Integer).with_constraints([
                    ColumnConstraint::PrimaryKey,
                    ColumnConstraint::AutoIncrement,
                ]))
                .with_column(
                    ColumnDefinition::new("name", DataType::Text)
                        .with_constraints([ColumnConstraint::NotNull]),
                )
                .with_column(
                    ColumnDefinition::new("price", DataType::Real)
                        .with_constraints([ColumnConstraint::NotNull]),
                ),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this table
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(ColumnDefinition::to_sql)
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({});", self.name, columns)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraints(mut self, constraints: impl IntoIterator<Item = ColumnConstraint>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.data_type.as_sql());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.as_sql());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Integer,
    Text,
    Real,
    Blob,
}

impl DataType {
    fn as_sql(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Real => "REAL",
            DataType::Blob => "BLOB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnConstraint {
    PrimaryKey,
    /// Only valid after `PrimaryKey` on an `Integer` column.
    AutoIncrement,
    NotNull,
    Unique,
}

impl ColumnConstraint {
    fn as_sql(self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::AutoIncrement => "AUTOINCREMENT",
            ColumnConstraint::NotNull => "NOT NULL",
            ColumnConstraint::Unique => "UNIQUE",
        }
    }
}

/// SQLite connection configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Path to the SQLite database file
    pub db_path: String,
    /// How long a connection waits on a locked database before failing
    pub busy_timeout_ms: u64,
    /// Enable `PRAGMA foreign_keys` on every connection
    pub foreign_keys: bool,
    /// Schema definition for the database
    #[serde(skip)]
    pub schema: Schema,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            db_path: "./products.db".to_string(),
            busy_timeout_ms: 5_000,
            foreign_keys: true,
            schema: Schema::product(),
        }
    }
}

impl SqliteConfig {
    /// Create a new SQLite config with path and schema
    pub fn new(db_path: impl Into<String>, schema: Schema) -> Self {
        Self {
            db_path: db_path.into(),
            schema,
            ..Self::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("invalid sqlite configuration")
    }

    /// Read the configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }
}

/// Source of scoped connections.
///
/// Every call must hand out a connection that no other caller holds; the
/// caller drops it when its operation returns.
pub trait ConnectionProvider {
    fn connection(&self) -> Result<Connection>;
}

impl<F> ConnectionProvider for F
where
    F: Fn() -> Result<Connection>,
{
    fn connection(&self) -> Result<Connection> {
        self()
    }
}

/// Opens a fresh connection to the configured database file per call.
#[derive(Debug, Clone)]
pub struct SqliteConnectionManager {
    config: SqliteConfig,
}

impl SqliteConnectionManager {
    pub fn new(config: SqliteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqliteConfig {
        &self.config
    }

    /// Create every table of the configured schema that does not exist yet.
    pub fn initialize_schema(&self) -> Result<()> {
        let conn = self.connection()?;
        for table in &self.config.schema.tables {
            tracing::debug!(table = %table.name, "creating table if missing");
            conn.execute_batch(&table.create_sql())?;
        }
        Ok(())
    }
}

impl ConnectionProvider for SqliteConnectionManager {
    fn connection(&self) -> Result<Connection> {
        tracing::trace!(path = %self.config.db_path, "opening sqlite connection");
        let conn = Connection::open(&self.config.db_path)?;
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", self.config.foreign_keys)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_table_sql() {
        let schema = Schema::product();
        assert_eq!(schema.tables.len(), 1);
        assert_eq!(
            schema.tables[0].create_sql(),
            "CREATE TABLE IF NOT EXISTS product (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             name TEXT NOT NULL, price REAL NOT NULL);"
        );
    }

    #[test]
    fn config_from_toml_fills_defaults() {
        let config = SqliteConfig::from_toml_str("db_path = \"/tmp/shop.db\"\n").unwrap();
        assert_eq!(config.db_path, "/tmp/shop.db");
        assert_eq!(config.busy_timeout_ms, 5_000);
        assert!(config.foreign_keys);
        assert_eq!(config.schema, Schema::product());
    }

    #[test]
    fn config_rejects_wrong_types() {
        assert!(SqliteConfig::from_toml_str("busy_timeout_ms = \"soon\"\n").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SqliteConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn closures_are_providers() {
        let provider = || -> Result<Connection> { Ok(Connection::open_in_memory()?) };
        let conn = provider.connection().unwrap();
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0)).unwrap();
        assert_eq!(one, 1);
    }
}
