//! SQLite adapter for EntityRepository
//!
//! Query names resolve through a [`QueryCatalog`]. Paged finds wrap the
//! catalog SQL as `SELECT * FROM (<sql>) LIMIT <n> OFFSET <m>`, so catalog
//! entries stay free of pagination clauses. Result columns must have distinct
//! names; alias repeated ones (`SELECT a.id AS a_id, b.id AS b_id ...`).

mod convert;

use std::path::Path;

use rusqlite::Connection;
use serde::de::DeserializeOwned;

use self::convert::{
    bind_parameters, decode_record, ensure_distinct_columns, from_sql_value, Record,
};
use crate::config::QueryCatalog;
use crate::domain::{EntityRepository, NamedQuery};
use crate::{RepositoryError, Result};

/// `EntityRepository` over a single SQLite connection
pub struct SqliteEntityRepository {
    conn: Connection,
    catalog: QueryCatalog,
}

impl SqliteEntityRepository {
    pub fn new(conn: Connection, catalog: QueryCatalog) -> Self {
        Self { conn, catalog }
    }

    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>, catalog: QueryCatalog) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::new(conn, catalog))
    }

    pub fn open_in_memory(catalog: QueryCatalog) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::new(conn, catalog))
    }

    /// Underlying connection, e.g. for schema setup
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    /// Run a row-returning query within `[first_result, first_result + limit)`
    fn fetch(&self, query: &NamedQuery<'_, Self>, limit: Option<usize>) -> Result<Vec<Record>> {
        let sql = self.catalog.resolve(query.query_name())?;
        let windowed = query.first_result() > 0 || limit.is_some();

        let mut stmt = self.conn.prepare(&paged_sql(sql, query.first_result(), limit))?;
        bind_parameters(&mut stmt, query.parameters())?;

        // The paging wrapper renames repeated columns (`id`, `id:1`), so names
        // always come from the catalog statement itself
        let columns: Vec<String> = if windowed {
            self.conn
                .prepare(&paged_sql(sql, 0, None))?
                .column_names()
                .into_iter()
                .map(String::from)
                .collect()
        } else {
            stmt.column_names().into_iter().map(String::from).collect()
        };
        ensure_distinct_columns(query.query_name(), &columns)?;

        let mut rows = stmt.raw_query();
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Vec::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                record.push((name.clone(), from_sql_value(row.get_ref(idx)?)));
            }
            records.push(record);
        }

        tracing::debug!(
            query = query.query_name(),
            parameters = query.parameters().kind(),
            first_result = query.first_result(),
            limit = ?limit,
            rows = records.len(),
            "fetched named query"
        );
        Ok(records)
    }
}

impl EntityRepository for SqliteEntityRepository {
    fn find<T: DeserializeOwned>(&self, query: &NamedQuery<'_, Self>) -> Result<Vec<T>> {
        self.fetch(query, query.max_results())?
            .into_iter()
            .map(decode_record)
            .collect()
    }

    fn get_single_result<T: DeserializeOwned>(
        &self,
        query: &NamedQuery<'_, Self>,
    ) -> Result<Option<T>> {
        // Two rows are enough to detect ambiguity
        let limit = query.max_results().map_or(2, |max| max.min(2));
        let mut records = self.fetch(query, Some(limit))?;

        match records.len() {
            0 => Ok(None),
            1 => decode_record(records.remove(0)).map(Some),
            n => Err(RepositoryError::non_unique_result(query.query_name(), n)),
        }
    }

    fn execute_update(&self, query: &NamedQuery<'_, Self>) -> Result<usize> {
        let sql = self.catalog.resolve(query.query_name())?;

        let mut stmt = self.conn.prepare(sql)?;
        bind_parameters(&mut stmt, query.parameters())?;
        let affected = stmt.raw_execute()?;

        tracing::debug!(
            query = query.query_name(),
            parameters = query.parameters().kind(),
            affected,
            "executed named update"
        );
        Ok(affected)
    }
}

/// Apply a pagination window to catalog SQL
fn paged_sql(sql: &str, first_result: usize, limit: Option<usize>) -> String {
    let sql = sql.trim().trim_end_matches(';').trim_end();
    if first_result == 0 && limit.is_none() {
        return sql.to_string();
    }

    // SQLite treats a negative LIMIT as unbounded. The catalog SQL sits on its
    // own lines so a trailing `--` comment cannot swallow the closing paren.
    let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
    format!(
        "SELECT * FROM (\n{}\n) LIMIT {} OFFSET {}",
        sql, limit, first_result
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    // ═══════════════════════════════════════════════════════════════════════
    // Paging Wrapper Tests
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn test_paged_sql_unpaged() {
        assert_eq!(paged_sql("SELECT 1;  ", 0, None), "SELECT 1");
    }

    #[test]
    fn test_paged_sql_window() {
        assert_eq!(
            paged_sql("SELECT * FROM t", 10, Some(5)),
            "SELECT * FROM (\nSELECT * FROM t\n) LIMIT 5 OFFSET 10"
        );
        assert_eq!(
            paged_sql("SELECT * FROM t;", 3, None),
            "SELECT * FROM (\nSELECT * FROM t\n) LIMIT -1 OFFSET 3"
        );
    }

    #[test]
    fn test_paged_sql_trailing_line_comment() {
        let paged = paged_sql("SELECT id FROM t -- every row", 0, Some(1));
        assert_eq!(
            paged,
            "SELECT * FROM (\nSELECT id FROM t -- every row\n) LIMIT 1 OFFSET 0"
        );
        assert!(paged.lines().any(|line| line.starts_with(") LIMIT")));
    }
}
