//! Port trait: EntityRepository

use serde::de::DeserializeOwned;

use super::named_query::NamedQuery;
use crate::Result;

/// Persistence port that executes named queries
///
/// Implementations resolve the query name to backend query text, bind the
/// active [`QueryParameters`](super::QueryParameters), honor the pagination
/// window and map rows to `T`.
///
/// # Implementations
///
/// - `SqliteEntityRepository` (feature `sqlite`)
///
/// # Examples
///
/// ```rust,ignore
/// let mut query = repository.create_named_query("Order.byCustomer")?;
/// query.set_parameters([42]).set_max_results(5)?;
/// let orders: Vec<Order> = query.list()?;
/// ```
pub trait EntityRepository: Sized {
    /// Fetch all rows matching `query` within its pagination window
    fn find<T: DeserializeOwned>(&self, query: &NamedQuery<'_, Self>) -> Result<Vec<T>>;

    /// Fetch at most one row
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::NonUniqueResult` if more than one row matches.
    fn get_single_result<T: DeserializeOwned>(
        &self,
        query: &NamedQuery<'_, Self>,
    ) -> Result<Option<T>>;

    /// Execute an update/delete/insert, returning the affected row count
    ///
    /// Pagination bounds do not apply to updates.
    fn execute_update(&self, query: &NamedQuery<'_, Self>) -> Result<usize>;

    /// Start a named query owned by this repository
    fn create_named_query(&self, query_name: impl Into<String>) -> Result<NamedQuery<'_, Self>> {
        NamedQuery::new(self, query_name)
    }
}
