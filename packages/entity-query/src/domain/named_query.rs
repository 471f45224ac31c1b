//! Named query builder
//!
//! A `NamedQuery` identifies a query by logical name, carries its parameters
//! and pagination window, and hands itself to the owning repository for
//! execution.
//!
//! # Examples
//!
//! ```rust,ignore
//! let users: Vec<User> = repository
//!     .create_named_query("User.findByStatus")?
//!     .add_parameter("status", "active")
//!     .set_first_result(20)?
//!     .set_max_results(10)?
//!     .list()?;
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::parameters::QueryParameters;
use super::repository::EntityRepository;
use crate::{RepositoryError, Result};

/// Named, parameterized, paginated query bound to a repository
///
/// Setters return `&mut Self` so calls chain. Executing does not consume or
/// lock the builder: it can be re-configured and executed again.
pub struct NamedQuery<'r, R> {
    repository: &'r R,
    query_name: String,
    /// Grown by `add_parameter`; active while `replaced` is `None`
    accumulated: QueryParameters,
    /// Set wholesale by `set_parameters`
    replaced: Option<QueryParameters>,
    first_result: usize,
    max_results: Option<usize>,
}

impl<'r, R> NamedQuery<'r, R> {
    /// Create a query named `query_name` owned by `repository`
    ///
    /// # Errors
    ///
    /// Returns a precondition error if `query_name` is empty or whitespace.
    pub fn new(repository: &'r R, query_name: impl Into<String>) -> Result<Self> {
        let query_name = query_name.into();
        if query_name.trim().is_empty() {
            return Err(RepositoryError::precondition(
                "query name must not be blank",
            ));
        }

        Ok(Self {
            repository,
            query_name,
            accumulated: QueryParameters::default(),
            replaced: None,
            first_result: 0,
            max_results: None,
        })
    }

    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    /// Currently active parameter set
    pub fn parameters(&self) -> &QueryParameters {
        self.replaced.as_ref().unwrap_or(&self.accumulated)
    }

    pub fn first_result(&self) -> usize {
        self.first_result
    }

    /// `None` until `set_max_results` is called
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    pub fn repository(&self) -> &'r R {
        self.repository
    }

    /// Replace the active parameter set wholesale
    ///
    /// Accepts a `QueryParameters`, `MapParameters`, `ArrayParameters`, an
    /// array or `Vec` of values (positional) or a `HashMap`/`BTreeMap` of
    /// name → value (keyed).
    pub fn set_parameters(&mut self, parameters: impl Into<QueryParameters>) -> &mut Self {
        self.replaced = Some(parameters.into());
        self
    }

    /// Add one keyed parameter and make the accumulated keyed set active
    ///
    /// Whatever was active before (positional or a replaced keyed set) is
    /// discarded, not merged.
    pub fn add_parameter(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.accumulated.add(key, value);
        self.replaced = None;
        self
    }

    /// Set the offset of the first row to return
    ///
    /// # Errors
    ///
    /// Precondition error if `first_result` is negative; state is unchanged.
    pub fn set_first_result(&mut self, first_result: i64) -> Result<&mut Self> {
        let first_result = usize::try_from(first_result).map_err(|_| {
            RepositoryError::precondition(format!(
                "first_result must be >= 0, got {}",
                first_result
            ))
        })?;
        self.first_result = first_result;
        Ok(self)
    }

    /// Set the maximum number of rows to return
    ///
    /// # Errors
    ///
    /// Precondition error if `max_results` is zero or negative; state is
    /// unchanged.
    pub fn set_max_results(&mut self, max_results: i64) -> Result<&mut Self> {
        let max_results = usize::try_from(max_results)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                RepositoryError::precondition(format!(
                    "max_results must be > 0, got {}",
                    max_results
                ))
            })?;
        self.max_results = Some(max_results);
        Ok(self)
    }

    /// Whether a pagination window other than "everything" is configured
    pub fn is_paged(&self) -> bool {
        self.first_result > 0 || self.max_results.is_some()
    }
}

impl<'r, R: EntityRepository> NamedQuery<'r, R> {
    /// Fetch all matching rows
    pub fn list<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        tracing::trace!(query = %self.query_name, "list");
        self.repository.find(self)
    }

    /// Fetch at most one matching row
    pub fn single_result<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        tracing::trace!(query = %self.query_name, "single_result");
        self.repository.get_single_result(self)
    }

    /// Run an update, returning the affected row count
    pub fn execute_update(&self) -> Result<usize> {
        tracing::trace!(query = %self.query_name, "execute_update");
        self.repository.execute_update(self)
    }
}

impl<R> fmt::Debug for NamedQuery<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedQuery")
            .field("query_name", &self.query_name)
            .field("parameters", self.parameters())
            .field("first_result", &self.first_result)
            .field("max_results", &self.max_results)
            .finish_non_exhaustive()
    }
}
