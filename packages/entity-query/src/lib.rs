//! entity-query - Named, parameterized queries over an entity repository
//!
//! A [`NamedQuery`] names a query registered elsewhere, carries keyed or
//! positional parameters and a pagination window, and is executed by an
//! [`EntityRepository`] in one of three modes: list, single result, update.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use entity_query::{EntityRepository, QueryCatalog, SqliteEntityRepository};
//!
//! let catalog = QueryCatalog::from_yaml_file("queries.yaml")?;
//! let repository = SqliteEntityRepository::open("app.db", catalog)?;
//!
//! // Keyed parameters, second page of ten
//! let users: Vec<User> = repository
//!     .create_named_query("User.findByStatus")?
//!     .add_parameter("status", "active")
//!     .set_first_result(10)?
//!     .set_max_results(10)?
//!     .list()?;
//!
//! // Positional parameters
//! let renamed = repository
//!     .create_named_query("User.rename")?
//!     .set_parameters(["bob", "42"])
//!     .execute_update()?;
//! ```

pub mod config;
pub mod domain;
pub mod error;

#[cfg(feature = "sqlite")]
pub mod infrastructure;

pub use config::QueryCatalog;
pub use error::{ErrorKind, RepositoryError, Result};

pub use domain::{ArrayParameters, EntityRepository, MapParameters, NamedQuery, QueryParameters};

#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteEntityRepository;
