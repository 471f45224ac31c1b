//! Domain layer
//!
//! # Domain Models
//!
//! - `NamedQuery`: fluent builder for a named, parameterized, paginated query
//! - `QueryParameters`: active parameter set (`Keyed` or `Positional`)
//! - `MapParameters` / `ArrayParameters`: the two parameter set shapes
//!
//! # Port Trait
//!
//! - `EntityRepository`: executes named queries

mod named_query;
mod parameters;
mod repository;

pub use named_query::NamedQuery;
pub use parameters::{ArrayParameters, MapParameters, QueryParameters};
pub use repository::EntityRepository;
