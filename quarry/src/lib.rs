//! Fluent request building and cursor pagination for Elasticsearch-style
//! search backends.
//!
//! The crate composes the engine's JSON query protocol from typed nodes and
//! reshapes what comes back into pages a caller can resume from.
//!
//! - [`query`], [`aggregation`] and [`sort`] hold the node types and their
//!   factory functions.
//! - [`SearchSourceBuilder`] assembles nodes into an immutable [`SearchBody`].
//! - [`Session`] accumulates clauses across calls, executes them against a
//!   [`SearchBackend`] and returns `{list, total, paginator}` pages with an
//!   opaque keyset cursor.
//! - [`Repository`] wraps document and index calls for an [`Indexable`] entity.
//!
//! Transport is not part of this crate. Callers implement the traits in
//! [`backend`] over the client of their choice and pass it in by reference.
//!
//! # Example
//!
//! ```ignore
//! use quarry::query::{range, term};
//! use quarry::Session;
//!
//! let mut session = Session::new(&client, "flats");
//! session
//!     .must(term("status", "active"))
//!     .filter(range("age").gte(18))
//!     .page(2, Some(10));
//! let page = session.execute().await?.fetch()?;
//! ```

pub mod aggregation;
pub mod backend;
pub mod config;
pub mod cursor;
pub mod error;
pub mod filters;
pub mod geo;
pub mod indexable;
pub mod query;
pub mod request;
pub mod response;
pub mod session;
pub mod sort;
pub mod source;

pub use aggregation::{Aggregation, SubAggregations};
pub use backend::{Backend, DocumentBackend, IndicesBackend, SearchBackend};
pub use config::{Config, FilterConfig, SessionConfig, SourceConfig};
pub use error::{BackendError, Error};
pub use filters::apply_filters;
pub use geo::{Distance, DistanceUnit, GeoPoint};
pub use indexable::{Indexable, Repository};
pub use query::Query;
pub use response::{AggregationPage, Fetched, Paginator, SearchPage};
pub use session::{ExecutedRequest, Session, SessionState};
pub use sort::{Sort, SortOrder};
pub use source::{SearchBody, SearchSourceBuilder};

/// Result type for request building and execution
pub type Result<T> = std::result::Result<T, Error>;
