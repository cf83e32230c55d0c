//! DATAGATE client: the data-access layer.
//!
//! [`DataAccess`] is the entry point. Each call resolves the section's
//! adapter and endpoint; sections with a remote endpoint go through the
//! [`Transport`], all others are served from local fixtures by the filter
//! engine.

pub mod adapter;
pub mod cli;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod facade;
pub mod fixtures;
pub mod pagination;
pub mod transport;

pub use adapter::{
    AdapterContext, AdapterRegistry, ClientPagedAdapter, DefaultAdapter, QueryStringAdapter,
    SearchRoute, SectionAdapter, TokenPagedAdapter,
};
pub use endpoint::{join_url, EndpointResolver};
pub use error::{DataAccessError, DataAccessResult, ErrorKind};
pub use facade::DataAccess;
pub use fixtures::{DirectoryFixtures, FixtureSource, StaticFixtures};
pub use transport::{with_timeout, HttpTransport, Transport};
