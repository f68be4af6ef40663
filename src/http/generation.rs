//! Routing generations.
//!
//! A generation pairs a compiled [`RoutingTable`] with the
//! [`ProxyRegistry`] built from the same config snapshot. Dispatch reads
//! exactly one generation per request, so a route can never be matched
//! against one config while its proxy comes from another.
//!
//! Generations are built off to the side and swapped in atomically; a build
//! failure leaves the previously active generation untouched.

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::proxy::registry::{ProxyRegistry, RegistryError};
use crate::routing::table::{BuildError, RoutingTable};

/// Why a generation could not be built.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Routing(#[from] BuildError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// One immutable routing + forwarding snapshot.
#[derive(Debug)]
pub struct RoutingGeneration {
    pub table: RoutingTable,
    pub proxies: ProxyRegistry,
}

impl RoutingGeneration {
    /// Compile a config snapshot into a generation, all-or-nothing.
    pub fn build(services: &[ServiceConfig]) -> Result<Self, GenerationError> {
        let table = RoutingTable::build(services)?;
        let proxies = ProxyRegistry::build(services)?;
        Ok(Self { table, proxies })
    }
}
