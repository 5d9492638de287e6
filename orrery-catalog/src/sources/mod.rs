//! Catalog sources.
//!
//! A [`CatalogSource`] hands back the raw model list of one provider. The
//! controller normalizes whatever it returns through the
//! [`ProviderRegistry`](crate::registry::ProviderRegistry).
//!
//! - [`MockSource`] serves a fixed fixture list after a simulated delay
//! - [`LiveSource`] issues one authenticated GET to a provider's list endpoint

mod live;
mod mock;

use async_trait::async_trait;

pub use live::LiveSource;
pub use mock::{MockSource, fixture_models};

use crate::error::SourceError;
use crate::types::RawModel;

/// A pluggable provider of raw model-list data.
///
/// # Example Implementation
///
/// ```ignore
/// use async_trait::async_trait;
/// use orrery_catalog::sources::CatalogSource;
/// use orrery_catalog::{RawModel, SourceError};
///
/// struct Static;
///
/// #[async_trait]
/// impl CatalogSource for Static {
///     fn id(&self) -> &str {
///         "static"
///     }
///
///     fn provider_id(&self) -> &str {
///         "openai"
///     }
///
///     async fn fetch(&self) -> Result<Vec<RawModel>, SourceError> {
///         Ok(vec![RawModel::new("gpt-4o")])
///     }
/// }
/// ```
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Identifier the controller selects this source by.
    fn id(&self) -> &str;

    /// Provider whose schema and rules apply to the returned records.
    fn provider_id(&self) -> &str;

    /// Whether `fetch` needs a stored credential.
    fn requires_credential(&self) -> bool {
        false
    }

    /// Whether a usable credential is available right now.
    ///
    /// Always true for sources that need none.
    fn credential_ready(&self) -> bool {
        true
    }

    /// Fetch the complete raw model list in one call.
    async fn fetch(&self) -> Result<Vec<RawModel>, SourceError>;
}
