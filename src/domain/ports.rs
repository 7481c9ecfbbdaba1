use crate::domain::model::{CatalogueSlice, NamedRef, TypeName};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("pokedex-browser/", env!("CARGO_PKG_VERSION"));

/// Read-only view of the upstream Pokémon catalogue.
///
/// Every operation reports failure through `Result`; deciding what a failure
/// means for a page (empty candidates, sentinel id) is left to the caller.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// A window of the full catalogue in upstream order, plus its total size.
    async fn list_catalogue(&self, offset: usize, limit: usize) -> Result<CatalogueSlice>;

    /// All members of one type, in upstream order.
    async fn list_by_type(&self, type_name: &TypeName) -> Result<Vec<NamedRef>>;

    /// Numeric id of a listed entry.
    async fn resolve_id(&self, entry: &NamedRef) -> Result<u32>;

    /// Names of every type the upstream knows about.
    async fn list_types(&self) -> Result<Vec<String>>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn page_size(&self) -> usize;
    fn concurrent_requests(&self) -> usize;
    fn request_timeout(&self) -> Duration;

    fn user_agent(&self) -> &str {
        DEFAULT_USER_AGENT
    }
}
