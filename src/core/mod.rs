pub mod pagination;
pub mod selection;

pub use crate::domain::model::{FilterSelection, Page, PokemonSummary};
pub use crate::domain::ports::{ConfigProvider, UpstreamSource};
pub use crate::utils::error::Result;
