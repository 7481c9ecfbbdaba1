pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::PokeApiClient;
pub use app::{render::OutputFormat, request::PageRequest, Browser};
pub use core::selection::SelectionEngine;
pub use domain::model::{FilterSelection, Page, PokemonSummary, TypeName};
pub use utils::error::{PokedexError, Result};
