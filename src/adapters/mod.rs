// Adapters layer: concrete implementations for external systems.

pub mod pokeapi;

pub use pokeapi::PokeApiClient;
