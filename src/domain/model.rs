use crate::utils::error::{PokedexError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of type filters a selection may carry.
pub const MAX_FILTERS: usize = 2;

/// Id substituted when a per-name id lookup fails.
pub const SENTINEL_ID: u32 = 1;

const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Elemental type identifier, e.g. `fire`. Membership is decided upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// Trims and lowercases the raw value; upstream names are lowercase.
    pub fn new(raw: &str) -> Result<Self> {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return Err(PokedexError::InvalidFilter {
                message: "type name cannot be empty".to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A listed resource: its name plus the upstream handle (resource URL) for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
    pub url: String,
}

impl NamedRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// One window of the unfiltered catalogue together with the catalogue size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueSlice {
    pub entries: Vec<NamedRef>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSummary {
    pub name: String,
    pub id: u32,
}

impl PokemonSummary {
    pub fn new(name: impl Into<String>, id: u32) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    pub fn sprite_url(&self) -> String {
        format!("{}/{}.png", SPRITE_BASE_URL, self.id)
    }
}

/// Zero, one or two type filters, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    types: Vec<TypeName>,
}

impl FilterSelection {
    pub fn none() -> Self {
        Self::default()
    }

    /// Rejects more than [`MAX_FILTERS`] entries. Repeated names are kept as given.
    pub fn new<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let types = raw
            .into_iter()
            .map(|s| TypeName::new(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if types.len() > MAX_FILTERS {
            return Err(PokedexError::TooManyFilters {
                count: types.len(),
                max: MAX_FILTERS,
            });
        }

        Ok(Self { types })
    }

    pub fn types(&self) -> &[TypeName] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// One page of results plus pagination metadata.
///
/// Field names on the wire follow the browsing front-end's JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "pokemonData")]
    pub items: Vec<PokemonSummary>,
    #[serde(rename = "currentPage")]
    pub current_page: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
    #[serde(rename = "totalPokemonCount")]
    pub total_count: usize,
    #[serde(rename = "hasNextPage")]
    pub has_next: bool,
    #[serde(rename = "hasPreviousPage")]
    pub has_previous: bool,
    /// Set when an upstream failure was absorbed while building this page.
    #[serde(default)]
    pub degraded: bool,
}

impl Page {
    pub fn new(
        items: Vec<PokemonSummary>,
        current_page: u32,
        page_size: usize,
        total_count: usize,
        degraded: bool,
    ) -> Self {
        let total_pages = crate::core::pagination::total_pages(total_count, page_size);
        Self {
            items,
            current_page,
            total_pages,
            total_count,
            has_next: (current_page as usize) < total_pages,
            has_previous: current_page > 1,
            degraded,
        }
    }

    /// A well-formed page with no candidates.
    pub fn empty(current_page: u32, page_size: usize, degraded: bool) -> Self {
        Self::new(Vec::new(), current_page, page_size, 0, degraded)
    }
}
