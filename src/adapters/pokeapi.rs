use crate::domain::model::{CatalogueSlice, NamedRef, TypeName};
use crate::domain::ports::{ConfigProvider, UpstreamSource};
use crate::utils::error::{PokedexError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Upper bound used when listing the type catalogue; PokeAPI has fewer than 30 types.
const TYPE_LIST_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
struct ResourceList {
    count: usize,
    results: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct TypeDetail {
    pokemon: Vec<TypeMember>,
}

#[derive(Debug, Deserialize)]
struct TypeMember {
    pokemon: NamedRef,
}

#[derive(Debug, Deserialize)]
struct PokemonDetail {
    id: u32,
}

/// Extracts the trailing numeric segment of a resource URL such as
/// `https://pokeapi.co/api/v2/pokemon/25/`.
pub fn id_from_resource_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .filter(|id| *id > 0)
}

/// [`UpstreamSource`] backed by the PokeAPI REST service.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.request_timeout().min(Duration::from_secs(5)))
            .user_agent(config.user_agent())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded as a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        // `extend` silently drops dot segments, which would change the resource addressed
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(PokedexError::InvalidFilter {
                message: format!("'{}' is not a valid resource name", dot),
            });
        }

        let mut url = Url::parse(&self.base_url).map_err(|e| PokedexError::ConfigError {
            message: format!("invalid upstream base URL '{}': {}", self.base_url, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| PokedexError::ConfigError {
                message: format!("upstream base URL '{}' cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, usize)],
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!("Making API request to: {} {:?}", url, query);

        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(PokedexError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl UpstreamSource for PokeApiClient {
    async fn list_catalogue(&self, offset: usize, limit: usize) -> Result<CatalogueSlice> {
        let list: ResourceList = self
            .get_json(&["pokemon"], &[("offset", offset), ("limit", limit)])
            .await?;

        Ok(CatalogueSlice {
            entries: list.results,
            total_count: list.count,
        })
    }

    async fn list_by_type(&self, type_name: &TypeName) -> Result<Vec<NamedRef>> {
        let detail: TypeDetail = self
            .get_json(&["type", type_name.as_str()], &[])
            .await?;

        Ok(detail
            .pokemon
            .into_iter()
            .map(|member| member.pokemon)
            .collect())
    }

    async fn resolve_id(&self, entry: &NamedRef) -> Result<u32> {
        if let Some(id) = id_from_resource_url(&entry.url) {
            return Ok(id);
        }

        let detail: PokemonDetail = self
            .get_json(&["pokemon", entry.name.as_str()], &[])
            .await?;

        if detail.id == 0 {
            return Err(PokedexError::UnexpectedPayload {
                message: format!("id 0 returned for '{}'", entry.name),
            });
        }
        Ok(detail.id)
    }

    async fn list_types(&self) -> Result<Vec<String>> {
        let list: ResourceList = self
            .get_json(&["type"], &[("limit", TYPE_LIST_LIMIT)])
            .await?;

        Ok(list.results.into_iter().map(|entry| entry.name).collect())
    }
}
