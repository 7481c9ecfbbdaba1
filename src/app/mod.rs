pub mod render;
pub mod request;

use crate::adapters::PokeApiClient;
use crate::core::selection::SelectionEngine;
use crate::domain::model::Page;
use crate::domain::ports::{ConfigProvider, UpstreamSource};
use crate::utils::error::Result;
use render::OutputFormat;
use request::PageRequest;

/// The calling layer around the selection engine: owns the page size and
/// the output format, and renders what the engine returns.
pub struct Browser<U: UpstreamSource + 'static> {
    engine: SelectionEngine<U>,
    page_size: usize,
    format: OutputFormat,
}

impl Browser<PokeApiClient> {
    pub fn from_config<C: ConfigProvider>(config: &C, format: OutputFormat) -> Result<Self> {
        let client = PokeApiClient::from_config(config)?;
        tracing::debug!("Using upstream at {}", client.base_url());
        Ok(Self::new(
            SelectionEngine::from_config(client, config),
            config.page_size(),
            format,
        ))
    }
}

impl<U: UpstreamSource + 'static> Browser<U> {
    pub fn new(engine: SelectionEngine<U>, page_size: usize, format: OutputFormat) -> Self {
        Self {
            engine,
            page_size,
            format,
        }
    }

    pub async fn page(&self, request: &PageRequest) -> Page {
        self.engine
            .select_page(&request.filters, request.page, self.page_size)
            .await
    }

    pub async fn render_page(&self, request: &PageRequest) -> Result<String> {
        let page = self.page(request).await;
        if page.degraded {
            tracing::warn!("Page {} was built from partial upstream data", page.current_page);
        }
        render::render_page(&page, self.format)
    }

    pub async fn render_types(&self) -> Result<String> {
        let types = self.engine.available_types().await?;
        tracing::info!("Upstream lists {} types", types.len());
        render::render_types(&types, self.format)
    }
}
