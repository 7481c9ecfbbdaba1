use crate::domain::model::Page;
use crate::utils::error::{PokedexError, Result};
use std::fmt::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl OutputFormat {
    pub const NAMES: [&'static str; 2] = ["json", "text"];
}

impl FromStr for OutputFormat {
    type Err = PokedexError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            other => Err(PokedexError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: format!("Allowed values: {}", Self::NAMES.join(", ")),
            }),
        }
    }
}

pub fn render_page(page: &Page, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(page)?),
        OutputFormat::Text => Ok(page_as_text(page)),
    }
}

pub fn render_types(types: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(types)?),
        OutputFormat::Text => Ok(types.join("\n")),
    }
}

fn page_as_text(page: &Page) -> String {
    let mut out = String::new();

    if page.items.is_empty() {
        out.push_str("No Pokémon found.\n");
    }
    for item in &page.items {
        // writing into a String cannot fail
        let _ = writeln!(out, "#{:<5} {:<24} {}", item.id, item.name, item.sprite_url());
    }

    let _ = write!(
        out,
        "Page {} of {} ({} Pokémon)",
        page.current_page, page.total_pages, page.total_count
    );
    if page.has_previous {
        let _ = write!(out, "  prev: {}", page.current_page - 1);
    }
    if page.has_next {
        let _ = write!(out, "  next: {}", page.current_page + 1);
    }
    if page.degraded {
        out.push_str("\n(warning: the data service was partly unavailable)");
    }
    out
}
