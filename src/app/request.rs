//! Turns raw request input into a filter selection and page number.

use crate::core::pagination::normalize_page;
use crate::domain::model::FilterSelection;
use crate::utils::error::Result;

/// Keys accepted as type filters in a query string.
const TYPE_KEYS: [&str; 4] = ["type", "type[]", "type1", "type2"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub filters: FilterSelection,
    pub page: u32,
}

impl PageRequest {
    /// From explicit parts: repeated or comma separated type names and a raw page value.
    pub fn from_parts<S: AsRef<str>>(types: &[S], page: Option<&str>) -> Result<Self> {
        let names = types
            .iter()
            .flat_map(|raw| raw.as_ref().split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty());

        Ok(Self {
            filters: FilterSelection::new(names)?,
            page: normalize_page(page),
        })
    }

    /// From a URL query string such as `?type=fire&type=flying&page=2`.
    /// Blank type values are ignored; the last `page` value wins.
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.trim_start_matches('?');
        let mut types = Vec::new();
        let mut page = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let key: &str = &key;
            if TYPE_KEYS.contains(&key) {
                types.push(value.into_owned());
            } else if key == "page" {
                page = Some(value.into_owned());
            }
        }

        Self::from_parts(&types, page.as_deref())
    }

    /// From a browse path such as `/pokemon/fire/flying`; a leading `pokemon` segment is optional.
    pub fn from_path(path: &str, page: Option<&str>) -> Result<Self> {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.first() == Some(&"pokemon") {
            segments.remove(0);
        }
        Self::from_parts(&segments, page)
    }
}
