use crate::core::pagination;
use crate::domain::model::{
    FilterSelection, NamedRef, Page, PokemonSummary, TypeName, SENTINEL_ID,
};
use crate::domain::ports::{ConfigProvider, UpstreamSource};
use crate::utils::error::{PokedexError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_CONCURRENT_REQUESTS: usize = 10;

/// Candidate names for the active filters, before windowing.
struct Candidates {
    entries: Vec<NamedRef>,
    degraded: bool,
}

/// Computes pages of Pokémon for zero, one or two type filters.
///
/// Stateless: every call recomputes its result from the live upstream.
/// Upstream failures never escape `select_page`; they shrink the candidate
/// set to nothing or substitute [`SENTINEL_ID`], and mark the page degraded.
pub struct SelectionEngine<U: UpstreamSource + 'static> {
    upstream: Arc<U>,
    concurrent_requests: usize,
}

impl<U: UpstreamSource + 'static> SelectionEngine<U> {
    pub fn new(upstream: U) -> Self {
        Self::with_shared(Arc::new(upstream))
    }

    pub fn with_shared(upstream: Arc<U>) -> Self {
        Self {
            upstream,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
        }
    }

    pub fn from_config<C: ConfigProvider>(upstream: U, config: &C) -> Self {
        Self::new(upstream).with_concurrency(config.concurrent_requests())
    }

    /// Upper bound on in-flight id lookups for one page.
    pub fn with_concurrency(mut self, concurrent_requests: usize) -> Self {
        self.concurrent_requests = concurrent_requests.max(1);
        self
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Type names known upstream. Unlike page selection, failure is returned.
    pub async fn available_types(&self) -> Result<Vec<String>> {
        self.upstream.list_types().await
    }

    pub async fn select_page(&self, filters: &FilterSelection, page: u32, page_size: usize) -> Page {
        let page = page.max(1);
        let page_size = page_size.max(1);

        let candidates = match filters.types() {
            [] => return self.select_from_catalogue(page, page_size).await,
            [only] => self.members_of(only).await,
            [first, second, rest @ ..] => {
                if !rest.is_empty() {
                    tracing::warn!(
                        "{} type filters supplied, only the first two are applied",
                        filters.len()
                    );
                }
                let (first, second) = tokio::join!(self.members_of(first), self.members_of(second));
                Candidates {
                    entries: pagination::intersect_ordered(first.entries, &second.entries),
                    degraded: first.degraded || second.degraded,
                }
            }
        };

        let total_count = candidates.entries.len();
        let window = pagination::window(&candidates.entries, page, page_size);
        let (items, substituted) = self.resolve_window(window).await;

        tracing::info!(
            "Selected page {} for filters {:?}: {} of {} candidates",
            page,
            filters.types().iter().map(TypeName::as_str).collect::<Vec<_>>(),
            items.len(),
            total_count
        );

        Page::new(
            items,
            page,
            page_size,
            total_count,
            candidates.degraded || substituted > 0,
        )
    }

    async fn select_from_catalogue(&self, page: u32, page_size: usize) -> Page {
        let offset = pagination::window_offset(page, page_size);

        let slice = match self.upstream.list_catalogue(offset, page_size).await {
            Ok(slice) => slice,
            Err(e) => {
                tracing::warn!("Catalogue lookup failed, returning an empty page: {}", e);
                return Page::empty(page, page_size, true);
            }
        };

        let mut entries = slice.entries;
        if offset >= slice.total_count {
            entries.clear();
        }
        entries.truncate(page_size);

        let (items, substituted) = self.resolve_window(entries).await;

        tracing::info!(
            "Selected catalogue page {}: {} of {} entries",
            page,
            items.len(),
            slice.total_count
        );

        Page::new(items, page, page_size, slice.total_count, substituted > 0)
    }

    async fn members_of(&self, type_name: &TypeName) -> Candidates {
        match self.upstream.list_by_type(type_name).await {
            Ok(entries) => Candidates {
                entries,
                degraded: false,
            },
            // Unknown types are answered with 404, which is an empty type, not an outage.
            Err(PokedexError::UpstreamStatus { status: 404, .. }) => {
                tracing::debug!("Type '{}' is unknown upstream", type_name);
                Candidates {
                    entries: Vec::new(),
                    degraded: false,
                }
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(
                        "Membership lookup for type '{}' failed transiently, treating it as empty: {}",
                        type_name,
                        e
                    );
                } else {
                    tracing::error!(
                        "Membership lookup for type '{}' failed, treating it as empty: {}",
                        type_name,
                        e
                    );
                }
                Candidates {
                    entries: Vec::new(),
                    degraded: true,
                }
            }
        }
    }

    /// Resolves every id of the window concurrently and reassembles them in window order.
    /// Returns the summaries and how many ids fell back to the sentinel.
    async fn resolve_window(&self, window: Vec<NamedRef>) -> (Vec<PokemonSummary>, usize) {
        let semaphore = Arc::new(Semaphore::new(self.concurrent_requests));
        let mut join_set: JoinSet<(usize, Result<u32>)> = JoinSet::new();

        for (index, entry) in window.iter().cloned().enumerate() {
            let upstream = Arc::clone(&self.upstream);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, upstream.resolve_id(&entry).await)
            });
        }

        let mut slots: Vec<Option<u32>> = vec![None; window.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(id))) => slots[index] = Some(id),
                Ok((index, Err(e))) => {
                    tracing::warn!(
                        "Id lookup for '{}' failed, using sentinel id {}: {}",
                        window[index].name,
                        SENTINEL_ID,
                        e
                    );
                }
                Err(e) => tracing::warn!("Id lookup task aborted: {}", e),
            }
        }

        let mut substituted = 0;
        let items: Vec<PokemonSummary> = window
            .into_iter()
            .zip(slots)
            .map(|(entry, slot)| {
                let id = slot.unwrap_or_else(|| {
                    substituted += 1;
                    SENTINEL_ID
                });
                PokemonSummary::new(entry.name, id)
            })
            .collect();

        (items, substituted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CatalogueSlice;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory upstream with failure injection.
    #[derive(Default)]
    struct FakeUpstream {
        catalogue: Vec<NamedRef>,
        types: HashMap<String, Vec<NamedRef>>,
        ids: HashMap<String, u32>,
        failing_types: HashSet<String>,
        malformed_types: HashSet<String>,
        failing_ids: HashSet<String>,
        delays_ms: HashMap<String, u64>,
        catalogue_down: bool,
        id_lookups: AtomicUsize,
    }

    impl FakeUpstream {
        fn with_catalogue(count: u32) -> Self {
            let mut upstream = Self::default();
            for id in 1..=count {
                let name = format!("mon-{}", id);
                upstream.ids.insert(name.clone(), id);
                upstream.catalogue.push(entry(&name));
            }
            upstream
        }

        fn with_type(mut self, type_name: &str, names: &[&str]) -> Self {
            for name in names {
                let next_id = self.ids.len() as u32 + 1;
                self.ids.entry(name.to_string()).or_insert(next_id);
            }
            self.types.insert(
                type_name.to_string(),
                names.iter().map(|name| entry(name)).collect(),
            );
            self
        }

        fn members(&self, type_name: &str) -> Vec<String> {
            self.types
                .get(type_name)
                .map(|entries| entries.iter().map(|e| e.name.clone()).collect())
                .unwrap_or_default()
        }
    }

    fn entry(name: &str) -> NamedRef {
        NamedRef::new(name, format!("fake://pokemon/{}", name))
    }

    #[async_trait]
    impl UpstreamSource for FakeUpstream {
        async fn list_catalogue(&self, offset: usize, limit: usize) -> Result<CatalogueSlice> {
            if self.catalogue_down {
                return Err(PokedexError::UpstreamStatus {
                    url: "fake://pokemon".to_string(),
                    status: 503,
                });
            }
            Ok(CatalogueSlice {
                entries: self.catalogue.iter().skip(offset).take(limit).cloned().collect(),
                total_count: self.catalogue.len(),
            })
        }

        async fn list_by_type(&self, type_name: &TypeName) -> Result<Vec<NamedRef>> {
            if self.malformed_types.contains(type_name.as_str()) {
                return Err(PokedexError::UnexpectedPayload {
                    message: format!("no member list for {}", type_name),
                });
            }
            if self.failing_types.contains(type_name.as_str()) {
                return Err(PokedexError::UpstreamStatus {
                    url: format!("fake://type/{}", type_name),
                    status: 500,
                });
            }
            self.types
                .get(type_name.as_str())
                .cloned()
                .ok_or_else(|| PokedexError::UpstreamStatus {
                    url: format!("fake://type/{}", type_name),
                    status: 404,
                })
        }

        async fn resolve_id(&self, entry: &NamedRef) -> Result<u32> {
            self.id_lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays_ms.get(&entry.name) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            if self.failing_ids.contains(&entry.name) {
                return Err(PokedexError::UnexpectedPayload {
                    message: format!("no id for {}", entry.name),
                });
            }
            self.ids
                .get(&entry.name)
                .copied()
                .ok_or_else(|| PokedexError::UpstreamStatus {
                    url: entry.url.clone(),
                    status: 404,
                })
        }

        async fn list_types(&self) -> Result<Vec<String>> {
            let mut names: Vec<String> = self.types.keys().cloned().collect();
            names.sort();
            Ok(names)
        }
    }

    fn names(page: &Page) -> Vec<&str> {
        page.items.iter().map(|item| item.name.as_str()).collect()
    }

    fn filters(raw: &[&str]) -> FilterSelection {
        FilterSelection::new(raw.iter().copied()).unwrap()
    }

    fn water_names() -> Vec<String> {
        (1..=23).map(|i| format!("water-{}", i)).collect()
    }

    #[tokio::test]
    async fn test_catalogue_last_partial_page() {
        let engine = SelectionEngine::new(FakeUpstream::with_catalogue(25));

        let page = engine.select_page(&FilterSelection::none(), 3, 10).await;

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_previous);
        assert_eq!(page.items[0], PokemonSummary::new("mon-21", 21));
        assert!(!page.degraded);
    }

    #[tokio::test]
    async fn test_catalogue_page_past_end() {
        let engine = SelectionEngine::new(FakeUpstream::with_catalogue(25));

        let page = engine.select_page(&FilterSelection::none(), 7, 10).await;

        assert!(page.items.is_empty());
        assert_eq!(page.current_page, 7);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn test_page_zero_is_first_page() {
        let engine = SelectionEngine::new(FakeUpstream::with_catalogue(25));

        let page = engine.select_page(&FilterSelection::none(), 0, 10).await;

        assert_eq!(page.current_page, 1);
        assert_eq!(page.items.len(), 10);
        assert!(!page.has_previous);
        assert!(page.has_next);
    }

    #[tokio::test]
    async fn test_catalogue_outage_yields_empty_page() {
        let mut upstream = FakeUpstream::with_catalogue(25);
        upstream.catalogue_down = true;
        let engine = SelectionEngine::new(upstream);

        let page = engine.select_page(&FilterSelection::none(), 2, 10).await;

        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
        assert!(page.has_previous);
        assert!(page.degraded);
    }

    #[tokio::test]
    async fn test_single_type_first_page() {
        let water = water_names();
        let water_refs: Vec<&str> = water.iter().map(String::as_str).collect();
        let engine = SelectionEngine::new(FakeUpstream::default().with_type("water", &water_refs));

        let page = engine.select_page(&filters(&["water"]), 1, 10).await;

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_count, 23);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(!page.has_previous);
        assert_eq!(names(&page)[0], "water-1");
        assert_eq!(names(&page)[9], "water-10");
    }

    #[tokio::test]
    async fn test_single_type_window_matches_item_count_invariant() {
        let water = water_names();
        let water_refs: Vec<&str> = water.iter().map(String::as_str).collect();
        let engine = SelectionEngine::new(FakeUpstream::default().with_type("water", &water_refs));

        for page_number in 1..=5u32 {
            let page = engine.select_page(&filters(&["water"]), page_number, 10).await;
            let offset = (page_number as usize - 1) * 10;
            let expected = 10usize.min(page.total_count.saturating_sub(offset));
            assert_eq!(page.items.len(), expected, "page {}", page_number);
            assert_eq!(page.has_next, (page_number as usize) < page.total_pages);
            assert_eq!(page.has_previous, page_number > 1);
        }
    }

    #[tokio::test]
    async fn test_two_types_intersection_order() {
        let upstream = FakeUpstream::default()
            .with_type(
                "fire",
                &["charmander", "charizard", "vulpix", "moltres", "ho-oh"],
            )
            .with_type("flying", &["pidgey", "ho-oh", "charizard", "moltres"]);
        let fire = upstream.members("fire");
        let flying: HashSet<String> = upstream.members("flying").into_iter().collect();
        let engine = SelectionEngine::new(upstream);

        let page = engine.select_page(&filters(&["fire", "flying"]), 1, 10).await;

        assert_eq!(names(&page), vec!["charizard", "moltres", "ho-oh"]);
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 1);

        let expected: Vec<&str> = fire
            .iter()
            .filter(|name| flying.contains(*name))
            .map(String::as_str)
            .collect();
        assert_eq!(names(&page), expected);
    }

    #[tokio::test]
    async fn test_repeated_type_matches_single_type() {
        let engine = SelectionEngine::new(
            FakeUpstream::default().with_type("fire", &["charmander", "vulpix", "growlithe"]),
        );

        let single = engine.select_page(&filters(&["fire"]), 1, 2).await;
        let repeated = engine.select_page(&filters(&["fire", "fire"]), 1, 2).await;

        assert_eq!(single, repeated);
        assert_eq!(single.total_pages, 2);
    }

    #[tokio::test]
    async fn test_unknown_type_is_empty_not_error() {
        let engine = SelectionEngine::new(FakeUpstream::default().with_type("fire", &["vulpix"]));

        let page = engine.select_page(&filters(&["not-a-real-type"]), 1, 10).await;

        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next);
        assert!(!page.has_previous);
        assert!(!page.degraded);
    }

    #[tokio::test]
    async fn test_failed_type_lookup_empties_intersection() {
        let mut upstream = FakeUpstream::default()
            .with_type("fire", &["charizard"])
            .with_type("flying", &["charizard"]);
        upstream.failing_types.insert("flying".to_string());
        let engine = SelectionEngine::new(upstream);

        let page = engine.select_page(&filters(&["fire", "flying"]), 1, 10).await;

        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert!(page.degraded);
    }

    #[tokio::test]
    async fn test_malformed_type_payload_is_degraded_empty() {
        let mut upstream = FakeUpstream::default().with_type("ghost", &["gastly"]);
        upstream.malformed_types.insert("ghost".to_string());
        let engine = SelectionEngine::new(upstream);

        let page = engine.select_page(&filters(&["ghost"]), 1, 10).await;

        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert!(page.degraded);
    }

    #[tokio::test]
    async fn test_failed_id_lookup_uses_sentinel() {
        let water = water_names();
        let water_refs: Vec<&str> = water[..10].iter().map(String::as_str).collect();
        let mut upstream = FakeUpstream::default().with_type("water", &water_refs);
        upstream.failing_ids.insert("water-4".to_string());
        let engine = SelectionEngine::new(upstream);

        let page = engine.select_page(&filters(&["water"]), 1, 10).await;

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[3], PokemonSummary::new("water-4", SENTINEL_ID));
        assert_eq!(page.items[4].name, "water-5");
        assert_ne!(page.items[4].id, SENTINEL_ID);
        assert!(page.degraded);
    }

    #[tokio::test]
    async fn test_window_order_survives_out_of_order_completion() {
        let names_in_order = ["slow", "medium", "fast"];
        let mut upstream = FakeUpstream::default().with_type("normal", &names_in_order);
        upstream.delays_ms.insert("slow".to_string(), 60);
        upstream.delays_ms.insert("medium".to_string(), 30);
        let engine = SelectionEngine::new(upstream);

        let page = engine.select_page(&filters(&["normal"]), 1, 10).await;

        assert_eq!(names(&page), names_in_order.to_vec());
    }

    fn delayed_page_upstream(delay_ms: u64) -> FakeUpstream {
        let names: Vec<String> = (1..=10).map(|i| format!("slow-{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut upstream = FakeUpstream::default().with_type("psychic", &refs);
        for name in &names {
            upstream.delays_ms.insert(name.clone(), delay_ms);
        }
        upstream
    }

    #[tokio::test(start_paused = true)]
    async fn test_id_lookups_run_concurrently() {
        let engine = SelectionEngine::new(delayed_page_upstream(50));

        let started = tokio::time::Instant::now();
        let page = engine.select_page(&filters(&["psychic"]), 1, 10).await;
        let elapsed = started.elapsed();

        assert_eq!(page.items.len(), 10);
        // one at a time would take 10 x 50ms
        assert!(elapsed < Duration::from_millis(100), "took {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_limit_bounds_in_flight_lookups() {
        let engine = SelectionEngine::new(delayed_page_upstream(50)).with_concurrency(2);

        let started = tokio::time::Instant::now();
        let page = engine.select_page(&filters(&["psychic"]), 1, 10).await;
        let elapsed = started.elapsed();

        assert_eq!(page.items.len(), 10);
        assert!(elapsed >= Duration::from_millis(250), "took {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(300), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_only_window_ids_are_resolved() {
        let water = water_names();
        let water_refs: Vec<&str> = water.iter().map(String::as_str).collect();
        let engine = SelectionEngine::new(FakeUpstream::default().with_type("water", &water_refs))
            .with_concurrency(2);

        let page = engine.select_page(&filters(&["water"]), 3, 10).await;

        assert_eq!(page.items.len(), 3);
        assert_eq!(engine.upstream().id_lookups.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_select_page_is_idempotent() {
        let engine = SelectionEngine::new(
            FakeUpstream::default()
                .with_type("grass", &["bulbasaur", "oddish", "bellsprout", "exeggcute"])
                .with_type("poison", &["ekans", "oddish", "bulbasaur", "bellsprout"]),
        );
        let selection = filters(&["grass", "poison"]);

        let first = engine.select_page(&selection, 1, 2).await;
        let second = engine.select_page(&selection, 1, 2).await;

        assert_eq!(first, second);
        assert_eq!(names(&first), vec!["bulbasaur", "oddish"]);
        assert_eq!(first.total_count, 3);
    }

    #[tokio::test]
    async fn test_available_types() {
        let engine = SelectionEngine::new(
            FakeUpstream::default()
                .with_type("water", &["squirtle"])
                .with_type("fire", &["vulpix"]),
        );

        assert_eq!(engine.available_types().await.unwrap(), vec!["fire", "water"]);
    }
}
