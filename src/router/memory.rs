// ============================================================================
// spark-query-sync - Memory Router
// An in-process QuerySource: current query plus a log of navigations
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::types::{NavigationMode, QueryMap, QuerySource};
use crate::router::query::{parse_query, to_query_string};

/// One navigation request as received by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub query: QueryMap,
    pub mode: NavigationMode,
}

struct RouterState {
    path: String,
    query: QueryMap,
    /// Entries below the current one; `Push` grows it, `Replace` does not
    history: Vec<QueryMap>,
    log: Vec<Navigation>,
}

/// A router that lives entirely in memory.
///
/// Useful headless and in tests: it records every navigation it receives.
/// Cloning the handle shares the router.
///
/// # Example
///
/// ```
/// use spark_query_sync::{MemoryRouter, NavigationMode, QuerySource};
///
/// let router = MemoryRouter::from_href("/search?count=5");
/// assert_eq!(router.query()["count"], "5");
///
/// let mut next = router.query();
/// next.insert("count".into(), "6".into());
/// router.navigate(next, NavigationMode::Push);
///
/// assert_eq!(router.href(), "/search?count=6");
/// assert_eq!(router.navigation_count(), 1);
/// ```
#[derive(Clone)]
pub struct MemoryRouter {
    state: Rc<RefCell<RouterState>>,
}

impl MemoryRouter {
    /// Router at `/` with an empty query
    pub fn new() -> Self {
        Self::with_query(QueryMap::new())
    }

    /// Router at `/` with the given query
    pub fn with_query(query: QueryMap) -> Self {
        Self {
            state: Rc::new(RefCell::new(RouterState {
                path: "/".to_string(),
                query,
                history: Vec::new(),
                log: Vec::new(),
            })),
        }
    }

    /// Router seeded from an href such as `/list?page=2#top`.
    ///
    /// Anything before the path (scheme, host) is kept as part of the path;
    /// the fragment is dropped.
    pub fn from_href(href: &str) -> Self {
        let href = href.split_once('#').map_or(href, |(before, _)| before);
        let (path, query) = href.split_once('?').unwrap_or((href, ""));
        let router = Self::with_query(parse_query(query));
        if !path.is_empty() {
            router.state.borrow_mut().path = path.to_string();
        }
        router
    }

    /// Current path plus serialized query
    pub fn href(&self) -> String {
        let state = self.state.borrow();
        let query = to_query_string(&state.query);
        if query.is_empty() {
            state.path.clone()
        } else {
            format!("{}?{}", state.path, query)
        }
    }

    /// Change the query from outside, as a user editing the URL would.
    ///
    /// Not a navigation: nothing is logged and bindings do not react.
    pub fn set_query(&self, query: QueryMap) {
        self.state.borrow_mut().query = query;
    }

    /// Number of navigations received
    pub fn navigation_count(&self) -> usize {
        self.state.borrow().log.len()
    }

    /// Every navigation received, oldest first
    pub fn navigations(&self) -> Vec<Navigation> {
        self.state.borrow().log.clone()
    }

    /// The most recent navigation
    pub fn last_navigation(&self) -> Option<Navigation> {
        self.state.borrow().log.last().cloned()
    }

    /// Number of history entries, counting the current one
    pub fn history_len(&self) -> usize {
        self.state.borrow().history.len() + 1
    }
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuerySource for MemoryRouter {
    fn query(&self) -> QueryMap {
        self.state.borrow().query.clone()
    }

    fn navigate(&self, query: QueryMap, mode: NavigationMode) {
        let mut state = self.state.borrow_mut();
        tracing::debug!(?mode, params = query.len(), "navigate");
        if mode == NavigationMode::Push {
            let previous = std::mem::replace(&mut state.query, query.clone());
            state.history.push(previous);
        } else {
            state.query = query.clone();
        }
        state.log.push(Navigation { query, mode });
    }
}

impl std::fmt::Debug for MemoryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRouter")
            .field("href", &self.href())
            .field("navigations", &self.navigation_count())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn q(pairs: &[(&str, &str)]) -> QueryMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn new_router_is_empty() {
        let router = MemoryRouter::new();
        assert!(router.query().is_empty());
        assert_eq!(router.href(), "/");
        assert_eq!(router.navigation_count(), 0);
        assert_eq!(router.history_len(), 1);
        assert!(router.last_navigation().is_none());
    }

    #[test]
    fn from_href_parses_path_and_query() {
        let router = MemoryRouter::from_href("https://example.com/list?page=2&sort=%22asc%22#top");
        assert_eq!(router.query(), q(&[("page", "2"), ("sort", "\"asc\"")]));
        assert_eq!(
            router.href(),
            "https://example.com/list?page=2&sort=%22asc%22"
        );
    }

    #[test]
    fn from_href_query_only() {
        let router = MemoryRouter::from_href("?count=5");
        assert_eq!(router.query(), q(&[("count", "5")]));
        assert_eq!(router.href(), "/?count=5");
    }

    #[test]
    fn push_grows_history() {
        let router = MemoryRouter::new();
        router.navigate(q(&[("a", "1")]), NavigationMode::Push);
        router.navigate(q(&[("a", "2")]), NavigationMode::Push);
        assert_eq!(router.history_len(), 3);
        assert_eq!(router.query(), q(&[("a", "2")]));
    }

    #[test]
    fn replace_keeps_history() {
        let router = MemoryRouter::new();
        router.navigate(q(&[("a", "1")]), NavigationMode::Replace);
        assert_eq!(router.history_len(), 1);
        assert_eq!(
            router.last_navigation(),
            Some(Navigation {
                query: q(&[("a", "1")]),
                mode: NavigationMode::Replace,
            })
        );
    }

    #[test]
    fn set_query_is_not_a_navigation() {
        let router = MemoryRouter::new();
        router.set_query(q(&[("x", "1")]));
        assert_eq!(router.query(), q(&[("x", "1")]));
        assert_eq!(router.navigation_count(), 0);
    }

    #[test]
    fn clones_share_state() {
        let a = MemoryRouter::new();
        let b = a.clone();
        b.navigate(q(&[("k", "v")]), NavigationMode::Push);
        assert_eq!(a.query(), q(&[("k", "v")]));
        assert_eq!(a.navigations().len(), 1);
    }
}
