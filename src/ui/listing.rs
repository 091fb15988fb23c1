//! Paginated, searchable list views.
//!
//! [`ListController`] owns page, search and filter state for one list and asks
//! its [`ListSource`] to fetch pages. Results come back through
//! [`ListController::loaded`] tagged with the request sequence number; replies
//! to superseded requests and replies arriving after `unmount` are dropped.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::ui::debounce::Debouncer;

/// Parameters of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub seq: u64,
    pub page: usize,
    pub per_page: usize,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl ListRequest {
    /// Query string understood by the list endpoints.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("page".to_string(), self.page.to_string())];
        if let Some(search) = &self.search {
            pairs.push(("search".to_string(), search.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));
        pairs
    }
}

/// One fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Starts fetches; results are delivered back to the controller.
pub trait ListSource {
    fn fetch(&mut self, request: &ListRequest);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

struct SortState<T> {
    column: String,
    direction: SortDirection,
    compare: fn(&T, &T) -> Ordering,
}

impl<T> SortState<T> {
    fn apply(&self, items: &mut [T]) {
        items.sort_by(|a, b| match self.direction {
            SortDirection::Ascending => (self.compare)(a, b),
            SortDirection::Descending => (self.compare)(b, a),
        });
    }
}

pub struct ListController<T, S: ListSource> {
    source: S,
    per_page: usize,
    page: usize,
    search: Option<String>,
    filters: BTreeMap<String, String>,
    search_input: Debouncer<String>,
    items: Vec<T>,
    total: usize,
    state: LoadState,
    sort: Option<SortState<T>>,
    last_seq: u64,
    mounted: bool,
}

impl<T, S: ListSource> ListController<T, S> {
    pub fn new(source: S, per_page: usize) -> Self {
        Self {
            source,
            per_page: per_page.max(1),
            page: 1,
            search: None,
            filters: BTreeMap::new(),
            search_input: Debouncer::default(),
            items: Vec::new(),
            total: 0,
            state: LoadState::Idle,
            sort: None,
            last_seq: 0,
            mounted: false,
        }
    }

    pub fn mount(&mut self) {
        self.mounted = true;
        self.fetch();
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.search_input.cancel();
        if self.state == LoadState::Loading {
            self.state = LoadState::Idle;
        }
    }

    fn fetch(&mut self) {
        if !self.mounted {
            return;
        }
        self.last_seq += 1;
        let request = ListRequest {
            seq: self.last_seq,
            page: self.page,
            per_page: self.per_page,
            search: self.search.clone(),
            filters: self.filters.clone(),
        };
        self.state = LoadState::Loading;
        self.source.fetch(&request);
    }

    /// Records typed search text; the fetch happens on a later `tick`.
    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search_input.push(text.into(), now);
    }

    /// Fires the debounced search once it is due.
    pub fn tick(&mut self, now: Instant) {
        if let Some(text) = self.search_input.poll(now) {
            let text = text.trim();
            self.search = (!text.is_empty()).then(|| text.to_string());
            self.page = 1;
            self.fetch();
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
        self.fetch();
    }

    /// Sets or clears a filter such as `status`; the list restarts at page 1.
    pub fn set_filter(&mut self, key: &str, value: Option<&str>) {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => {
                self.filters.insert(key.to_string(), value.to_string());
            }
            None => {
                self.filters.remove(key);
            }
        }
        self.page = 1;
        self.fetch();
    }

    pub fn reload(&mut self) {
        self.fetch();
    }

    /// Delivers the result of request `seq`.
    pub fn loaded(&mut self, seq: u64, result: Result<ListPage<T>, String>) {
        if !self.mounted || seq != self.last_seq {
            log::debug!("Dropping stale list response {seq}");
            return;
        }
        match result {
            Ok(page) => {
                self.items = page.items;
                self.total = page.total;
                if let Some(sort) = &self.sort {
                    sort.apply(&mut self.items);
                }
                self.state = LoadState::Ready;
            }
            Err(message) => self.state = LoadState::Failed(message),
        }
    }

    /// Sorts the items of the current page without refetching. Sorting the
    /// same column again flips the direction.
    pub fn sort_by(&mut self, column: &str, compare: fn(&T, &T) -> Ordering) {
        let direction = match &self.sort {
            Some(sort) if sort.column == column => match sort.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            },
            _ => SortDirection::Ascending,
        };
        let sort = SortState {
            column: column.to_string(),
            direction,
            compare,
        };
        sort.apply(&mut self.items);
        self.sort = Some(sort);
    }

    pub fn sort(&self) -> Option<(&str, SortDirection)> {
        self.sort
            .as_ref()
            .map(|sort| (sort.column.as_str(), sort.direction))
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.per_page).max(1)
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        requests: Vec<ListRequest>,
    }

    impl ListSource for Recorder {
        fn fetch(&mut self, request: &ListRequest) {
            self.requests.push(request.clone());
        }
    }

    fn controller() -> ListController<i32, Recorder> {
        let mut list = ListController::new(Recorder::default(), 10);
        list.mount();
        list.loaded(
            1,
            Ok(ListPage {
                items: vec![3, 1, 2],
                total: 25,
            }),
        );
        list
    }

    #[test]
    fn typing_quickly_fetches_once_for_the_final_text() {
        let start = Instant::now();
        let mut list = controller();
        list.set_page(3);

        list.set_search("a", start);
        list.tick(start + Duration::from_millis(100));
        list.set_search("ab", start + Duration::from_millis(200));
        list.tick(start + Duration::from_millis(400));
        list.tick(start + Duration::from_millis(500));
        list.tick(start + Duration::from_millis(900));

        let requests = &list.source().requests;
        assert_eq!(requests.len(), 3);
        let last = &requests[2];
        assert_eq!(last.search.as_deref(), Some("ab"));
        assert_eq!(last.page, 1);
    }

    #[test]
    fn page_and_filter_changes_fetch_immediately() {
        let mut list = controller();
        list.set_page(2);
        list.set_filter("status", Some("pending"));

        let requests = &list.source().requests;
        assert_eq!(requests[1].page, 2);
        assert_eq!(requests[2].page, 1);
        assert_eq!(requests[2].filters.get("status").map(String::as_str), Some("pending"));
    }

    #[test]
    fn sorting_stays_on_the_current_page() {
        let mut list = controller();
        list.sort_by("value", |a, b| a.cmp(b));
        assert_eq!(list.items(), &[1, 2, 3]);

        list.sort_by("value", |a, b| a.cmp(b));
        assert_eq!(list.items(), &[3, 2, 1]);
        assert_eq!(list.source().requests.len(), 1);

        list.set_page(2);
        list.loaded(
            2,
            Ok(ListPage {
                items: vec![7, 9, 8],
                total: 25,
            }),
        );
        assert_eq!(list.items(), &[9, 8, 7]);
    }

    #[test]
    fn stale_and_unmounted_replies_are_ignored() {
        let mut list = controller();
        list.set_page(2);
        list.set_page(3);
        list.loaded(2, Ok(ListPage { items: vec![0], total: 25 }));
        assert_eq!(list.items(), &[3, 1, 2]);

        list.unmount();
        list.loaded(3, Ok(ListPage { items: vec![0], total: 25 }));
        assert_eq!(list.items(), &[3, 1, 2]);
        assert_eq!(list.state(), &LoadState::Idle);
    }

    #[test]
    fn failed_fetch_is_reported() {
        let mut list = controller();
        list.reload();
        list.loaded(2, Err("server error".into()));
        assert_eq!(list.state(), &LoadState::Failed("server error".into()));
    }
}
