//! State machine behind the student list view.
//!
//! [`ListController`] owns the authoritative [`ListQuery`] and publishes a
//! [`ListSnapshot`] through a `watch` channel every time the query or the
//! fetch state changes. Fetches run on spawned tasks; each one is tagged with
//! a sequence number and only the most recently issued fetch may commit its
//! result. Search input is debounced through a single abortable timer task.
//!
//! All operations are synchronous and must be called from within a Tokio
//! runtime.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::student::{SortField, SortOrder, Student};
use crate::pagination::compute_window;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DEFAULT_PAGE_SIZE, ListQuery, ListResult, StudentReader, normalize_filter};

/// Quiet period before a search keystroke turns into a query update.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Read-only view of the list state handed to the rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot {
    pub items: Vec<Student>,
    pub total: usize,
    pub total_pages: usize,
    pub is_loading: bool,
    /// A search keystroke is waiting for the debounce timer.
    pub search_pending: bool,
    pub error: Option<String>,
    /// Query the controller currently considers authoritative.
    pub query: ListQuery,
}

impl ListSnapshot {
    fn new(query: ListQuery) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            total_pages: 1,
            is_loading: false,
            search_pending: false,
            error: None,
            query,
        }
    }

    pub fn page(&self) -> usize {
        self.query.page
    }

    /// Page markers for the pagination control; `None` is an ellipsis.
    pub fn window(&self) -> Vec<Option<usize>> {
        compute_window(self.query.page, self.total_pages)
    }
}

struct ControllerState {
    query: ListQuery,
    /// Sequence number of the most recently issued fetch.
    issued_seq: u64,
    pending_search: Option<JoinHandle<()>>,
    /// Bumped on every `set_search` and `clear_filters` so a timer that
    /// already woke up can tell it was superseded.
    search_generation: u64,
}

struct Shared<R: ?Sized> {
    repo: Arc<R>,
    debounce: Duration,
    state: Mutex<ControllerState>,
    snapshot_tx: watch::Sender<ListSnapshot>,
}

impl<R> Shared<R>
where
    R: StudentReader + ?Sized + 'static,
{
    /// Issues a fetch for the current query. Called with the state lock held
    /// so the sequence number and the captured query always agree.
    fn issue_fetch(self: &Arc<Self>, state: &mut ControllerState) {
        state.issued_seq += 1;
        let seq = state.issued_seq;
        let query = state.query.clone();
        let search_pending = state.pending_search.is_some();

        self.snapshot_tx.send_modify(|snapshot| {
            snapshot.is_loading = true;
            snapshot.search_pending = search_pending;
            snapshot.query = query.clone();
        });

        log::debug!("Issuing fetch #{seq}: {query:?}");

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let repo = Arc::clone(&shared.repo);
            let request = query.clone();
            // A panicking reader must still settle the snapshot.
            let result = tokio::spawn(async move { repo.list_students(&request).await })
                .await
                .unwrap_or_else(|err| {
                    Err(RepositoryError::Unexpected(format!(
                        "Student list request failed: {err}"
                    )))
                });
            shared.commit(seq, &query, result);
        });
    }

    fn commit(&self, seq: u64, query: &ListQuery, result: RepositoryResult<ListResult<Student>>) {
        let state = self.state.lock();
        if seq != state.issued_seq {
            log::debug!(
                "Discarding stale result of fetch #{seq}, latest is #{}",
                state.issued_seq
            );
            return;
        }

        match result {
            Ok(result) => {
                if result.page != query.page {
                    log::warn!(
                        "Backend answered page {} for a request of page {}",
                        result.page,
                        query.page
                    );
                }
                self.snapshot_tx.send_modify(|snapshot| {
                    snapshot.items = result.items;
                    snapshot.total = result.total;
                    snapshot.total_pages = result.total_pages.max(1);
                    snapshot.error = None;
                    snapshot.is_loading = false;
                });
            }
            Err(err) => {
                log::error!("Failed to load students: {err}");
                self.snapshot_tx.send_modify(|snapshot| {
                    snapshot.error = Some(err.to_string());
                    snapshot.is_loading = false;
                });
            }
        }
    }

    fn apply_search(self: &Arc<Self>, generation: u64, text: &str) {
        let mut state = self.state.lock();
        if generation != state.search_generation {
            return;
        }
        state.pending_search = None;

        let search = normalize_filter(Some(text));
        if search == state.query.search {
            self.snapshot_tx
                .send_modify(|snapshot| snapshot.search_pending = false);
            return;
        }

        state.query.search = search;
        state.query.page = 1;
        self.issue_fetch(&mut state);
    }
}

/// Owns the list query and drives fetches through the injected reader.
pub struct ListController<R: StudentReader + ?Sized + 'static> {
    shared: Arc<Shared<R>>,
}

impl<R> ListController<R>
where
    R: StudentReader + ?Sized + 'static,
{
    pub fn new(repo: Arc<R>, page_size: usize, debounce: Duration) -> Self {
        Self::with_query(repo, ListQuery::new(page_size), debounce)
    }

    /// Controller with the default page size and search debounce.
    pub fn with_defaults(repo: Arc<R>) -> Self {
        Self::new(repo, DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_DEBOUNCE)
    }

    /// Starts from a prepared query, e.g. filters restored from configuration.
    pub fn with_query(repo: Arc<R>, query: ListQuery, debounce: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(ListSnapshot::new(query.clone()));
        Self {
            shared: Arc::new(Shared {
                repo,
                debounce,
                state: Mutex::new(ControllerState {
                    query,
                    issued_seq: 0,
                    pending_search: None,
                    search_generation: 0,
                }),
                snapshot_tx,
            }),
        }
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn query(&self) -> ListQuery {
        self.shared.state.lock().query.clone()
    }

    /// Waits until no fetch is loading and no search is pending.
    pub async fn settled(&self) -> ListSnapshot {
        let mut rx = self.subscribe();
        match rx
            .wait_for(|snapshot| !snapshot.is_loading && !snapshot.search_pending)
            .await
        {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Initial fetch when the view is shown.
    pub fn activate(&self) {
        let mut state = self.shared.state.lock();
        self.shared.issue_fetch(&mut state);
    }

    /// Re-issues the fetch for the current query, e.g. after a mutation.
    pub fn refetch(&self) {
        let mut state = self.shared.state.lock();
        self.shared.issue_fetch(&mut state);
    }

    /// Schedules a search update after the debounce period. A later call
    /// replaces the pending one.
    pub fn set_search(&self, text: impl Into<String>) {
        let text = text.into();
        let mut state = self.shared.state.lock();
        if let Some(pending) = state.pending_search.take() {
            pending.abort();
        }
        state.search_generation += 1;
        let generation = state.search_generation;

        let shared = Arc::clone(&self.shared);
        let debounce = self.shared.debounce;
        state.pending_search = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            shared.apply_search(generation, &text);
        }));

        self.shared
            .snapshot_tx
            .send_modify(|snapshot| snapshot.search_pending = true);
    }

    /// Selecting the active course again, or an empty value, clears it.
    pub fn set_course_filter(&self, value: impl AsRef<str>) {
        let mut state = self.shared.state.lock();
        let course = toggle(state.query.course.as_deref(), value.as_ref());
        if course == state.query.course {
            return;
        }
        state.query.course = course;
        state.query.page = 1;
        self.shared.issue_fetch(&mut state);
    }

    /// Selecting the active city again, or an empty value, clears it.
    pub fn set_city_filter(&self, value: impl AsRef<str>) {
        let mut state = self.shared.state.lock();
        let city = toggle(state.query.city.as_deref(), value.as_ref());
        if city == state.query.city {
            return;
        }
        state.query.city = city;
        state.query.page = 1;
        self.shared.issue_fetch(&mut state);
    }

    /// Drops search, course and city, including a search still waiting on
    /// the debounce timer. Sorting is kept.
    pub fn clear_filters(&self) {
        let mut state = self.shared.state.lock();
        let had_pending = cancel_pending_search(&mut state);

        if !state.query.has_filters() && state.query.page == 1 {
            if had_pending {
                self.shared
                    .snapshot_tx
                    .send_modify(|snapshot| snapshot.search_pending = false);
            }
            return;
        }

        state.query.search = None;
        state.query.course = None;
        state.query.city = None;
        state.query.page = 1;
        self.shared.issue_fetch(&mut state);
    }

    /// Clicking the active column flips the order, a new column sorts
    /// ascending. The page is kept either way.
    pub fn set_sort(&self, field: SortField) {
        let mut state = self.shared.state.lock();
        if state.query.sort_by == field {
            state.query.sort_order = state.query.sort_order.flipped();
        } else {
            state.query.sort_by = field;
            state.query.sort_order = SortOrder::Asc;
        }
        self.shared.issue_fetch(&mut state);
    }

    /// Moves to `page` as given; bounds are the caller's concern.
    pub fn set_page(&self, page: usize) {
        let mut state = self.shared.state.lock();
        if state.query.page == page {
            return;
        }
        state.query.page = page;
        self.shared.issue_fetch(&mut state);
    }

    /// Hides the current error without refetching.
    pub fn dismiss_error(&self) {
        self.shared
            .snapshot_tx
            .send_if_modified(|snapshot| snapshot.error.take().is_some());
    }
}

impl<R> Drop for ListController<R>
where
    R: StudentReader + ?Sized + 'static,
{
    fn drop(&mut self) {
        cancel_pending_search(&mut self.shared.state.lock());
    }
}

fn cancel_pending_search(state: &mut ControllerState) -> bool {
    state.search_generation += 1;
    match state.pending_search.take() {
        Some(pending) => {
            pending.abort();
            true
        }
        None => false,
    }
}

fn toggle(current: Option<&str>, value: &str) -> Option<String> {
    let value = normalize_filter(Some(value));
    if value.as_deref() == current {
        None
    } else {
        value
    }
}
