use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::descriptor::{ActionDescriptor, ColumnDescriptor, FilterDescriptor};
use super::filter::{matches_filters, matches_search, FilterFn, FilterState, SearchFn};
use super::paginate::{clamp_page, page_numbers, paginate, total_pages, PageState};
use super::record::Record;
use super::sort::{SortFn, SortState};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("row {row} is not on the current page ({rows} rows shown)")]
    RowOutOfRange { row: usize, rows: usize },
    #[error("unknown action: {0}")]
    UnknownAction(String),
}

/// Stateless search -> filter -> sort transform shared by list queries and
/// [`TableView`].
pub struct Pipeline<R> {
    pub search_fields: Vec<&'static str>,
    pub search_fn: Option<SearchFn<R>>,
    pub filter_fn: Option<FilterFn<R>>,
    pub sorter: Option<SortFn<R>>,
}

impl<R> Default for Pipeline<R> {
    fn default() -> Self {
        Self {
            search_fields: Vec::new(),
            search_fn: None,
            filter_fn: None,
            sorter: None,
        }
    }
}

impl<R> Clone for Pipeline<R> {
    fn clone(&self) -> Self {
        Self {
            search_fields: self.search_fields.clone(),
            search_fn: self.search_fn.clone(),
            filter_fn: self.filter_fn.clone(),
            sorter: self.sorter.clone(),
        }
    }
}

impl<R: Record + Clone> Pipeline<R> {
    pub fn new(search_fields: &[&'static str]) -> Self {
        Self {
            search_fields: search_fields.to_vec(),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, f: impl Fn(&R, &str) -> bool + 'static) -> Self {
        self.search_fn = Some(Rc::new(f));
        self
    }

    pub fn with_filter(mut self, f: impl Fn(&R, &FilterState) -> bool + 'static) -> Self {
        self.filter_fn = Some(Rc::new(f));
        self
    }

    pub fn with_sorter(mut self, sorter: SortFn<R>) -> Self {
        self.sorter = Some(sorter);
        self
    }

    fn keep(&self, record: &R, term: &str, filters: &FilterState) -> bool {
        let searched = match (&self.search_fn, term.trim()) {
            (_, "") => true,
            (Some(custom), t) => custom(record, t),
            (None, t) => matches_search(record, t, &self.search_fields),
        };
        searched
            && match &self.filter_fn {
                Some(custom) => custom(record, filters),
                None => matches_filters(record, filters),
            }
    }

    /// The processed collection, prior to pagination.
    pub fn process(
        &self,
        source: &[R],
        term: &str,
        filters: &FilterState,
        sort: Option<&str>,
    ) -> Vec<R> {
        let kept: Vec<R> = source
            .iter()
            .filter(|r| self.keep(r, term, filters))
            .cloned()
            .collect();
        match (&self.sorter, sort) {
            (Some(sorter), Some(key)) => sorter(key, kept),
            _ => kept,
        }
    }
}

/// Query parameters for a one-shot list request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableQuery {
    pub search: String,
    pub filters: FilterState,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: usize,
    pub total_pages: usize,
    pub page: usize,
    pub page_size: usize,
    pub page_numbers: Vec<usize>,
}

impl PageInfo {
    pub fn new(total: usize, page: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let pages = total_pages(total, page_size);
        let page = clamp_page(page, total, page_size);
        Self {
            total,
            total_pages: pages,
            page,
            page_size,
            page_numbers: page_numbers(page, pages),
        }
    }
}

/// Per-instance table state: search term, filters, sort and page over a
/// source collection, plus the descriptors used to render and act on rows.
pub struct TableView<R> {
    source: Rc<Vec<R>>,
    columns: Vec<ColumnDescriptor<R>>,
    actions: Vec<ActionDescriptor<R>>,
    filter_descriptors: Vec<FilterDescriptor>,
    pipeline: Pipeline<R>,
    search: String,
    filters: FilterState,
    sort: SortState,
    page: PageState,
    processed: RefCell<Option<Rc<Vec<R>>>>,
}

impl<R: Record + Clone> TableView<R> {
    pub fn new(source: Rc<Vec<R>>, pipeline: Pipeline<R>, page_size: usize) -> Self {
        Self {
            source,
            columns: Vec::new(),
            actions: Vec::new(),
            filter_descriptors: Vec::new(),
            pipeline,
            search: String::new(),
            filters: FilterState::new(),
            sort: SortState::default(),
            page: PageState::new(page_size),
            processed: RefCell::new(None),
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor<R>>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_actions(mut self, actions: Vec<ActionDescriptor<R>>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_filter_descriptors(mut self, filters: Vec<FilterDescriptor>) -> Self {
        self.filter_descriptors = filters;
        self
    }

    pub fn columns(&self) -> &[ColumnDescriptor<R>] {
        &self.columns
    }

    pub fn actions(&self) -> &[ActionDescriptor<R>] {
        &self.actions
    }

    pub fn filter_descriptors(&self) -> &[FilterDescriptor] {
        &self.filter_descriptors
    }

    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn page_state(&self) -> PageState {
        self.page
    }

    /// Replaces the source collection. All transient state resets unless the
    /// same collection is passed again.
    pub fn set_source(&mut self, source: Rc<Vec<R>>) {
        if Rc::ptr_eq(&self.source, &source) {
            return;
        }
        self.source = source;
        self.search.clear();
        self.filters.clear();
        self.sort = SortState::default();
        self.page.reset();
        self.invalidate();
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.search {
            return;
        }
        self.search = term;
        self.page.reset();
        self.invalidate();
    }

    pub fn set_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if self.filters.get(&key) == Some(&value) {
            return;
        }
        self.filters.insert(key, value);
        self.page.reset();
        self.invalidate();
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        if filters == self.filters {
            return;
        }
        self.filters = filters;
        self.page.reset();
        self.invalidate();
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(FilterState::new());
    }

    /// Sorting keeps the current page, clamped to the new bounds.
    pub fn set_sort(&mut self, key: Option<String>) {
        if key == self.sort.key {
            return;
        }
        self.sort.key = key;
        self.invalidate();
        let total = self.processed().len();
        self.page.go_to(self.page.current_page, total);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page.set_page_size(page_size);
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.processed().len();
        self.page.go_to(page, total);
    }

    pub fn next_page(&mut self) {
        let total = self.processed().len();
        self.page.next(total);
    }

    pub fn prev_page(&mut self) {
        let total = self.processed().len();
        self.page.prev(total);
    }

    fn invalidate(&mut self) {
        self.processed.get_mut().take();
    }

    /// Search, filter and sort applied to the source. Cached until an input changes.
    pub fn processed(&self) -> Rc<Vec<R>> {
        if let Some(hit) = self.processed.borrow().as_ref() {
            return Rc::clone(hit);
        }
        let fresh = Rc::new(self.pipeline.process(
            &self.source,
            &self.search,
            &self.filters,
            self.sort.active_key(),
        ));
        *self.processed.borrow_mut() = Some(Rc::clone(&fresh));
        fresh
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(
            self.processed().len(),
            self.page.current_page,
            self.page.page_size,
        )
    }

    pub fn page_rows(&self) -> Vec<R> {
        let processed = self.processed();
        paginate(&processed, self.page.current_page, self.page.page_size).to_vec()
    }

    /// Cells for the current page, one `Vec<String>` per row, in column order.
    pub fn rendered_rows(&self) -> Vec<Vec<String>> {
        let info = self.page_info();
        let offset = (info.page - 1) * info.page_size;
        self.page_rows()
            .iter()
            .enumerate()
            .map(|(i, record)| {
                self.columns
                    .iter()
                    .map(|c| c.cell(record, offset + i))
                    .collect()
            })
            .collect()
    }

    /// Invokes `action` with the record displayed in `row` of the current page.
    pub fn dispatch(&self, row: usize, action: &str) -> Result<R, TableError> {
        let descriptor = self
            .actions
            .iter()
            .find(|a| a.label.eq_ignore_ascii_case(action))
            .ok_or_else(|| TableError::UnknownAction(action.to_string()))?;
        let rows = self.page_rows();
        let record = rows.get(row).ok_or(TableError::RowOutOfRange {
            row,
            rows: rows.len(),
        })?;
        (descriptor.handler)(record);
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::sort::{sort_by_options, SortOption};
    use serde_json::{json, Value};

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        id: String,
        name: String,
        status: Option<String>,
    }

    impl Record for Person {
        fn id(&self) -> &str {
            &self.id
        }

        fn field(&self, key: &str) -> Option<Value> {
            match key {
                "id" => Some(json!(self.id)),
                "name" => Some(json!(self.name)),
                "status" => self.status.as_ref().map(|s| json!(s)),
                _ => None,
            }
        }
    }

    fn people(n: usize) -> Rc<Vec<Person>> {
        Rc::new(
            (0..n)
                .map(|i| Person {
                    id: format!("p{i:02}"),
                    name: format!("Person {i:02}"),
                    status: match i % 3 {
                        0 => Some("Active".into()),
                        1 => Some("inactive".into()),
                        _ => None,
                    },
                })
                .collect(),
        )
    }

    fn pipeline() -> Pipeline<Person> {
        Pipeline::new(&["name"]).with_sorter(sort_by_options(vec![
            SortOption::new("name_desc", "Name Z-A", |a: &Person, b: &Person| {
                b.name.cmp(&a.name)
            }),
        ]))
    }

    #[test]
    fn paging_twelve_records() {
        let mut view = TableView::new(people(12), pipeline(), 10);
        let ids: Vec<_> = view.page_rows().into_iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], "p00");
        view.next_page();
        let ids: Vec<_> = view.page_rows().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p10", "p11"]);
        assert_eq!(view.page_info().total_pages, 2);
        view.next_page();
        assert_eq!(view.page_state().current_page, 2);
    }

    #[test]
    fn filter_and_search_changes_reset_page() {
        let mut view = TableView::new(people(30), pipeline(), 5);
        view.go_to_page(4);
        assert_eq!(view.page_state().current_page, 4);
        view.set_filter("status", "ACTIVE");
        assert_eq!(view.page_state().current_page, 1);
        assert_eq!(view.page_info().total, 10);

        view.go_to_page(2);
        view.set_search("person 2");
        assert_eq!(view.page_state().current_page, 1);
        let ids: Vec<_> = view.page_rows().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p21", "p24", "p27"]);
    }

    #[test]
    fn page_size_change_resets_page() {
        let mut view = TableView::new(people(30), pipeline(), 5);
        view.go_to_page(3);
        view.set_page_size(10);
        assert_eq!(view.page_state().current_page, 1);
    }

    #[test]
    fn sort_keeps_page_and_reorders() {
        let mut view = TableView::new(people(12), pipeline(), 10);
        view.go_to_page(2);
        view.set_sort(Some("name_desc".into()));
        assert_eq!(view.page_state().current_page, 2);
        let ids: Vec<_> = view.page_rows().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p01", "p00"]);
    }

    #[test]
    fn new_source_resets_state() {
        let mut view = TableView::new(people(30), pipeline(), 5);
        view.set_search("person");
        view.set_filter("status", "active");
        view.go_to_page(2);
        view.set_source(people(4));
        assert_eq!(view.search_term(), "");
        assert!(view.filter_state().is_empty());
        assert_eq!(view.page_state().current_page, 1);
        assert_eq!(view.page_info().total, 4);
    }

    #[test]
    fn action_receives_displayed_record() {
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut view = TableView::new(people(30), pipeline(), 4).with_actions(vec![
            ActionDescriptor::new("View", "eye", move |p: &Person| {
                sink.borrow_mut().push(p.id.clone())
            }),
        ]);
        view.set_filter("status", "inactive");
        view.set_sort(Some("name_desc".into()));
        view.next_page();

        // inactive ids descending: p28 p25 p22 p19 | p16 p13 p10 p07 | ...
        let got = view.dispatch(1, "view").expect("dispatch");
        assert_eq!(got.id, "p13");
        assert_eq!(seen.borrow().as_slice(), ["p13".to_string()]);
        assert_ne!(got, people(30)[1]);
    }

    #[test]
    fn dispatch_rejects_bad_rows_and_actions() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let view = TableView::new(people(3), pipeline(), 10).with_actions(vec![
            ActionDescriptor::new("Delete", "trash", move |_: &Person| {
                *counter.borrow_mut() += 1
            })
            .variant("danger"),
        ]);
        assert_eq!(
            view.dispatch(3, "Delete"),
            Err(TableError::RowOutOfRange { row: 3, rows: 3 })
        );
        assert_eq!(
            view.dispatch(0, "archive"),
            Err(TableError::UnknownAction("archive".into()))
        );
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn processed_collection_is_memoized() {
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let pipeline = Pipeline::new(&["name"]).with_search(move |p: &Person, t: &str| {
            *counter.borrow_mut() += 1;
            p.name.contains(t)
        });
        let mut view = TableView::new(people(6), pipeline, 10);
        view.set_search("Person 0");
        let _ = view.page_rows();
        let _ = view.page_info();
        let _ = view.rendered_rows();
        assert_eq!(*calls.borrow(), 6);
        view.set_search("Person 0");
        let _ = view.page_rows();
        assert_eq!(*calls.borrow(), 6);
    }

    #[test]
    fn rendered_rows_use_column_renderers() {
        let view = TableView::new(people(3), pipeline(), 2).with_columns(vec![
            ColumnDescriptor::new("index", "#").render_with(|_, i| (i + 1).to_string()),
            ColumnDescriptor::new("name", "Name").sortable(),
            ColumnDescriptor::new("status", "Status"),
        ]);
        let rows = view.rendered_rows();
        assert_eq!(rows[0], vec!["1", "Person 00", "Active"]);
        assert_eq!(rows[1], vec!["2", "Person 01", "inactive"]);
    }
}
