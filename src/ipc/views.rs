//! Long-lived table views the dashboard keeps open between requests.
//!
//! Row action handlers cannot reach the application state, so they push a
//! [`RowIntent`] into the view's outbox; the `views.action` handler drains it
//! after dispatch and applies the effect against the active store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::records::{AttendanceRecord, Instructor, Notice, Student, TableModule};
use crate::table::{ActionDescriptor, Record, TableView};

pub const MODULES: [&str; 4] = [Student::KIND, Instructor::KIND, AttendanceRecord::KIND, Notice::KIND];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIntent {
    Open(String),
    Delete(String),
    Notify(String),
}

pub type Outbox = Rc<RefCell<Vec<RowIntent>>>;

fn push_intent<R: Record>(outbox: &Outbox, make: fn(String) -> RowIntent) -> impl Fn(&R) + 'static
where
    R: 'static,
{
    let outbox = Rc::clone(outbox);
    move |record: &R| outbox.borrow_mut().push(make(record.id().to_string()))
}

/// View and Delete for every module; Notify where the record kind supports it.
pub fn row_actions<R: TableModule>(outbox: &Outbox) -> Vec<ActionDescriptor<R>> {
    let mut actions = vec![
        ActionDescriptor::new("View", "eye", push_intent::<R>(outbox, RowIntent::Open)),
        ActionDescriptor::new("Delete", "trash", push_intent::<R>(outbox, RowIntent::Delete))
            .variant("danger"),
    ];
    if R::NOTIFIABLE {
        actions.push(ActionDescriptor::new(
            "Notify",
            "bell",
            push_intent::<R>(outbox, RowIntent::Notify),
        ));
    }
    actions
}

pub fn build_view<R: TableModule>(source: Vec<R>, page_size: usize, outbox: &Outbox) -> TableView<R> {
    TableView::new(Rc::new(source), R::pipeline(), page_size)
        .with_columns(R::columns())
        .with_actions(row_actions(outbox))
        .with_filter_descriptors(R::filters())
}

pub enum ModuleView {
    Students(TableView<Student>),
    Instructors(TableView<Instructor>),
    Attendance(TableView<AttendanceRecord>),
    Notices(TableView<Notice>),
}

/// Runs `$body` with `$v` bound to the typed view inside a [`ModuleView`].
macro_rules! with_view {
    ($view:expr, $v:ident => $body:expr) => {
        match $view {
            $crate::ipc::views::ModuleView::Students($v) => $body,
            $crate::ipc::views::ModuleView::Instructors($v) => $body,
            $crate::ipc::views::ModuleView::Attendance($v) => $body,
            $crate::ipc::views::ModuleView::Notices($v) => $body,
        }
    };
}
pub(crate) use with_view;

impl ModuleView {
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleView::Students(_) => Student::KIND,
            ModuleView::Instructors(_) => Instructor::KIND,
            ModuleView::Attendance(_) => AttendanceRecord::KIND,
            ModuleView::Notices(_) => Notice::KIND,
        }
    }
}

pub struct OpenView {
    pub view: ModuleView,
    pub outbox: Outbox,
}

/// Open views keyed by id. Holds at most `capacity` views; opening one more
/// drops the view least recently updated or acted on.
pub struct ViewRegistry {
    views: HashMap<String, (u64, OpenView)>,
    capacity: usize,
    tick: u64,
}

impl ViewRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            views: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_to_fit(&mut self) {
        while self.views.len() >= self.capacity {
            let Some(oldest) = self
                .views
                .iter()
                .min_by_key(|(_, (used, _))| *used)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            self.views.remove(&oldest);
            tracing::debug!(view_id = %oldest, capacity = self.capacity, "view evicted");
        }
    }

    pub fn insert(&mut self, view: OpenView) -> String {
        self.evict_to_fit();
        let id = Uuid::new_v4().to_string();
        let used = self.next_tick();
        self.views.insert(id.clone(), (used, view));
        id
    }

    pub fn get(&self, id: &str) -> Option<&OpenView> {
        self.views.get(id).map(|(_, view)| view)
    }

    /// Removes a view for the duration of a request; pair with [`Self::put`].
    pub fn take(&mut self, id: &str) -> Option<OpenView> {
        self.views.remove(id).map(|(_, view)| view)
    }

    pub fn put(&mut self, id: String, view: OpenView) {
        let used = self.next_tick();
        self.views.insert(id, (used, view));
    }

    pub fn clear(&mut self) {
        self.views.clear();
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }
}

/// Everything the dashboard needs to draw the current page of a view.
pub fn snapshot<R: TableModule>(view_id: &str, view: &TableView<R>) -> Value {
    let info = view.page_info();
    json!({
        "viewId": view_id,
        "module": R::KIND,
        "rows": view.page_rows().iter().map(|r| r.display()).collect::<Vec<_>>(),
        "cells": view.rendered_rows(),
        "total": info.total,
        "totalPages": info.total_pages,
        "page": info.page,
        "pageSize": info.page_size,
        "pageNumbers": info.page_numbers,
        "columns": view.columns().iter().map(|c| c.describe()).collect::<Vec<_>>(),
        "actions": view.actions().iter().map(|a| a.describe()).collect::<Vec<_>>(),
        "filterOptions": view.filter_descriptors(),
        "sortOptions": R::describe_sort_options(),
        "state": {
            "search": view.search_term(),
            "filters": view.filter_state(),
            "sort": view.sort_state().key,
            "paging": view.page_state(),
        },
    })
}
