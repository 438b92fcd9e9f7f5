use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use super::record::Record;

pub type CellRenderer<R> = fn(&R, usize) -> String;

/// How one column of a table is labelled and rendered.
pub struct ColumnDescriptor<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub render: Option<CellRenderer<R>>,
    pub sortable: bool,
}

impl<R: Record> ColumnDescriptor<R> {
    pub fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            render: None,
            sortable: false,
        }
    }

    pub fn render_with(mut self, render: CellRenderer<R>) -> Self {
        self.render = Some(render);
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Cell text for `record` at absolute position `index` in the processed collection.
    pub fn cell(&self, record: &R, index: usize) -> String {
        match self.render {
            Some(render) => render(record, index),
            None => record.field_text(self.key).unwrap_or_default(),
        }
    }

    pub fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "key": self.key,
            "label": self.label,
            "sortable": self.sortable,
        })
    }
}

impl<R> fmt::Debug for ColumnDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("custom_render", &self.render.is_some())
            .field("sortable", &self.sortable)
            .finish()
    }
}

pub type ActionHandler<R> = Rc<dyn Fn(&R)>;

/// A per-row action. The handler is owned by the caller and receives the
/// record displayed in the row it was triggered from.
pub struct ActionDescriptor<R> {
    pub label: &'static str,
    pub icon: &'static str,
    pub handler: ActionHandler<R>,
    pub variant: Option<&'static str>,
}

impl<R> ActionDescriptor<R> {
    pub fn new(label: &'static str, icon: &'static str, handler: impl Fn(&R) + 'static) -> Self {
        Self {
            label,
            icon,
            handler: Rc::new(handler),
            variant: None,
        }
    }

    pub fn variant(mut self, variant: &'static str) -> Self {
        self.variant = Some(variant);
        self
    }

    pub fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "label": self.label,
            "icon": self.icon,
            "variant": self.variant,
        })
    }
}

impl<R> Clone for ActionDescriptor<R> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            icon: self.icon,
            handler: Rc::clone(&self.handler),
            variant: self.variant,
        }
    }
}

impl<R> fmt::Debug for ActionDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("label", &self.label)
            .field("icon", &self.icon)
            .field("variant", &self.variant)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub options: Vec<FilterOption>,
}

impl FilterDescriptor {
    /// Builds a descriptor whose first option is the `all` sentinel.
    pub fn with_all(key: &'static str, label: &'static str, values: &[&'static str]) -> Self {
        let mut options = vec![FilterOption {
            value: "all",
            label: "All",
        }];
        options.extend(values.iter().map(|&v| FilterOption { value: v, label: v }));
        Self {
            key,
            label,
            options,
        }
    }
}
