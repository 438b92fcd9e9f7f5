use std::cmp::Ordering;
use std::rc::Rc;

/// Caller-supplied sort hook: `(sort_key, data) -> data'`.
pub type SortFn<R> = Rc<dyn Fn(&str, Vec<R>) -> Vec<R>>;

/// Currently selected sort key, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub key: Option<String>,
}

impl SortState {
    pub fn active_key(&self) -> Option<&str> {
        self.key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

pub struct SortOption<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub compare: fn(&R, &R) -> Ordering,
}

impl<R> SortOption<R> {
    pub const fn new(key: &'static str, label: &'static str, compare: fn(&R, &R) -> Ordering) -> Self {
        Self {
            key,
            label,
            compare,
        }
    }
}

impl<R> Clone for SortOption<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            label: self.label,
            compare: self.compare,
        }
    }
}

/// Builds a stable sort hook from a list of options. Unknown keys leave the
/// order untouched.
pub fn sort_by_options<R: 'static>(options: Vec<SortOption<R>>) -> SortFn<R> {
    Rc::new(move |key: &str, mut data: Vec<R>| {
        if let Some(opt) = options.iter().find(|o| o.key == key) {
            data.sort_by(opt.compare);
        }
        data
    })
}
