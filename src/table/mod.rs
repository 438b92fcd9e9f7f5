//! Generic tabular data view: search, filter, sort, paginate and row actions
//! over any collection of [`Record`]s.
//!
//! The displayed page is always `paginate(sort(filter(search(source))))`. Every
//! stage is pure; [`TableView`] only adds per-instance state and memoization.

mod descriptor;
mod filter;
pub mod paginate;
mod record;
mod sort;
mod view;

pub use descriptor::{ActionDescriptor, ColumnDescriptor, FilterDescriptor};
pub use filter::{is_active_filter, matches_filters, FilterState};
pub use paginate::paginate;
pub use record::Record;
pub use sort::{sort_by_options, SortOption};
pub use view::{PageInfo, Pipeline, TableError, TableQuery, TableView};
