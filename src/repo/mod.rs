//! Record storage behind one trait so handlers do not care whether the data
//! lives in the in-process demo store or a SQLite workspace.

mod memory;
mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::records::TableModule;
use crate::table::{paginate, PageInfo, Pipeline, TableQuery};

pub use memory::{MemoryRepository, MemoryStore};
pub use sqlite::SqliteRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
    #[error("stored record is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateId(_) => "duplicate_id",
            StoreError::NotFound(_) => "not_found",
            StoreError::Db(_) => "db_query_failed",
            StoreError::Decode(_) => "db_query_failed",
        }
    }
}

/// A record type that can be persisted by either repository.
pub trait Entity: TableModule + Serialize + DeserializeOwned {
    fn bucket(store: &MemoryStore) -> &Vec<Self>;
    fn bucket_mut(store: &mut MemoryStore) -> &mut Vec<Self>;
}

#[derive(Debug, Clone)]
pub struct PageResult<R> {
    pub rows: Vec<R>,
    pub info: PageInfo,
}

pub trait Repository<R: Entity> {
    /// All records in insertion order.
    fn list(&self) -> Result<Vec<R>, StoreError>;
    fn get(&self, id: &str) -> Result<Option<R>, StoreError>;
    fn insert(&mut self, record: R) -> Result<(), StoreError>;
    /// Replaces the record with the same id. Missing ids are `NotFound`.
    fn update(&mut self, record: R) -> Result<(), StoreError>;
    /// Returns whether a record was removed.
    fn delete(&mut self, id: &str) -> Result<bool, StoreError>;

    /// Search, filter, sort and paginate over `list()`.
    fn query(
        &self,
        pipeline: &Pipeline<R>,
        query: &TableQuery,
        default_page_size: usize,
    ) -> Result<PageResult<R>, StoreError> {
        let source = self.list()?;
        let processed = pipeline.process(
            &source,
            &query.search,
            &query.filters,
            query.sort.as_deref(),
        );
        let info = PageInfo::new(
            processed.len(),
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(default_page_size),
        );
        let rows = paginate(&processed, info.page, info.page_size).to_vec();
        Ok(PageResult { rows, info })
    }
}
