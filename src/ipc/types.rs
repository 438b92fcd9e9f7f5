use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use super::views::ViewRegistry;
use crate::config::Config;
use crate::repo::{Entity, MemoryRepository, MemoryStore, Repository, SqliteRepository};
use crate::seed;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub memory: MemoryStore,
    pub views: ViewRegistry,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let memory = if config.no_seed {
            MemoryStore::default()
        } else {
            seed::demo_store()
        };
        let views = ViewRegistry::with_capacity(config.max_views());
        Self {
            config,
            workspace: None,
            db: None,
            memory,
            views,
        }
    }

    /// The active store: the workspace database once one is selected,
    /// otherwise the in-memory collections.
    pub fn repo<R: Entity>(&mut self) -> Box<dyn Repository<R> + '_> {
        match &self.db {
            Some(conn) => Box::new(SqliteRepository::<R>::new(conn)),
            None => Box::new(MemoryRepository::new(&mut self.memory)),
        }
    }

    pub fn store_name(&self) -> &'static str {
        if self.db.is_some() {
            "sqlite"
        } else {
            "memory"
        }
    }

    pub fn page_size(&self) -> usize {
        self.config.default_page_size()
    }
}
