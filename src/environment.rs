use std::sync::Arc;

use slog::Logger;

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::db::Db;
use crate::music::MusicCatalog;

pub type SafeDb = dyn Db + Send + Sync;
pub type SafeAnalyzer = dyn Analyzer + Send + Sync;
pub type SafeCatalog = dyn MusicCatalog + Send + Sync;

/// Everything a route handler needs, built once at startup.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<SafeDb>,
    pub analyzer: Arc<SafeAnalyzer>,
    pub catalog: Arc<SafeCatalog>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<SafeDb>,
        analyzer: Arc<SafeAnalyzer>,
        catalog: Arc<SafeCatalog>,
        config: Config,
    ) -> Self {
        Self {
            logger,
            db,
            analyzer,
            catalog,
            config,
        }
    }
}
