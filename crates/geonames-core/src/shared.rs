// crates/geonames-core/src/shared.rs

//! # Shared Gazetteer
//!
//! The persistent shell around a [`GazetteerStore`]. Sessions hold the store
//! by `Arc`; the shell only keeps a weak reference, so the store and every
//! loaded column are freed when the last session goes away. The next session
//! builds a fresh store that loads lazily again.

use crate::calendar::Environment;
use crate::config::GazetteerConfig;
use crate::error::{GeoError, Result};
use crate::session::SearchSession;
use crate::store::GazetteerStore;
use crate::traits::ColumnSource;
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex, Weak};
use tracing::info;

static GLOBAL_GAZETTEER: OnceCell<Gazetteer> = OnceCell::new();

pub struct Gazetteer {
    source: Arc<dyn ColumnSource>,
    env: Environment,
    live: Mutex<Weak<GazetteerStore>>,
}

impl std::fmt::Debug for Gazetteer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gazetteer")
            .field("source", &self.source.describe())
            .field("live", &self.is_live())
            .finish()
    }
}

impl Gazetteer {
    pub fn new(source: Arc<dyn ColumnSource>, env: Environment) -> Self {
        Self {
            source,
            env,
            live: Mutex::new(Weak::new()),
        }
    }

    pub fn from_config(config: &GazetteerConfig) -> Self {
        Self::new(config.source(), config.environment())
    }

    /// Process-wide shell configured from the `GEONAMES_*` environment on
    /// first use.
    pub fn global() -> Result<&'static Gazetteer> {
        GLOBAL_GAZETTEER.get_or_try_init(|| {
            let config = GazetteerConfig::from_env()?;
            Ok(Self::from_config(&config))
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// The live store, creating one if no session currently holds it.
    pub fn acquire(&self) -> Result<Arc<GazetteerStore>> {
        let mut live = self.live.lock().map_err(|_| GeoError::LockPoisoned)?;
        if let Some(store) = live.upgrade() {
            return Ok(store);
        }
        info!(source = %self.source.describe(), "creating gazetteer store");
        let store = Arc::new(GazetteerStore::new(
            Arc::clone(&self.source),
            self.env.clone(),
        ));
        *live = Arc::downgrade(&store);
        Ok(store)
    }

    pub fn session(&self) -> Result<SearchSession> {
        Ok(SearchSession::new(self.acquire()?))
    }

    /// True while at least one holder keeps the store alive.
    pub fn is_live(&self) -> bool {
        self.live
            .lock()
            .map(|live| live.strong_count() > 0)
            .unwrap_or(false)
    }
}
