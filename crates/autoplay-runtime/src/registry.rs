//! Page-wide engine registry
//!
//! A process-wide, append-only list of every engine created on the page.
//! Engines are registered once at construction and never removed; the list
//! lives as long as the hosting page (created at page load, gone with the
//! process on unload).

use std::sync::Arc;

use autoplay_core::EngineId;
use parking_lot::{const_mutex, Mutex};

use crate::Engine;

/// Shared handle to a registered engine
pub type EngineHandle = Arc<Mutex<Engine>>;

static GLOBAL: Registry = Registry::new();

/// Append-only list of engines
///
/// Ids are recorded at registration, so lookups never lock an engine.
pub struct Registry {
    engines: Mutex<Vec<(EngineId, EngineHandle)>>,
}

impl Registry {
    pub const fn new() -> Self {
        Registry {
            engines: const_mutex(Vec::new()),
        }
    }

    /// The page-wide registry
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    /// Wrap and register an engine
    pub fn register(&self, engine: Engine) -> EngineHandle {
        let id = engine.id();
        let handle = Arc::new(Mutex::new(engine));
        self.engines.lock().push((id, handle.clone()));
        handle
    }

    pub fn len(&self) -> usize {
        self.engines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all handles, in registration order
    pub fn handles(&self) -> Vec<EngineHandle> {
        self.engines
            .lock()
            .iter()
            .map(|(_, handle)| handle.clone())
            .collect()
    }

    /// Look up an engine by id
    pub fn get(&self, id: EngineId) -> Option<EngineHandle> {
        self.engines
            .lock()
            .iter()
            .find(|(registered, _)| *registered == id)
            .map(|(_, handle)| handle.clone())
    }

    /// Run `f` on every engine, one lock at a time
    pub fn for_each(&self, mut f: impl FnMut(&mut Engine)) {
        for handle in self.handles() {
            f(&mut handle.lock());
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("engines", &self.len()).finish()
    }
}
