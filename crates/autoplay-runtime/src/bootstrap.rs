//! Page bootstrap
//!
//! Finds every plugin element on the page, resolves its settings, and
//! builds one engine per target selector. A target that cannot be built
//! is skipped without affecting the others; no error leaves this module.

use std::collections::HashMap;

use autoplay_core::{AutoplayError, AutoplayResult, Timestamp};
use autoplay_state::BlockPredicate;
use tracing::info;

use crate::{
    AffordanceSink, AutoplayConfig, ConfigLayer, Engine, EngineConfig, EngineHandle,
    NavigationControls, Registry,
};

/// Data attributes of one plugin marker element
pub type Dataset = HashMap<String, String>;

/// The page, as seen by the bootstrap
pub trait PageHost {
    /// Handle to a carousel root element
    type Root;

    /// Find the carousel root; an empty selector means the default section
    fn locate_root(&self, selector: &str) -> Option<Self::Root>;

    /// Previous/next controls inside the root, in that order
    fn navigation_controls(&self, root: &Self::Root) -> NavigationControls;

    /// Page-wide block predicate for a new engine
    fn block_predicate(&self) -> Box<dyn BlockPredicate>;

    /// Play/pause controls created for the root; only asked when controls are shown
    fn affordances(&self, root: &Self::Root, config: &AutoplayConfig) -> Vec<Box<dyn AffordanceSink>>;

    /// Whether this page is the top-level frame
    fn is_top_frame(&self) -> bool;

    /// Current time on the clock the engines will be driven with
    fn now(&self) -> Timestamp;
}

/// Build a single engine for `selector`
///
/// The engine is returned unstarted.
pub fn create_engine<H: PageHost>(
    host: &H,
    selector: &str,
    config: &AutoplayConfig,
) -> AutoplayResult<Engine> {
    let root = host
        .locate_root(selector)
        .ok_or_else(|| AutoplayError::RootNotFound {
            selector: selector.to_string(),
        })?;

    let controls = host.navigation_controls(&root);
    let mut engine = Engine::new(EngineConfig::from(config), controls, host.block_predicate())?;

    if config.show_controls {
        for sink in host.affordances(&root, config) {
            engine.add_affordance(sink);
        }
    }
    Ok(engine)
}

/// Bootstrap every plugin element into the page-wide registry
pub fn bootstrap<H: PageHost>(
    host: &H,
    plugins: &[Dataset],
    global: &ConfigLayer,
) -> Vec<EngineHandle> {
    bootstrap_into(Registry::global(), host, plugins, global)
}

/// Bootstrap every plugin element into `registry`
///
/// Returns handles to the engines created, already started.
pub fn bootstrap_into<H: PageHost>(
    registry: &Registry,
    host: &H,
    plugins: &[Dataset],
    global: &ConfigLayer,
) -> Vec<EngineHandle> {
    let mut handles = Vec::new();
    let is_top = host.is_top_frame();

    for dataset in plugins {
        let local = ConfigLayer::from_dataset(dataset);
        let config = AutoplayConfig::merge([global, &local]);

        if !config.permits_frame(is_top) {
            info!("autoplay disabled in background frame");
            continue;
        }

        for selector in config.selectors() {
            match create_engine(host, &selector, &config) {
                Ok(mut engine) => {
                    engine.start(host.now());
                    handles.push(registry.register(engine));
                }
                Err(e) => info!(selector = %selector, error = %e, "autoplay instance skipped"),
            }
        }
    }

    handles
}
