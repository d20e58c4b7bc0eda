//! Named engine variants
//!
//! All three architectures register themselves in a process-wide registry on
//! first use, so a front-end can pick one by name.

use engine_core::Registry;
use once_cell::sync::Lazy;
use tracing::info;

use crate::adapter::GameAdapter;
use crate::store::StoreGame;
use crate::table::TableGame;
use crate::turn::EngineConfig;
use crate::{fsm, store, table};

/// Name used when none is given
pub const DEFAULT_VARIANT: &str = fsm::NAME;

static VARIANTS: Lazy<Registry<EngineConfig, dyn GameAdapter>> = Lazy::new(|| {
    let registry: Registry<EngineConfig, dyn GameAdapter> = Registry::new();
    registry.register(fsm::NAME, |config| {
        Box::new(fsm::Game::new(config)) as Box<dyn GameAdapter>
    });
    registry.register(table::NAME, |config| {
        Box::new(TableGame::new(config)) as Box<dyn GameAdapter>
    });
    registry.register(store::NAME, |config| {
        Box::new(StoreGame::new(config)) as Box<dyn GameAdapter>
    });
    info!(variants = ?registry.list(), "engine variants registered");
    registry
});

/// Build the variant registered under `name`
pub fn create_variant(name: &str, config: EngineConfig) -> Option<Box<dyn GameAdapter>> {
    VARIANTS.create(name, config)
}

/// Registered variant names, sorted
pub fn list_variants() -> Vec<String> {
    VARIANTS.list()
}

pub fn is_variant(name: &str) -> bool {
    VARIANTS.is_registered(name)
}

/// Add or replace a variant
pub fn register_variant(name: &str, factory: fn(EngineConfig) -> Box<dyn GameAdapter>) {
    VARIANTS.register(name, factory);
}
