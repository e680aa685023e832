//! Observer module registry.
//!
//! Every decoded event is fanned out to each registered module in
//! registration order. A module returning an error is logged and never stops
//! the others, and never feeds back into the engine's own state.

use edscout_core::JournalEvent;
use tracing::warn;

/// How an event reached the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Freshly appended to the journal: side effects allowed.
    Live,
    /// Replayed from history during sync or import: update state only,
    /// suppress user-facing side effects.
    Historical,
}

pub trait JournalModule: Send {
    fn name(&self) -> &'static str;

    /// Called once before any events are dispatched.
    fn on_load(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn handle_event(&mut self, event: &JournalEvent, mode: DispatchMode) -> anyhow::Result<()>;

    /// Called once on clean shutdown.
    fn on_shutdown(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct ModuleBus {
    modules: Vec<Box<dyn JournalModule>>,
}

impl ModuleBus {
    pub fn new() -> ModuleBus {
        ModuleBus::default()
    }

    pub fn register(&mut self, module: Box<dyn JournalModule>) {
        tracing::info!("module loaded: {}", module.name());
        self.modules.push(module);
    }

    pub fn load_all(&mut self) {
        for module in &mut self.modules {
            if let Err(e) = module.on_load() {
                warn!("module {} failed to load: {e:#}", module.name());
            }
        }
    }

    pub fn dispatch(&mut self, event: &JournalEvent, mode: DispatchMode) {
        for module in &mut self.modules {
            if let Err(e) = module.handle_event(event, mode) {
                warn!("module {} failed on {}: {e:#}", module.name(), event.kind);
            }
        }
    }

    pub fn shutdown_all(&mut self) {
        for module in &mut self.modules {
            if let Err(e) = module.on_shutdown() {
                warn!("module {} failed to shut down: {e:#}", module.name());
            }
        }
    }
}
