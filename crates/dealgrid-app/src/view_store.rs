// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use tracing::{debug, warn};

use crate::{ViewCommand, ViewState};

/// Durable single-blob slot that holds the serialized view state.
pub trait ViewSlot {
    fn read_view(&self) -> Result<Option<String>>;
    fn write_view(&mut self, blob: &str) -> Result<()>;
    fn clear_view(&mut self) -> Result<()>;
}

/// Slot that lives only as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryViewSlot {
    blob: Option<String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    writes: usize,
}

impl MemoryViewSlot {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            ..Self::default()
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Successful writes since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ViewSlot for MemoryViewSlot {
    fn read_view(&self) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(anyhow!("view slot unavailable"));
        }
        Ok(self.blob.clone())
    }

    fn write_view(&mut self, blob: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("view slot quota exceeded"));
        }
        self.blob = Some(blob.to_owned());
        self.writes += 1;
        Ok(())
    }

    fn clear_view(&mut self) -> Result<()> {
        self.blob = None;
        Ok(())
    }
}

/// Current view state plus its best-effort durable copy.
#[derive(Debug)]
pub struct ViewStore<S> {
    slot: S,
    state: ViewState,
}

impl<S: ViewSlot> ViewStore<S> {
    /// Reads the persisted blob. Missing, unreadable, or invalid data yields
    /// the default view.
    pub fn load(slot: S) -> Self {
        let state = match slot.read_view() {
            Ok(Some(raw)) => match ViewState::from_json(&raw) {
                Ok(state) => state,
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "discarding persisted view state");
                    ViewState::default()
                }
            },
            Ok(None) => {
                debug!("no persisted view state; using defaults");
                ViewState::default()
            }
            Err(error) => {
                warn!(error = %format!("{error:#}"), "cannot read persisted view state");
                ViewState::default()
            }
        };
        Self { slot, state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Swaps in `next` and persists it. Returns whether anything changed.
    pub fn replace(&mut self, next: ViewState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        self.persist();
        true
    }

    pub fn update(&mut self, transform: impl FnOnce(&ViewState) -> ViewState) -> bool {
        let next = transform(&self.state);
        self.replace(next)
    }

    pub fn apply(&mut self, command: &ViewCommand) -> bool {
        self.update(|state| state.apply(command))
    }

    fn persist(&mut self) {
        let written = self
            .state
            .to_json()
            .and_then(|blob| self.slot.write_view(&blob));
        if let Err(error) = written {
            warn!(error = %format!("{error:#}"), "cannot persist view state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryViewSlot, ViewSlot, ViewStore};
    use crate::{DealId, SortField, ViewCommand, ViewState};

    #[test]
    fn missing_blob_loads_defaults() {
        let store = ViewStore::load(MemoryViewSlot::default());
        assert_eq!(store.state(), &ViewState::default());
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn corrupted_blob_falls_back_without_error() {
        let store = ViewStore::load(MemoryViewSlot::with_blob("{\"rowSelection\": tru"));
        assert_eq!(store.state(), &ViewState::default());
    }

    #[test]
    fn read_failure_falls_back_to_defaults() {
        let slot = MemoryViewSlot {
            fail_reads: true,
            ..MemoryViewSlot::with_blob("ignored")
        };
        let store = ViewStore::load(slot);
        assert_eq!(store.state(), &ViewState::default());
    }

    #[test]
    fn updates_persist_and_reload() -> anyhow::Result<()> {
        let mut store = ViewStore::load(MemoryViewSlot::default());
        assert!(store.apply(&ViewCommand::ToggleHeaderSort(SortField::Owner)));
        assert!(store.apply(&ViewCommand::ToggleRowSelection(DealId::from("3"))));
        assert_eq!(store.slot().writes(), 2);

        let blob = store.slot().read_view()?.unwrap_or_default();
        let reloaded = ViewStore::load(MemoryViewSlot::with_blob(blob));
        assert_eq!(reloaded.state(), store.state());
        Ok(())
    }

    #[test]
    fn unchanged_state_is_not_rewritten() {
        let mut store = ViewStore::load(MemoryViewSlot::default());
        assert!(!store.replace(ViewState::default()));
        assert!(!store.apply(&ViewCommand::ClearSort));
        assert_eq!(store.slot().writes(), 0);
    }

    #[test]
    fn write_failure_still_updates_memory() {
        let slot = MemoryViewSlot {
            fail_writes: true,
            ..MemoryViewSlot::default()
        };
        let mut store = ViewStore::load(slot);
        assert!(store.update(|state| state.apply(&ViewCommand::SetSearch("acme".to_owned()))));
        assert_eq!(store.state().filters.search, "acme");
        assert!(store.slot().blob().is_none());
    }
}
