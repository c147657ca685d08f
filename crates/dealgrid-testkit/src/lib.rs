// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use dealgrid_app::{ColumnId, Deal, DealId, DealStage, MemoryViewSlot};
use std::collections::BTreeMap;
use std::path::PathBuf;
use time::macros::date;
use time::Date;

/// Builder with neutral defaults; set only what a test cares about.
#[derive(Debug, Clone)]
pub struct DealBuilder {
    deal: Deal,
}

impl DealBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            deal: Deal {
                title: format!("Deal {id}"),
                id: DealId::from(id),
                activity: String::new(),
                stage: DealStage::Discovery,
                deal_value: 10_000,
                contacts: Vec::new(),
                owner: "Sarah Chen".to_owned(),
                account: String::new(),
                expected_close: fixture_date(),
                forecast_value: 10_000,
                last_interaction: None,
                quote_count: 0,
                custom_fields: BTreeMap::new(),
            },
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.deal.title = title.into();
        self
    }

    pub fn stage(mut self, stage: DealStage) -> Self {
        self.deal.stage = stage;
        self
    }

    pub fn value(mut self, dollars: i64) -> Self {
        self.deal.deal_value = dollars;
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.deal.owner = owner.into();
        self
    }

    pub fn field(mut self, id: &str, value: impl Into<String>) -> Self {
        self.deal.custom_fields.insert(ColumnId::from(id), value.into());
        self
    }

    pub fn build(self) -> Deal {
        self.deal
    }
}

/// View slot whose reads fail, as if the backing storage were unavailable.
pub fn unreadable_slot() -> MemoryViewSlot {
    let mut slot = MemoryViewSlot::default();
    slot.fail_reads = true;
    slot
}

/// View slot that accepts reads but rejects every write.
pub fn full_slot() -> MemoryViewSlot {
    let mut slot = MemoryViewSlot::default();
    slot.fail_writes = true;
    slot
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("dealgrid.db");
    Ok((dir, db_path))
}

fn fixture_date() -> Date {
    date!(2026 - 06 - 30)
}

#[cfg(test)]
mod tests {
    use super::{DealBuilder, full_slot, unreadable_slot};
    use dealgrid_app::{DealStage, ViewSlot};

    #[test]
    fn builder_overrides_defaults() {
        let deal = DealBuilder::new("9")
            .title("Renewal")
            .stage(DealStage::ClosedWon)
            .value(50_000)
            .field("region", "EMEA")
            .build();
        assert_eq!(deal.id.as_str(), "9");
        assert_eq!(deal.title, "Renewal");
        assert_eq!(deal.stage, DealStage::ClosedWon);
        assert_eq!(deal.forecast_value, 10_000);
        assert_eq!(deal.custom_fields.len(), 1);
    }

    #[test]
    fn failing_slots_fail() {
        assert!(unreadable_slot().read_view().is_err());
        let mut slot = full_slot();
        assert!(slot.write_view("{}").is_err());
        assert!(slot.read_view().is_ok_and(|blob| blob.is_none()));
    }
}
