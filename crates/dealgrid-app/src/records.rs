// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::{Deal, DealId, DealPatch};

/// Boundary a production data source would implement.
pub trait DealSource {
    fn list(&self) -> Vec<Deal>;
    fn create(&mut self, deal: Deal) -> Result<()>;
    fn update(&mut self, id: &DealId, patch: &DealPatch) -> Result<bool>;
    fn delete(&mut self, id: &DealId) -> Result<bool>;
}

/// In-memory record store. Every mutation swaps in a new snapshot, so a
/// snapshot handed out earlier never changes underneath its holder.
#[derive(Debug, Clone, Default)]
pub struct DealStore {
    deals: Arc<Vec<Deal>>,
}

impl DealStore {
    pub fn new(deals: Vec<Deal>) -> Self {
        Self {
            deals: Arc::new(deals),
        }
    }

    pub fn snapshot(&self) -> Arc<Vec<Deal>> {
        Arc::clone(&self.deals)
    }

    pub fn deals(&self) -> &[Deal] {
        &self.deals
    }

    pub fn len(&self) -> usize {
        self.deals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }

    pub fn get(&self, id: &DealId) -> Option<&Deal> {
        self.deals.iter().find(|deal| &deal.id == id)
    }

    pub fn contains(&self, id: &DealId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> BTreeSet<DealId> {
        self.deals.iter().map(|deal| deal.id.clone()).collect()
    }

    pub fn create(&mut self, deal: Deal) -> Result<()> {
        if self.contains(&deal.id) {
            bail!("deal id {} already exists", deal.id);
        }
        let mut next = self.deals.as_ref().clone();
        next.push(deal);
        self.deals = Arc::new(next);
        Ok(())
    }

    /// Applies `patch` to every deal whose id is in `ids`. Returns how many matched.
    pub fn update_many(&mut self, ids: &BTreeSet<DealId>, patch: &DealPatch) -> usize {
        let mut matched = 0usize;
        let next = self
            .deals
            .iter()
            .map(|deal| {
                if ids.contains(&deal.id) {
                    matched += 1;
                    let mut updated = deal.clone();
                    patch.apply_to(&mut updated);
                    updated
                } else {
                    deal.clone()
                }
            })
            .collect::<Vec<_>>();
        if matched > 0 {
            self.deals = Arc::new(next);
        }
        matched
    }

    pub fn update(&mut self, id: &DealId, patch: &DealPatch) -> bool {
        self.update_many(&BTreeSet::from([id.clone()]), patch) > 0
    }

    /// Removes every deal whose id is in `ids`. Returns how many were removed.
    pub fn delete_many(&mut self, ids: &BTreeSet<DealId>) -> usize {
        let before = self.deals.len();
        let next = self
            .deals
            .iter()
            .filter(|deal| !ids.contains(&deal.id))
            .cloned()
            .collect::<Vec<_>>();
        let removed = before - next.len();
        if removed > 0 {
            self.deals = Arc::new(next);
        }
        removed
    }

    pub fn delete(&mut self, id: &DealId) -> bool {
        self.delete_many(&BTreeSet::from([id.clone()])) > 0
    }
}

impl DealSource for DealStore {
    fn list(&self) -> Vec<Deal> {
        self.deals.as_ref().clone()
    }

    fn create(&mut self, deal: Deal) -> Result<()> {
        DealStore::create(self, deal)
    }

    fn update(&mut self, id: &DealId, patch: &DealPatch) -> Result<bool> {
        Ok(DealStore::update(self, id, patch))
    }

    fn delete(&mut self, id: &DealId) -> Result<bool> {
        Ok(DealStore::delete(self, id))
    }
}

#[cfg(test)]
mod tests {
    use super::{DealSource, DealStore};
    use crate::{ColumnId, Deal, DealId, DealPatch, DealStage};
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Arc;
    use time::{Date, Month};

    fn deal(id: &str, value: i64) -> Deal {
        Deal {
            id: DealId::from(id),
            title: format!("Deal {id}"),
            activity: String::new(),
            stage: DealStage::Discovery,
            deal_value: value,
            contacts: Vec::new(),
            owner: "Owner".to_owned(),
            account: String::new(),
            expected_close: Date::from_calendar_date(2026, Month::June, 1).expect("valid date"),
            forecast_value: value,
            last_interaction: None,
            quote_count: 0,
            custom_fields: BTreeMap::new(),
        }
    }

    #[test]
    fn create_rejects_duplicate_ids() {
        let mut store = DealStore::new(vec![deal("1", 10)]);
        let error = store.create(deal("1", 20)).expect_err("duplicate id");
        assert!(error.to_string().contains("already exists"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn mutations_replace_the_snapshot() {
        let mut store = DealStore::new(vec![deal("1", 10), deal("2", 20)]);
        let before = store.snapshot();

        assert!(store.update(&DealId::from("2"), &DealPatch::stage(DealStage::Proposal)));
        let after = store.snapshot();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before[1].stage, DealStage::Discovery);
        assert_eq!(after[1].stage, DealStage::Proposal);
    }

    #[test]
    fn missing_ids_are_noops() {
        let mut store = DealStore::new(vec![deal("1", 10)]);
        let before = store.snapshot();

        assert!(!store.update(&DealId::from("9"), &DealPatch::owner("Nobody")));
        assert!(!store.delete(&DealId::from("9")));
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn delete_many_preserves_order_of_remaining() {
        let mut store = DealStore::new(vec![deal("1", 10), deal("2", 20), deal("3", 30)]);
        let removed = store.delete_many(&BTreeSet::from([DealId::from("2")]));
        assert_eq!(removed, 1);
        let ids = store
            .deals()
            .iter()
            .map(|deal| deal.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn custom_field_patch_sets_and_clears() {
        let mut store = DealStore::new(vec![deal("1", 10)]);
        let id = DealId::from("1");
        let field = ColumnId::from("region");

        store.update(
            &id,
            &DealPatch {
                custom_field: Some((field.clone(), "EMEA".to_owned())),
                ..DealPatch::default()
            },
        );
        assert_eq!(
            store.get(&id).and_then(|deal| deal.custom_fields.get(&field)),
            Some(&"EMEA".to_owned())
        );

        store.update(
            &id,
            &DealPatch {
                custom_field: Some((field.clone(), String::new())),
                ..DealPatch::default()
            },
        );
        assert!(store.get(&id).is_some_and(|deal| deal.custom_fields.is_empty()));
    }

    #[test]
    fn deal_source_trait_round_trips_through_store() -> anyhow::Result<()> {
        let mut source: Box<dyn DealSource> = Box::new(DealStore::default());
        source.create(deal("7", 70))?;
        assert!(source.update(&DealId::from("7"), &DealPatch::owner("Kim"))?);
        assert_eq!(source.list()[0].owner, "Kim");
        assert!(source.delete(&DealId::from("7"))?);
        assert!(source.list().is_empty());
        Ok(())
    }
}
