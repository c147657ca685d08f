// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use dealgrid_app::{ColumnId, Deal, DealId, DealStage};
use std::collections::BTreeMap;
use time::macros::date;

fn contacts(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<ColumnId, String> {
    pairs
        .iter()
        .map(|(id, value)| (ColumnId::from(*id), (*value).to_owned()))
        .collect()
}

/// Demo catalog the grid starts with.
pub fn seed_deals() -> Vec<Deal> {
    vec![
        Deal {
            id: DealId::from("1"),
            title: "Acme Corp platform renewal".to_owned(),
            activity: "Pricing review call scheduled; legal redlines pending".to_owned(),
            stage: DealStage::Proposal,
            deal_value: 125_000,
            contacts: contacts(&["Ana Ruiz", "Tom Becker"]),
            owner: "Sarah Chen".to_owned(),
            account: "Acme Corp".to_owned(),
            expected_close: date!(2026 - 11 - 14),
            forecast_value: 112_500,
            last_interaction: Some(date!(2026 - 10 - 12)),
            quote_count: 2,
            custom_fields: fields(&[("probability", "60%"), ("region", "North America")]),
        },
        Deal {
            id: DealId::from("2"),
            title: "Globex analytics expansion".to_owned(),
            activity: "Security questionnaire returned".to_owned(),
            stage: DealStage::Negotiation,
            deal_value: 95_000,
            contacts: contacts(&["Lena Ortiz"]),
            owner: "Marcus Reid".to_owned(),
            account: "Globex".to_owned(),
            expected_close: date!(2026 - 10 - 31),
            forecast_value: 95_000,
            last_interaction: Some(date!(2026 - 10 - 15)),
            quote_count: 3,
            custom_fields: fields(&[("priority", "High"), ("nextStep", "Final pricing")]),
        },
        Deal {
            id: DealId::from("3"),
            title: "Initech support tier upgrade".to_owned(),
            activity: "Discovery workshop held with IT leads".to_owned(),
            stage: DealStage::Discovery,
            deal_value: 85_000,
            contacts: contacts(&["Peter Gibbons", "Joanna Park"]),
            owner: "Priya Patel".to_owned(),
            account: "Initech".to_owned(),
            expected_close: date!(2027 - 01 - 20),
            forecast_value: 76_500,
            last_interaction: Some(date!(2026 - 09 - 30)),
            quote_count: 0,
            custom_fields: fields(&[("source", "Inbound")]),
        },
        Deal {
            id: DealId::from("4"),
            title: "Umbrella field service rollout".to_owned(),
            activity: "Contract signed".to_owned(),
            stage: DealStage::ClosedWon,
            deal_value: 65_000,
            contacts: contacts(&["Alice Marsh"]),
            owner: "Diego Alvarez".to_owned(),
            account: "Umbrella".to_owned(),
            expected_close: date!(2026 - 09 - 28),
            forecast_value: 65_000,
            last_interaction: Some(date!(2026 - 09 - 28)),
            quote_count: 1,
            custom_fields: fields(&[("region", "EMEA")]),
        },
        Deal {
            id: DealId::from("5"),
            title: "Stark onboarding pilot".to_owned(),
            activity: "Budget moved to next fiscal year".to_owned(),
            stage: DealStage::ClosedLost,
            deal_value: 45_000,
            contacts: Vec::new(),
            owner: "Emma Wilson".to_owned(),
            account: "Stark Industries".to_owned(),
            expected_close: date!(2026 - 10 - 05),
            forecast_value: 40_500,
            last_interaction: None,
            quote_count: 1,
            custom_fields: BTreeMap::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::seed_deals;
    use dealgrid_app::DealStage;
    use std::collections::BTreeSet;

    #[test]
    fn seed_catalog_is_consistent() {
        let deals = seed_deals();
        assert_eq!(deals.len(), 5);
        let ids = deals.iter().map(|deal| &deal.id).collect::<BTreeSet<_>>();
        assert_eq!(ids.len(), 5);
        assert_eq!(
            deals
                .iter()
                .filter(|deal| deal.stage == DealStage::ClosedWon)
                .count(),
            1
        );
        assert!(deals.iter().all(|deal| deal.forecast_value <= deal.deal_value));
    }
}
