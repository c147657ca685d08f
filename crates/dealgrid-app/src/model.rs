// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DealStage {
    Discovery,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

impl DealStage {
    pub const ALL: [Self; 5] = [
        Self::Discovery,
        Self::Proposal,
        Self::Negotiation,
        Self::ClosedWon,
        Self::ClosedLost,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Proposal => "proposal",
            Self::Negotiation => "negotiation",
            Self::ClosedWon => "closed-won",
            Self::ClosedLost => "closed-lost",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Discovery => "Discovery",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
        }
    }

    /// Accepts either the code or the display label, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        let needle = value.trim();
        Self::ALL.into_iter().find(|stage| {
            stage.as_str().eq_ignore_ascii_case(needle) || stage.label().eq_ignore_ascii_case(needle)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Asc => "ascending",
            Self::Desc => "descending",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Record fields a sort key may reference. The identifier is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Title,
    Activity,
    Stage,
    DealValue,
    Contacts,
    Owner,
    Account,
    ExpectedClose,
    Forecast,
    LastInteraction,
    Quotes,
}

impl SortField {
    pub const ALL: [Self; 11] = [
        Self::Title,
        Self::Activity,
        Self::Stage,
        Self::DealValue,
        Self::Contacts,
        Self::Owner,
        Self::Account,
        Self::ExpectedClose,
        Self::Forecast,
        Self::LastInteraction,
        Self::Quotes,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Activity => "activity",
            Self::Stage => "stage",
            Self::DealValue => "dealValue",
            Self::Contacts => "contacts",
            Self::Owner => "owner",
            Self::Account => "account",
            Self::ExpectedClose => "expectedClose",
            Self::Forecast => "forecast",
            Self::LastInteraction => "lastInteraction",
            Self::Quotes => "quotes",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Title => "Deal",
            Self::Activity => "Activity timeline",
            Self::Stage => "Stage",
            Self::DealValue => "Deal value",
            Self::Contacts => "Contacts",
            Self::Owner => "Owner",
            Self::Account => "Account",
            Self::ExpectedClose => "Expected close",
            Self::Forecast => "Forecast",
            Self::LastInteraction => "Last interaction",
            Self::Quotes => "Quotes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub activity: String,
    pub stage: DealStage,
    pub deal_value: i64,
    pub contacts: Vec<String>,
    pub owner: String,
    pub account: String,
    pub expected_close: Date,
    pub forecast_value: i64,
    pub last_interaction: Option<Date>,
    pub quote_count: u32,
    pub custom_fields: BTreeMap<ColumnId, String>,
}

impl Deal {
    pub fn contacts_joined(&self) -> String {
        self.contacts.join(", ")
    }
}

/// Partial field update for a single deal. `None` leaves the field untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DealPatch {
    pub title: Option<String>,
    pub activity: Option<String>,
    pub stage: Option<DealStage>,
    pub deal_value: Option<i64>,
    pub contacts: Option<Vec<String>>,
    pub owner: Option<String>,
    pub account: Option<String>,
    pub expected_close: Option<Date>,
    pub forecast_value: Option<i64>,
    pub last_interaction: Option<Option<Date>>,
    pub quote_count: Option<u32>,
    pub custom_field: Option<(ColumnId, String)>,
}

impl DealPatch {
    pub fn stage(stage: DealStage) -> Self {
        Self {
            stage: Some(stage),
            ..Self::default()
        }
    }

    pub fn owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, deal: &mut Deal) {
        if let Some(title) = &self.title {
            deal.title = title.clone();
        }
        if let Some(activity) = &self.activity {
            deal.activity = activity.clone();
        }
        if let Some(stage) = self.stage {
            deal.stage = stage;
        }
        if let Some(value) = self.deal_value {
            deal.deal_value = value;
        }
        if let Some(contacts) = &self.contacts {
            deal.contacts = contacts.clone();
        }
        if let Some(owner) = &self.owner {
            deal.owner = owner.clone();
        }
        if let Some(account) = &self.account {
            deal.account = account.clone();
        }
        if let Some(date) = self.expected_close {
            deal.expected_close = date;
        }
        if let Some(value) = self.forecast_value {
            deal.forecast_value = value;
        }
        if let Some(date) = self.last_interaction {
            deal.last_interaction = date;
        }
        if let Some(count) = self.quote_count {
            deal.quote_count = count;
        }
        if let Some((field, value)) = &self.custom_field {
            if value.is_empty() {
                deal.custom_fields.remove(field);
            } else {
                deal.custom_fields.insert(field.clone(), value.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTemplate {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

pub const FIELD_TEMPLATES: [FieldTemplate; 5] = [
    FieldTemplate {
        id: "probability",
        label: "Win probability",
        description: "Estimated chance the deal closes won",
    },
    FieldTemplate {
        id: "source",
        label: "Lead source",
        description: "Channel the opportunity came from",
    },
    FieldTemplate {
        id: "priority",
        label: "Priority",
        description: "Relative urgency for the owner",
    },
    FieldTemplate {
        id: "nextStep",
        label: "Next step",
        description: "Agreed follow-up with the customer",
    },
    FieldTemplate {
        id: "region",
        label: "Region",
        description: "Sales territory",
    },
];

pub fn field_template(id: &str) -> Option<&'static FieldTemplate> {
    FIELD_TEMPLATES
        .iter()
        .find(|template| template.id.eq_ignore_ascii_case(id.trim()))
}

#[cfg(test)]
mod tests {
    use super::{DealStage, SortDirection, SortField, field_template};

    #[test]
    fn stage_parses_codes_and_labels() {
        assert_eq!(DealStage::parse("closed-won"), Some(DealStage::ClosedWon));
        assert_eq!(DealStage::parse("Closed Lost"), Some(DealStage::ClosedLost));
        assert_eq!(DealStage::parse(" PROPOSAL "), Some(DealStage::Proposal));
        assert_eq!(DealStage::parse("won"), None);
    }

    #[test]
    fn sort_field_parse_excludes_identifier() {
        assert_eq!(SortField::parse("dealValue"), Some(SortField::DealValue));
        assert_eq!(SortField::parse("id"), None);
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
    }

    #[test]
    fn field_templates_lookup_ignores_case() {
        let template = field_template("NEXTSTEP").expect("next step template");
        assert_eq!(template.label, "Next step");
        assert!(field_template("missing").is_none());
    }
}
