// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::validation::{
    ValidationError, ValidationResult, format_date, format_money, parse_count, parse_money,
    parse_name_list, parse_optional_date, parse_required_date, parse_required_text,
};
use crate::{ColumnId, Deal, DealPatch, DealStage, FieldTemplate, SortField, field_template};

pub const MIN_COLUMN_WIDTH: u16 = 40;
pub const MAX_COLUMN_WIDTH: u16 = 800;
pub const DYNAMIC_COLUMN_WIDTH: u16 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Select,
    Expand,
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

impl ColumnKey {
    pub const ALL: [Self; 13] = [
        Self::Select,
        Self::Expand,
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
            Self::Select => "select",
            Self::Expand => "expand",
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

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Select => "",
            Self::Expand => "",
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

    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Select | Self::Expand | Self::Title)
    }

    const fn default_visible(self) -> bool {
        !matches!(
            self,
            Self::Activity
                | Self::LastInteraction
                | Self::Quotes
                | Self::Contacts
                | Self::Account
                | Self::Forecast
        )
    }

    const fn default_width(self) -> u16 {
        match self {
            Self::Select | Self::Expand => MIN_COLUMN_WIDTH,
            Self::Title => 220,
            Self::Activity => 260,
            Self::Stage => 130,
            Self::DealValue => 120,
            Self::Contacts => 200,
            Self::Owner => 140,
            Self::Account => 160,
            Self::ExpectedClose => 130,
            Self::Forecast => 120,
            Self::LastInteraction => 140,
            Self::Quotes => 80,
        }
    }

    pub const fn sort_field(self) -> Option<SortField> {
        match self {
            Self::Select | Self::Expand => None,
            Self::Title => Some(SortField::Title),
            Self::Activity => Some(SortField::Activity),
            Self::Stage => Some(SortField::Stage),
            Self::DealValue => Some(SortField::DealValue),
            Self::Contacts => Some(SortField::Contacts),
            Self::Owner => Some(SortField::Owner),
            Self::Account => Some(SortField::Account),
            Self::ExpectedClose => Some(SortField::ExpectedClose),
            Self::Forecast => Some(SortField::Forecast),
            Self::LastInteraction => Some(SortField::LastInteraction),
            Self::Quotes => Some(SortField::Quotes),
        }
    }

    pub fn id(self) -> ColumnId {
        ColumnId::from(self.as_str())
    }
}

/// Column descriptor. Order within the view state's column list is render order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub label: String,
    pub visible: bool,
    pub locked: bool,
    pub width: u16,
}

impl Column {
    fn for_key(key: ColumnKey) -> Self {
        Self {
            id: key.id(),
            label: key.label().to_owned(),
            visible: key.default_visible(),
            locked: key.is_locked(),
            width: key.default_width(),
        }
    }
}

pub fn default_columns() -> Vec<Column> {
    ColumnKey::ALL.into_iter().map(Column::for_key).collect()
}

pub fn clamp_width(width: u16) -> u16 {
    width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

/// What a column id refers to: a static record column or a dynamic field template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Static(ColumnKey),
    Dynamic(&'static FieldTemplate),
}

impl ColumnKind {
    pub fn resolve(id: &ColumnId) -> Option<Self> {
        if let Some(key) = ColumnKey::parse(id.as_str()) {
            return Some(Self::Static(key));
        }
        field_template(id.as_str())
            .filter(|template| template.id == id.as_str())
            .map(Self::Dynamic)
    }

    pub fn default_label(self) -> &'static str {
        match self {
            Self::Static(key) => key.label(),
            Self::Dynamic(template) => template.label,
        }
    }

    pub fn sort_field(self) -> Option<SortField> {
        match self {
            Self::Static(key) => key.sort_field(),
            Self::Dynamic(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Selected(bool),
    Expanded(bool),
    Text(String),
    Money(i64),
    Date(Option<Date>),
    Count(u32),
    Stage(DealStage),
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            Self::Selected(true) => "[x]".to_owned(),
            Self::Selected(false) => "[ ]".to_owned(),
            Self::Expanded(true) => "▾".to_owned(),
            Self::Expanded(false) => "▸".to_owned(),
            Self::Text(value) => value.clone(),
            Self::Money(value) => format_money(*value),
            Self::Date(value) => format_date(*value),
            Self::Count(value) => value.to_string(),
            Self::Stage(stage) => stage.label().to_owned(),
        }
    }
}

/// Record-backed cell value for a static column. Select and expand depend on
/// view state and are resolved by the pipeline instead.
pub fn record_cell(deal: &Deal, key: ColumnKey) -> Option<CellValue> {
    let value = match key {
        ColumnKey::Select | ColumnKey::Expand => return None,
        ColumnKey::Title => CellValue::Text(deal.title.clone()),
        ColumnKey::Activity => CellValue::Text(deal.activity.clone()),
        ColumnKey::Stage => CellValue::Stage(deal.stage),
        ColumnKey::DealValue => CellValue::Money(deal.deal_value),
        ColumnKey::Contacts => CellValue::Text(deal.contacts_joined()),
        ColumnKey::Owner => CellValue::Text(deal.owner.clone()),
        ColumnKey::Account => CellValue::Text(deal.account.clone()),
        ColumnKey::ExpectedClose => CellValue::Date(Some(deal.expected_close)),
        ColumnKey::Forecast => CellValue::Money(deal.forecast_value),
        ColumnKey::LastInteraction => CellValue::Date(deal.last_interaction),
        ColumnKey::Quotes => CellValue::Count(deal.quote_count),
    };
    Some(value)
}

/// Raw text shown in an editor before the user changes it.
pub fn edit_seed(deal: &Deal, kind: ColumnKind) -> Option<String> {
    match kind {
        ColumnKind::Static(ColumnKey::DealValue) => Some(deal.deal_value.to_string()),
        ColumnKind::Static(ColumnKey::Forecast) => Some(deal.forecast_value.to_string()),
        ColumnKind::Static(ColumnKey::Stage) => Some(deal.stage.as_str().to_owned()),
        ColumnKind::Static(key) => record_cell(deal, key).map(|cell| cell.display()),
        ColumnKind::Dynamic(template) => Some(
            deal.custom_fields
                .get(&ColumnId::from(template.id))
                .cloned()
                .unwrap_or_default(),
        ),
    }
}

/// Parses raw editor text for a column into a patch.
pub fn parse_cell_edit(kind: ColumnKind, raw: &str) -> ValidationResult<DealPatch> {
    let mut patch = DealPatch::default();
    match kind {
        ColumnKind::Static(key) => match key {
            ColumnKey::Select | ColumnKey::Expand => return Err(ValidationError::ReadOnly),
            ColumnKey::Title => patch.title = Some(parse_required_text(raw)?),
            ColumnKey::Activity => patch.activity = Some(raw.trim().to_owned()),
            ColumnKey::Stage => {
                patch.stage = Some(DealStage::parse(raw).ok_or(ValidationError::InvalidStage)?);
            }
            ColumnKey::DealValue => patch.deal_value = Some(parse_money(raw)?),
            ColumnKey::Contacts => patch.contacts = Some(parse_name_list(raw)),
            ColumnKey::Owner => patch.owner = Some(parse_required_text(raw)?),
            ColumnKey::Account => patch.account = Some(raw.trim().to_owned()),
            ColumnKey::ExpectedClose => patch.expected_close = Some(parse_required_date(raw)?),
            ColumnKey::Forecast => patch.forecast_value = Some(parse_money(raw)?),
            ColumnKey::LastInteraction => {
                patch.last_interaction = Some(parse_optional_date(raw)?);
            }
            ColumnKey::Quotes => patch.quote_count = Some(parse_count(raw)?),
        },
        ColumnKind::Dynamic(template) => {
            patch.custom_field = Some((ColumnId::from(template.id), raw.trim().to_owned()));
        }
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns_hide_secondary_fields() {
        let columns = default_columns();
        let hidden = columns
            .iter()
            .filter(|column| !column.visible)
            .map(|column| column.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            hidden,
            vec![
                "activity",
                "contacts",
                "account",
                "forecast",
                "lastInteraction",
                "quotes"
            ]
        );
        assert!(columns.iter().filter(|column| column.locked).all(|column| column.visible));
    }

    #[test]
    fn column_ids_are_unique() {
        let columns = default_columns();
        let mut ids = columns.iter().map(|column| column.id.clone()).collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), columns.len());
    }

    #[test]
    fn column_kind_resolves_static_and_dynamic_ids() {
        assert_eq!(
            ColumnKind::resolve(&ColumnId::from("owner")),
            Some(ColumnKind::Static(ColumnKey::Owner))
        );
        assert!(matches!(
            ColumnKind::resolve(&ColumnId::from("region")),
            Some(ColumnKind::Dynamic(template)) if template.label == "Region"
        ));
        assert_eq!(ColumnKind::resolve(&ColumnId::from("REGION")), None);
        assert_eq!(ColumnKind::resolve(&ColumnId::from("nope")), None);
    }

    #[test]
    fn width_is_clamped() {
        assert_eq!(clamp_width(5), MIN_COLUMN_WIDTH);
        assert_eq!(clamp_width(120), 120);
        assert_eq!(clamp_width(u16::MAX), MAX_COLUMN_WIDTH);
    }

    #[test]
    fn parse_cell_edit_rejects_locked_and_invalid_values() {
        assert_eq!(
            parse_cell_edit(ColumnKind::Static(ColumnKey::Select), "x"),
            Err(ValidationError::ReadOnly)
        );
        assert_eq!(
            parse_cell_edit(ColumnKind::Static(ColumnKey::DealValue), "-10"),
            Err(ValidationError::NegativeMoney)
        );
        assert_eq!(
            parse_cell_edit(ColumnKind::Static(ColumnKey::Stage), "won"),
            Err(ValidationError::InvalidStage)
        );
    }

    #[test]
    fn parse_cell_edit_builds_patches() -> Result<(), ValidationError> {
        let patch = parse_cell_edit(ColumnKind::Static(ColumnKey::Stage), "Closed Won")?;
        assert_eq!(patch.stage, Some(DealStage::ClosedWon));

        let patch = parse_cell_edit(ColumnKind::Static(ColumnKey::Contacts), "A, B")?;
        assert_eq!(patch.contacts, Some(vec!["A".to_owned(), "B".to_owned()]));

        let patch = parse_cell_edit(ColumnKind::Static(ColumnKey::LastInteraction), "")?;
        assert_eq!(patch.last_interaction, Some(None));
        Ok(())
    }
}
