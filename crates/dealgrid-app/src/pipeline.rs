// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    CellValue, ColumnId, ColumnKey, ColumnKind, Deal, DealStage, FilterCriteria, SortDirection,
    SortField, SortKey, ViewState, record_cell,
};

pub fn deal_matches(deal: &Deal, filters: &FilterCriteria) -> bool {
    matches_search(deal, &filters.search)
        && (filters.stages.is_empty() || filters.stages.contains(&deal.stage))
        && (filters.owners.is_empty() || filters.owners.contains(&deal.owner))
        && filters.deal_value_range.contains(deal.deal_value)
}

fn matches_search(deal: &Deal, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let needle = search.to_lowercase();
    [
        deal.title.as_str(),
        deal.owner.as_str(),
        deal.account.as_str(),
        deal.contacts_joined().as_str(),
    ]
    .iter()
    .any(|haystack| haystack.to_lowercase().contains(&needle))
}

/// Store indices of the deals that pass `filters`, in store order.
pub fn filter_indices(deals: &[Deal], filters: &FilterCriteria) -> Vec<usize> {
    deals
        .iter()
        .enumerate()
        .filter(|(_, deal)| deal_matches(deal, filters))
        .map(|(index, _)| index)
        .collect()
}

pub fn compare_field(left: &Deal, right: &Deal, field: SortField) -> Ordering {
    match field {
        SortField::Title => compare_text(&left.title, &right.title),
        SortField::Activity => compare_text(&left.activity, &right.activity),
        SortField::Stage => compare_text(left.stage.label(), right.stage.label()),
        SortField::DealValue => left.deal_value.cmp(&right.deal_value),
        SortField::Contacts => compare_text(&left.contacts_joined(), &right.contacts_joined()),
        SortField::Owner => compare_text(&left.owner, &right.owner),
        SortField::Account => compare_text(&left.account, &right.account),
        SortField::ExpectedClose => left.expected_close.cmp(&right.expected_close),
        SortField::Forecast => left.forecast_value.cmp(&right.forecast_value),
        SortField::LastInteraction => left.last_interaction.cmp(&right.last_interaction),
        SortField::Quotes => left.quote_count.cmp(&right.quote_count),
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

pub fn compare_deals(left: &Deal, right: &Deal, sorting: &[SortKey]) -> Ordering {
    for key in sorting {
        let ordering = compare_field(left, right, key.field);
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable sort of store indices. No sort keys leaves the order untouched.
pub fn sort_indices(deals: &[Deal], indices: &mut [usize], sorting: &[SortKey]) {
    if sorting.is_empty() {
        return;
    }
    indices.sort_by(|left, right| compare_deals(&deals[*left], &deals[*right], sorting));
}

/// Filter then sort; returns indices into `deals`.
pub fn derive_indices(deals: &[Deal], filters: &FilterCriteria, sorting: &[SortKey]) -> Vec<usize> {
    let mut indices = filter_indices(deals, filters);
    sort_indices(deals, &mut indices, sorting);
    indices
}

pub fn derive_rows<'a>(deals: &'a [Deal], view: &ViewState) -> Vec<&'a Deal> {
    derive_indices(deals, &view.filters, &view.sorting)
        .into_iter()
        .map(|index| &deals[index])
        .collect()
}

/// Derived row order memoized on the identity of the record snapshot and the
/// equality of the filter and sort inputs.
#[derive(Debug, Default)]
pub struct RowCache {
    key: Option<(Arc<Vec<Deal>>, FilterCriteria, Vec<SortKey>)>,
    indices: Vec<usize>,
    recomputes: usize,
}

impl RowCache {
    /// Recomputes when any input changed. Returns whether it did.
    pub fn refresh(&mut self, snapshot: &Arc<Vec<Deal>>, view: &ViewState) -> bool {
        if let Some((deals, filters, sorting)) = &self.key
            && Arc::ptr_eq(deals, snapshot)
            && filters == &view.filters
            && sorting == &view.sorting
        {
            return false;
        }
        self.indices = derive_indices(snapshot, &view.filters, &view.sorting);
        self.key = Some((
            Arc::clone(snapshot),
            view.filters.clone(),
            view.sorting.clone(),
        ));
        self.recomputes += 1;
        true
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn recomputes(&self) -> usize {
        self.recomputes
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Totals {
    pub visible: usize,
    pub total: usize,
    pub selected: usize,
    pub sum_value: i64,
    pub sum_forecast: i64,
    pub average_value: f64,
    pub stage_counts: BTreeMap<DealStage, usize>,
    pub owner_counts: BTreeMap<String, usize>,
    pub conversion_rate: f64,
}

pub fn compute_totals(rows: &[&Deal], total: usize, view: &ViewState) -> Totals {
    let visible = rows.len();
    let mut totals = Totals {
        visible,
        total,
        selected: view.selected_ids().len(),
        ..Totals::default()
    };
    for deal in rows {
        totals.sum_value = totals.sum_value.saturating_add(deal.deal_value);
        totals.sum_forecast = totals.sum_forecast.saturating_add(deal.forecast_value);
        *totals.stage_counts.entry(deal.stage).or_default() += 1;
        *totals.owner_counts.entry(deal.owner.clone()).or_default() += 1;
    }
    if visible > 0 {
        totals.average_value = totals.sum_value as f64 / visible as f64;
        let won = totals
            .stage_counts
            .get(&DealStage::ClosedWon)
            .copied()
            .unwrap_or(0);
        totals.conversion_rate = won as f64 / visible as f64 * 100.0;
    }
    totals
}

/// Display value for one cell. `None` for ids that name no column.
pub fn resolve_cell(deal: &Deal, column: &ColumnId, view: &ViewState) -> Option<CellValue> {
    match ColumnKind::resolve(column)? {
        ColumnKind::Static(ColumnKey::Select) => Some(CellValue::Selected(view.is_selected(&deal.id))),
        ColumnKind::Static(ColumnKey::Expand) => Some(CellValue::Expanded(view.is_expanded(&deal.id))),
        ColumnKind::Static(key) => record_cell(deal, key),
        ColumnKind::Dynamic(template) => Some(CellValue::Text(
            deal.custom_fields
                .get(&ColumnId::from(template.id))
                .cloned()
                .unwrap_or_default(),
        )),
    }
}

/// Header sort marker: a bare arrow for a single key, arrow plus precedence otherwise.
pub fn sort_indicator(view: &ViewState, column: &ColumnId) -> Option<String> {
    let field = ColumnKind::resolve(column)?.sort_field()?;
    let (position, direction) = view.sort_position(field)?;
    let indicator = if view.sorting.len() == 1 {
        match direction {
            SortDirection::Asc => "↑".to_owned(),
            SortDirection::Desc => "↓".to_owned(),
        }
    } else {
        match direction {
            SortDirection::Asc => format!("▲{position}"),
            SortDirection::Desc => format!("▼{position}"),
        }
    };
    Some(indicator)
}
