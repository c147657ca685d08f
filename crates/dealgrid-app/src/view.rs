// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    Column, ColumnId, ColumnKey, ColumnKind, DYNAMIC_COLUMN_WIDTH, DealId, DealStage,
    FIELD_TEMPLATES, SortDirection, SortField, clamp_width, default_columns,
};
use crate::validation::format_money;

pub const DEFAULT_VALUE_MIN: i64 = 0;
pub const DEFAULT_VALUE_MAX: i64 = 200_000;

/// Inclusive monetary range. Serialized as `[min, max]`; `min <= max` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueRange(i64, i64);

impl ValueRange {
    pub fn new(a: i64, b: i64) -> Self {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        Self(min.max(0), max.max(0))
    }

    pub const fn min(self) -> i64 {
        self.0
    }

    pub const fn max(self) -> i64 {
        self.1
    }

    pub const fn contains(self, value: i64) -> bool {
        self.0 <= value && value <= self.1
    }

    pub fn label(self) -> String {
        format!("{} to {}", format_money(self.0), format_money(self.1))
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self(DEFAULT_VALUE_MIN, DEFAULT_VALUE_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterCriteria {
    pub search: String,
    pub stages: BTreeSet<DealStage>,
    pub owners: BTreeSet<String>,
    pub deal_value_range: ValueRange,
}

impl FilterCriteria {
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortKey {
    #[serde(rename = "column")]
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// All user-configurable presentation state, persisted as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ViewState {
    pub row_selection: BTreeMap<DealId, bool>,
    pub columns: Vec<Column>,
    pub header_labels: BTreeMap<ColumnId, String>,
    pub dynamic_fields: BTreeSet<ColumnId>,
    pub expanded_rows: BTreeSet<DealId>,
    pub filters: FilterCriteria,
    pub sorting: Vec<SortKey>,
    pub column_widths: BTreeMap<ColumnId, u16>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            row_selection: BTreeMap::new(),
            columns: default_columns(),
            header_labels: BTreeMap::new(),
            dynamic_fields: BTreeSet::new(),
            expanded_rows: BTreeSet::new(),
            filters: FilterCriteria::default(),
            sorting: Vec::new(),
            column_widths: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    ToggleRowSelection(DealId),
    /// Select-all over the given (currently visible) rows.
    ToggleSelectAll(Vec<DealId>),
    /// Drops selection and expansion entries for removed rows.
    ForgetRows(BTreeSet<DealId>),
    ToggleExpanded(DealId),
    ToggleHeaderSort(SortField),
    SetSort(SortKey),
    ClearSort,
    SetColumnVisible { column: ColumnId, visible: bool },
    ShowAllColumns,
    MoveColumn { column: ColumnId, offset: isize },
    ResizeColumn { column: ColumnId, width: u16 },
    RenameHeader { column: ColumnId, label: String },
    ToggleDynamicField(ColumnId),
    SetSearch(String),
    ToggleStageFilter(DealStage),
    ToggleOwnerFilter(String),
    SetValueRange(i64, i64),
    ClearFilters,
    Reset,
}

impl ViewState {
    /// Pure transition: returns the state that results from applying `command`.
    pub fn apply(&self, command: &ViewCommand) -> Self {
        let mut next = self.clone();
        next.apply_in_place(command);
        next
    }

    fn apply_in_place(&mut self, command: &ViewCommand) {
        match command {
            ViewCommand::ToggleRowSelection(id) => {
                if self.is_selected(id) {
                    self.row_selection.remove(id);
                } else {
                    self.row_selection.insert(id.clone(), true);
                }
            }
            ViewCommand::ToggleSelectAll(visible) => self.toggle_select_all(visible),
            ViewCommand::ForgetRows(ids) => {
                self.row_selection.retain(|id, _| !ids.contains(id));
                self.expanded_rows.retain(|id| !ids.contains(id));
            }
            ViewCommand::ToggleExpanded(id) => {
                if !self.expanded_rows.remove(id) {
                    self.expanded_rows.insert(id.clone());
                }
            }
            ViewCommand::ToggleHeaderSort(field) => self.toggle_header_sort(*field),
            ViewCommand::SetSort(key) => self.sorting = vec![*key],
            ViewCommand::ClearSort => self.sorting.clear(),
            ViewCommand::SetColumnVisible { column, visible } => {
                if let Some(descriptor) = self.columns.iter_mut().find(|c| &c.id == column)
                    && !descriptor.locked
                {
                    descriptor.visible = *visible;
                }
            }
            ViewCommand::ShowAllColumns => {
                for column in &mut self.columns {
                    column.visible = true;
                }
            }
            ViewCommand::MoveColumn { column, offset } => self.move_column(column, *offset),
            ViewCommand::ResizeColumn { column, width } => {
                if self.has_column(column) {
                    self.column_widths
                        .insert(column.clone(), clamp_width(*width));
                }
            }
            ViewCommand::RenameHeader { column, label } => {
                if !self.has_column(column) {
                    return;
                }
                let label = label.trim();
                if label.is_empty() {
                    self.header_labels.remove(column);
                } else {
                    self.header_labels.insert(column.clone(), label.to_owned());
                }
            }
            ViewCommand::ToggleDynamicField(field) => {
                if !matches!(ColumnKind::resolve(field), Some(ColumnKind::Dynamic(_))) {
                    return;
                }
                if !self.dynamic_fields.remove(field) {
                    self.dynamic_fields.insert(field.clone());
                }
            }
            ViewCommand::SetSearch(search) => self.filters.search = search.clone(),
            ViewCommand::ToggleStageFilter(stage) => {
                if !self.filters.stages.remove(stage) {
                    self.filters.stages.insert(*stage);
                }
            }
            ViewCommand::ToggleOwnerFilter(owner) => {
                if !self.filters.owners.remove(owner) {
                    self.filters.owners.insert(owner.clone());
                }
            }
            ViewCommand::SetValueRange(a, b) => {
                self.filters.deal_value_range = ValueRange::new(*a, *b);
            }
            ViewCommand::ClearFilters => self.filters = FilterCriteria::default(),
            ViewCommand::Reset => *self = Self::default(),
        }
    }

    fn toggle_select_all(&mut self, visible: &[DealId]) {
        if visible.is_empty() {
            return;
        }
        if visible.iter().all(|id| self.is_selected(id)) {
            for id in visible {
                self.row_selection.remove(id);
            }
        } else {
            for id in visible {
                self.row_selection.insert(id.clone(), true);
            }
        }
    }

    /// Header click: absent -> ascending (lowest precedence) -> descending -> removed.
    fn toggle_header_sort(&mut self, field: SortField) {
        match self.sorting.iter().position(|key| key.field == field) {
            Some(index) => match self.sorting[index].direction {
                SortDirection::Asc => self.sorting[index].direction = SortDirection::Desc,
                SortDirection::Desc => {
                    self.sorting.remove(index);
                }
            },
            None => self.sorting.push(SortKey::new(field, SortDirection::Asc)),
        }
    }

    /// Moves an unlocked column among the unlocked slots; locked columns keep their positions.
    fn move_column(&mut self, column: &ColumnId, offset: isize) {
        let Some(position) = self.columns.iter().position(|c| &c.id == column) else {
            return;
        };
        if self.columns[position].locked || offset == 0 {
            return;
        }
        let slots = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.locked)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        let Some(mut slot) = slots.iter().position(|index| *index == position) else {
            return;
        };
        let last = slots.len().saturating_sub(1) as isize;
        let target = (slot as isize + offset).clamp(0, last) as usize;
        while slot != target {
            let next = if target > slot { slot + 1 } else { slot - 1 };
            self.columns.swap(slots[slot], slots[next]);
            slot = next;
        }
    }

    pub fn is_selected(&self, id: &DealId) -> bool {
        self.row_selection.get(id).copied().unwrap_or(false)
    }

    pub fn selected_ids(&self) -> BTreeSet<DealId> {
        self.row_selection
            .iter()
            .filter(|(_, selected)| **selected)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn is_expanded(&self, id: &DealId) -> bool {
        self.expanded_rows.contains(id)
    }

    fn has_column(&self, column: &ColumnId) -> bool {
        self.columns.iter().any(|c| &c.id == column) || self.dynamic_fields.contains(column)
    }

    /// Render order: visible descriptors, then selected dynamic fields in catalog order.
    pub fn visible_columns(&self) -> Vec<ColumnId> {
        let mut columns = self
            .columns
            .iter()
            .filter(|column| column.visible)
            .map(|column| column.id.clone())
            .collect::<Vec<_>>();
        columns.extend(
            FIELD_TEMPLATES
                .iter()
                .map(|template| ColumnId::from(template.id))
                .filter(|id| self.dynamic_fields.contains(id)),
        );
        columns
    }

    pub fn column_width(&self, column: &ColumnId) -> u16 {
        if let Some(width) = self.column_widths.get(column) {
            return *width;
        }
        self.columns
            .iter()
            .find(|c| &c.id == column)
            .map(|c| c.width)
            .unwrap_or(DYNAMIC_COLUMN_WIDTH)
    }

    pub fn header_label(&self, column: &ColumnId) -> String {
        if let Some(label) = self.header_labels.get(column) {
            return label.clone();
        }
        if let Some(descriptor) = self.columns.iter().find(|c| &c.id == column) {
            return descriptor.label.clone();
        }
        ColumnKind::resolve(column)
            .map(|kind| kind.default_label().to_owned())
            .unwrap_or_else(|| column.to_string())
    }

    /// 1-based precedence and direction when `field` participates in sorting.
    pub fn sort_position(&self, field: SortField) -> Option<(usize, SortDirection)> {
        self.sorting
            .iter()
            .position(|key| key.field == field)
            .map(|index| (index + 1, self.sorting[index].direction))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("encode view state")
    }

    /// Decodes a persisted blob and checks every invariant; any violation is an error.
    pub fn from_json(raw: &str) -> Result<Self> {
        let state: Self = serde_json::from_str(raw).context("decode view state")?;
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.id.clone()) {
                bail!("duplicate column id `{}`", column.id);
            }
            let Some(key) = ColumnKey::parse(column.id.as_str()) else {
                bail!("unknown column id `{}`", column.id);
            };
            if column.locked != key.is_locked() {
                bail!("column `{}` has the wrong locked flag", column.id);
            }
            if column.locked && !column.visible {
                bail!("locked column `{}` is hidden", column.id);
            }
            if clamp_width(column.width) != column.width {
                bail!("column `{}` width {} out of range", column.id, column.width);
            }
        }
        if seen.len() != ColumnKey::ALL.len() {
            bail!(
                "expected {} columns, found {}",
                ColumnKey::ALL.len(),
                seen.len()
            );
        }
        let locked_order = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.locked)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        let default_locked_order = default_columns()
            .iter()
            .enumerate()
            .filter(|(_, column)| column.locked)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        if locked_order != default_locked_order {
            bail!("locked columns moved from their fixed positions");
        }

        for field in &self.dynamic_fields {
            if !matches!(ColumnKind::resolve(field), Some(ColumnKind::Dynamic(_))) {
                bail!("unknown dynamic field `{field}`");
            }
        }
        for (column, width) in &self.column_widths {
            if !self.has_column(column) && ColumnKind::resolve(column).is_none() {
                bail!("width set for unknown column `{column}`");
            }
            if clamp_width(*width) != *width {
                bail!("column `{column}` width {width} out of range");
            }
        }
        for column in self.header_labels.keys() {
            if ColumnKind::resolve(column).is_none() {
                bail!("header label set for unknown column `{column}`");
            }
        }

        let range = self.filters.deal_value_range;
        if range.min() > range.max() || range.min() < 0 {
            bail!(
                "invalid deal value range [{}, {}]",
                range.min(),
                range.max()
            );
        }

        let mut sort_fields = BTreeSet::new();
        for key in &self.sorting {
            if !sort_fields.insert(key.field.as_str()) {
                bail!("sort field `{}` listed twice", key.field.as_str());
            }
        }
        Ok(())
    }
}
