// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::{
    BulkAction, CellValue, ColumnAction, ColumnId, ColumnKind, Deal, DealId, DealPatch,
    DealStore, HostRequest, RowAction, RowCache, SortKey, Totals, ViewCommand, ViewSlot,
    ViewState, ViewStore, compute_totals, lookup_owner, lookup_stage,
    parse_cell_edit, pluralize_deals, resolve_cell,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCommand {
    Row { id: DealId, action: RowAction },
    Column { column: ColumnId, action: ColumnAction },
    Bulk(BulkAction),
    EditCell { id: DealId, column: ColumnId, raw: String },
    /// Select-all over the rows the pipeline currently shows.
    ToggleSelectAll,
    View(ViewCommand),
    ClearAnnouncement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    RecordsChanged,
    ViewChanged,
    Handoff(HostRequest),
    Announced(String),
}

#[derive(Debug, Default)]
struct Outcome {
    records: bool,
    view: bool,
    handoff: Option<HostRequest>,
    message: String,
}

impl Outcome {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    fn records(changed: bool, message: impl Into<String>) -> Self {
        Self {
            records: changed,
            message: message.into(),
            ..Self::default()
        }
    }

    fn view(changed: bool, message: impl Into<String>) -> Self {
        Self {
            view: changed,
            message: message.into(),
            ..Self::default()
        }
    }

    fn handoff(request: HostRequest, message: impl Into<String>) -> Self {
        Self {
            handoff: Some(request),
            message: message.into(),
            ..Self::default()
        }
    }
}

/// Records, view state, and the derived row order, driven by one dispatcher.
#[derive(Debug)]
pub struct GridState<S> {
    deals: DealStore,
    view: ViewStore<S>,
    rows: RowCache,
    announcement: Option<String>,
}

impl<S: ViewSlot> GridState<S> {
    pub fn new(deals: Vec<Deal>, slot: S) -> Self {
        let deals = DealStore::new(deals);
        let view = ViewStore::load(slot);
        let mut rows = RowCache::default();
        rows.refresh(&deals.snapshot(), view.state());
        Self {
            deals,
            view,
            rows,
            announcement: None,
        }
    }

    pub fn deals(&self) -> &DealStore {
        &self.deals
    }

    pub fn view(&self) -> &ViewState {
        self.view.state()
    }

    pub fn view_store(&self) -> &ViewStore<S> {
        &self.view
    }

    pub fn announcement(&self) -> Option<&str> {
        self.announcement.as_deref()
    }

    pub fn visible_rows(&self) -> Vec<&Deal> {
        let deals = self.deals.deals();
        self.rows
            .indices()
            .iter()
            .filter_map(|index| deals.get(*index))
            .collect()
    }

    pub fn visible_ids(&self) -> Vec<DealId> {
        self.visible_rows()
            .into_iter()
            .map(|deal| deal.id.clone())
            .collect()
    }

    pub fn totals(&self) -> Totals {
        compute_totals(&self.visible_rows(), self.deals.len(), self.view())
    }

    pub fn cell(&self, deal: &Deal, column: &ColumnId) -> Option<CellValue> {
        resolve_cell(deal, column, self.view())
    }

    /// Header label, falling back to the column id for unlabeled columns.
    pub fn column_name(&self, column: &ColumnId) -> String {
        let label = self.view().header_label(column);
        if label.is_empty() {
            column.to_string()
        } else {
            label
        }
    }

    pub fn dispatch(&mut self, command: GridCommand) -> Vec<GridEvent> {
        debug!(?command, "dispatch");
        let outcome = match command {
            GridCommand::Row { id, action } => self.dispatch_row(id, action),
            GridCommand::Column { column, action } => self.dispatch_column(column, action),
            GridCommand::Bulk(action) => self.dispatch_bulk(action),
            GridCommand::EditCell { id, column, raw } => self.edit_cell(&id, &column, &raw),
            GridCommand::ToggleSelectAll => self.toggle_select_all(),
            GridCommand::View(command) => self.dispatch_view(command),
            GridCommand::ClearAnnouncement => {
                self.announcement = None;
                return Vec::new();
            }
        };
        self.refresh_rows();

        let mut events = Vec::new();
        if outcome.records {
            events.push(GridEvent::RecordsChanged);
        }
        if outcome.view {
            events.push(GridEvent::ViewChanged);
        }
        if let Some(request) = outcome.handoff {
            events.push(GridEvent::Handoff(request));
        }
        debug!(announcement = %outcome.message, "dispatched");
        self.announcement = Some(outcome.message.clone());
        events.push(GridEvent::Announced(outcome.message));
        events
    }

    fn refresh_rows(&mut self) {
        self.rows.refresh(&self.deals.snapshot(), self.view.state());
    }

    fn dispatch_row(&mut self, id: DealId, action: RowAction) -> Outcome {
        let Some(title) = self.deals.get(&id).map(|deal| deal.title.clone()) else {
            return Outcome::message(format!("Deal {id} no longer exists"));
        };
        match action {
            RowAction::Edit => Outcome::handoff(
                HostRequest::EditDeal(id),
                format!("Edit requested for {title}"),
            ),
            RowAction::Duplicate => self.duplicate(&id),
            RowAction::ChangeOwner(code) => {
                let owner = lookup_owner(&code);
                let changed = self.deals.update(&id, &DealPatch::owner(owner.clone()));
                Outcome::records(changed, format!("Assigned {title} to {owner}"))
            }
            RowAction::ChangeStage(code) => match lookup_stage(&code) {
                Some(stage) => {
                    let changed = self.deals.update(&id, &DealPatch::stage(stage));
                    Outcome::records(changed, format!("Moved {title} to {}", stage.label()))
                }
                None => Outcome::message(format!("Unknown stage {}", code.trim())),
            },
            RowAction::SendEmail => Outcome::handoff(
                HostRequest::SendEmail(vec![id]),
                format!("Email requested for {title}"),
            ),
            RowAction::ScheduleCall => Outcome::handoff(
                HostRequest::ScheduleCall(id),
                format!("Call requested for {title}"),
            ),
            RowAction::ScheduleMeeting => Outcome::handoff(
                HostRequest::ScheduleMeeting(id),
                format!("Meeting requested for {title}"),
            ),
            RowAction::Archive => Outcome::handoff(
                HostRequest::Archive(vec![id]),
                format!("Archive requested for {title}"),
            ),
            RowAction::Delete => {
                let ids = BTreeSet::from([id]);
                let removed = self.deals.delete_many(&ids);
                let view = self.view.apply(&ViewCommand::ForgetRows(ids));
                Outcome {
                    records: removed > 0,
                    view,
                    ..Outcome::message(format!("Deleted {}", pluralize_deals(removed)))
                }
            }
        }
    }

    fn duplicate(&mut self, source_id: &DealId) -> Outcome {
        let Some(source) = self.deals.get(source_id).cloned() else {
            return Outcome::message(format!("Deal {source_id} no longer exists"));
        };
        let source_title = source.title.clone();
        let copy = Deal {
            id: self.fresh_copy_id(source_id),
            title: format!("{source_title} (Copy)"),
            ..source
        };
        match self.deals.create(copy) {
            Ok(()) => Outcome::records(true, format!("Duplicated {source_title}")),
            Err(error) => {
                warn!(error = %format!("{error:#}"), "duplicate failed");
                Outcome::message(format!("Cannot duplicate {source_title}"))
            }
        }
    }

    /// `<source>-copy-<unix millis>`, with a counter appended on collision.
    fn fresh_copy_id(&self, source: &DealId) -> DealId {
        let stamp = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let base = format!("{source}-copy-{stamp}");
        let mut candidate = DealId::from(base.as_str());
        let mut counter = 1u32;
        while self.deals.contains(&candidate) {
            counter += 1;
            candidate = DealId::from(format!("{base}-{counter}"));
        }
        candidate
    }

    fn dispatch_column(&mut self, column: ColumnId, action: ColumnAction) -> Outcome {
        let Some(kind) = ColumnKind::resolve(&column) else {
            return Outcome::message(format!("Unknown column {column}"));
        };
        let name = self.column_name(&column);
        match action {
            ColumnAction::Sort(direction) => match kind.sort_field() {
                Some(field) => {
                    let changed = self
                        .view
                        .apply(&ViewCommand::SetSort(SortKey::new(field, direction)));
                    Outcome::view(changed, format!("Sorted by {name} {}", direction.label()))
                }
                None => Outcome::message(format!("Column {name} is not sortable")),
            },
            ColumnAction::Hide => match kind {
                ColumnKind::Static(key) if !key.is_locked() => {
                    let changed = self.view.apply(&ViewCommand::SetColumnVisible {
                        column,
                        visible: false,
                    });
                    Outcome::view(changed, format!("Hid column {name}"))
                }
                _ => Outcome::message(format!("Column {name} cannot be hidden")),
            },
            ColumnAction::Filter => Outcome::handoff(
                HostRequest::FilterByColumn(column),
                format!("Filter requested for column {name}"),
            ),
            ColumnAction::Pin => Outcome::handoff(
                HostRequest::PinColumn(column),
                format!("Pin requested for column {name}"),
            ),
            ColumnAction::Move => Outcome::handoff(
                HostRequest::MoveColumn(column),
                format!("Move requested for column {name}"),
            ),
            ColumnAction::ResizeToFit => Outcome::handoff(
                HostRequest::ResizeToFit(column),
                format!("Resize to fit requested for column {name}"),
            ),
        }
    }

    fn dispatch_bulk(&mut self, action: BulkAction) -> Outcome {
        let selected = self
            .view()
            .selected_ids()
            .into_iter()
            .filter(|id| self.deals.contains(id))
            .collect::<BTreeSet<_>>();
        if selected.is_empty() {
            return Outcome::message("No deals selected");
        }
        let count = pluralize_deals(selected.len());
        match action {
            BulkAction::Delete => {
                let removed = self.deals.delete_many(&selected);
                let view = self.view.apply(&ViewCommand::ForgetRows(selected));
                Outcome {
                    records: removed > 0,
                    view,
                    ..Outcome::message(format!("Deleted {}", pluralize_deals(removed)))
                }
            }
            BulkAction::Archive => Outcome::handoff(
                HostRequest::Archive(selected.into_iter().collect()),
                format!("Archive requested for {count}"),
            ),
            BulkAction::Email => Outcome::handoff(
                HostRequest::SendEmail(selected.into_iter().collect()),
                format!("Email requested for {count}"),
            ),
            BulkAction::ChangeStage(code) => match lookup_stage(&code) {
                Some(stage) => {
                    let changed = self.deals.update_many(&selected, &DealPatch::stage(stage));
                    Outcome::records(changed > 0, format!("Moved {count} to {}", stage.label()))
                }
                None => Outcome::message(format!("Unknown stage {}", code.trim())),
            },
            BulkAction::ChangeOwner(code) => {
                let owner = lookup_owner(&code);
                let changed = self
                    .deals
                    .update_many(&selected, &DealPatch::owner(owner.clone()));
                Outcome::records(changed > 0, format!("Assigned {count} to {owner}"))
            }
        }
    }

    fn edit_cell(&mut self, id: &DealId, column: &ColumnId, raw: &str) -> Outcome {
        let Some(title) = self.deals.get(id).map(|deal| deal.title.clone()) else {
            return Outcome::message(format!("Deal {id} no longer exists"));
        };
        let Some(kind) = ColumnKind::resolve(column) else {
            return Outcome::message(format!("Unknown column {column}"));
        };
        let name = self.column_name(column);
        match parse_cell_edit(kind, raw) {
            Ok(patch) => {
                let changed = self.deals.update(id, &patch);
                Outcome::records(changed, format!("Updated {name} for {title}"))
            }
            Err(error) => Outcome::message(format!("Cannot update {name}: {error}")),
        }
    }

    fn toggle_select_all(&mut self) -> Outcome {
        let visible = self.visible_ids();
        if visible.is_empty() {
            return Outcome::message("No deals visible");
        }
        let count = pluralize_deals(visible.len());
        let changed = self.view.apply(&ViewCommand::ToggleSelectAll(visible.clone()));
        let message = if visible.iter().all(|id| self.view().is_selected(id)) {
            format!("Selected {count}")
        } else {
            format!("Cleared selection of {count}")
        };
        Outcome::view(changed, message)
    }

    fn dispatch_view(&mut self, command: ViewCommand) -> Outcome {
        if let ViewCommand::ToggleRowSelection(id) | ViewCommand::ToggleExpanded(id) = &command
            && !self.deals.contains(id)
        {
            return Outcome::message(format!("Deal {id} no longer exists"));
        }
        let before = self.view().clone();
        let changed = self.view.apply(&command);
        self.refresh_rows();
        Outcome::view(changed, self.describe_view(&before, &command))
    }

    fn describe_view(&self, before: &ViewState, command: &ViewCommand) -> String {
        let after = self.view();
        let title = |id: &DealId| {
            self.deals
                .get(id)
                .map(|deal| deal.title.clone())
                .unwrap_or_else(|| id.to_string())
        };
        let shown = || {
            format!(
                "{} of {} shown",
                self.rows.indices().len(),
                pluralize_deals(self.deals.len())
            )
        };
        match command {
            ViewCommand::ToggleRowSelection(id) => {
                if after.is_selected(id) {
                    format!("Selected {}", title(id))
                } else {
                    format!("Deselected {}", title(id))
                }
            }
            ViewCommand::ToggleSelectAll(ids) => {
                if ids.iter().all(|id| after.is_selected(id)) {
                    format!("Selected {}", pluralize_deals(ids.len()))
                } else {
                    format!("Cleared selection of {}", pluralize_deals(ids.len()))
                }
            }
            ViewCommand::ForgetRows(ids) => {
                format!("Cleared {} from the view", pluralize_deals(ids.len()))
            }
            ViewCommand::ToggleExpanded(id) => {
                if after.is_expanded(id) {
                    format!("Expanded {}", title(id))
                } else {
                    format!("Collapsed {}", title(id))
                }
            }
            ViewCommand::ToggleHeaderSort(field) => {
                let name = self.column_name(&ColumnId::from(field.as_str()));
                match after.sort_position(*field) {
                    Some((_, direction)) => format!("Sorted by {name} {}", direction.label()),
                    None => format!("Removed sort on {name}"),
                }
            }
            ViewCommand::SetSort(key) => format!(
                "Sorted by {} {}",
                self.column_name(&ColumnId::from(key.field.as_str())),
                key.direction.label()
            ),
            ViewCommand::ClearSort => "Cleared sorting".to_owned(),
            ViewCommand::SetColumnVisible { column, visible } => {
                let name = self.column_name(column);
                let locked = before
                    .columns
                    .iter()
                    .any(|descriptor| &descriptor.id == column && descriptor.locked);
                if locked && !visible {
                    format!("Column {name} cannot be hidden")
                } else if *visible {
                    format!("Showed column {name}")
                } else {
                    format!("Hid column {name}")
                }
            }
            ViewCommand::ShowAllColumns => "Showing all columns".to_owned(),
            ViewCommand::MoveColumn { column, offset } => {
                let name = self.column_name(column);
                if before.columns == after.columns {
                    format!("Column {name} cannot move further")
                } else if *offset < 0 {
                    format!("Moved column {name} left")
                } else {
                    format!("Moved column {name} right")
                }
            }
            ViewCommand::ResizeColumn { column, .. } => format!(
                "Resized {} to {} px",
                self.column_name(column),
                after.column_width(column)
            ),
            ViewCommand::RenameHeader { column, label } => {
                let previous = before.header_label(column);
                if label.trim().is_empty() {
                    format!("Reset header {previous} to {}", after.header_label(column))
                } else {
                    format!("Renamed {previous} to {}", label.trim())
                }
            }
            ViewCommand::ToggleDynamicField(field) => match ColumnKind::resolve(field) {
                Some(ColumnKind::Dynamic(template)) => {
                    if after.dynamic_fields.contains(field) {
                        format!("Added field {}", template.label)
                    } else {
                        format!("Removed field {}", template.label)
                    }
                }
                _ => format!("Unknown field {field}"),
            },
            ViewCommand::SetSearch(search) => {
                if search.is_empty() {
                    format!("Cleared search, {}", shown())
                } else {
                    format!("Searching for \"{search}\", {}", shown())
                }
            }
            ViewCommand::ToggleStageFilter(stage) => {
                if after.filters.stages.contains(stage) {
                    format!("Filtering stage {}, {}", stage.label(), shown())
                } else {
                    format!("Removed stage filter {}, {}", stage.label(), shown())
                }
            }
            ViewCommand::ToggleOwnerFilter(owner) => {
                if after.filters.owners.contains(owner) {
                    format!("Filtering owner {owner}, {}", shown())
                } else {
                    format!("Removed owner filter {owner}, {}", shown())
                }
            }
            ViewCommand::SetValueRange(..) => format!(
                "Deal value range {}, {}",
                after.filters.deal_value_range.label(),
                shown()
            ),
            ViewCommand::ClearFilters => format!("Cleared filters, {}", shown()),
            ViewCommand::Reset => "Reset view to defaults".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{GridCommand, GridEvent, GridState};
    use crate::{
        BulkAction, ColumnAction, ColumnId, Deal, DealId, DealStage, HostRequest, MemoryViewSlot,
        RowAction, SortDirection, SortField, SortKey, ViewCommand,
    };
    use std::collections::BTreeMap;
    use time::{Date, Month};

    fn deal(id: &str, title: &str, value: i64, stage: DealStage) -> Deal {
        Deal {
            id: DealId::from(id),
            title: title.to_owned(),
            activity: String::new(),
            stage,
            deal_value: value,
            contacts: Vec::new(),
            owner: "Marcus Reid".to_owned(),
            account: String::new(),
            expected_close: Date::from_calendar_date(2026, Month::July, 1).expect("valid date"),
            forecast_value: value,
            last_interaction: None,
            quote_count: 0,
            custom_fields: BTreeMap::new(),
        }
    }

    fn grid() -> GridState<MemoryViewSlot> {
        GridState::new(
            vec![
                deal("1", "Acme renewal", 125_000, DealStage::Proposal),
                deal("2", "Globex pilot", 85_000, DealStage::Negotiation),
                deal("3", "Initech upgrade", 45_000, DealStage::ClosedWon),
            ],
            MemoryViewSlot::default(),
        )
    }

    fn select(grid: &mut GridState<MemoryViewSlot>, ids: &[&str]) {
        for id in ids {
            grid.dispatch(GridCommand::View(ViewCommand::ToggleRowSelection(
                DealId::from(*id),
            )));
        }
    }

    fn announced(events: &[GridEvent]) -> Option<&str> {
        events.iter().find_map(|event| match event {
            GridEvent::Announced(message) => Some(message.as_str()),
            _ => None,
        })
    }

    #[test]
    fn duplicate_appends_unique_copy() {
        let mut grid = grid();
        let events = grid.dispatch(GridCommand::Row {
            id: DealId::from("1"),
            action: RowAction::Duplicate,
        });
        assert_eq!(grid.deals().len(), 4);
        assert_eq!(announced(&events), Some("Duplicated Acme renewal"));

        let copy = &grid.deals().deals()[3];
        assert!(copy.title.ends_with(" (Copy)"));
        assert!(copy.id.as_str().starts_with("1-copy-"));
        assert_eq!(copy.deal_value, 125_000);
        assert_eq!(grid.deals().ids().len(), 4);
    }

    #[test]
    fn duplicating_twice_never_collides() {
        let mut grid = grid();
        for _ in 0..3 {
            grid.dispatch(GridCommand::Row {
                id: DealId::from("1"),
                action: RowAction::Duplicate,
            });
        }
        assert_eq!(grid.deals().len(), 6);
        assert_eq!(grid.deals().ids().len(), 6);
    }

    #[test]
    fn bulk_delete_removes_selected_and_clears_selection() {
        let mut grid = grid();
        select(&mut grid, &["1", "3"]);

        let events = grid.dispatch(GridCommand::Bulk(BulkAction::Delete));
        assert_eq!(grid.deals().len(), 1);
        assert!(grid.view().row_selection.is_empty());
        assert_eq!(announced(&events), Some("Deleted 2 deals"));
        assert!(events.contains(&GridEvent::RecordsChanged));
        assert_eq!(grid.visible_ids(), vec![DealId::from("2")]);
    }

    #[test]
    fn row_delete_pluralizes_single_deal() {
        let mut grid = grid();
        grid.dispatch(GridCommand::View(ViewCommand::ToggleExpanded(DealId::from("2"))));
        let events = grid.dispatch(GridCommand::Row {
            id: DealId::from("2"),
            action: RowAction::Delete,
        });
        assert_eq!(announced(&events), Some("Deleted 1 deal"));
        assert!(grid.view().expanded_rows.is_empty());
    }

    #[test]
    fn bulk_with_empty_selection_is_a_noop() {
        let mut grid = grid();
        let events = grid.dispatch(GridCommand::Bulk(BulkAction::Delete));
        assert_eq!(events, vec![GridEvent::Announced("No deals selected".to_owned())]);
        assert_eq!(grid.deals().len(), 3);
    }

    #[test]
    fn bulk_stage_change_maps_codes() {
        let mut grid = grid();
        select(&mut grid, &["1", "2"]);
        let events = grid.dispatch(GridCommand::Bulk(BulkAction::ChangeStage(
            "closed-won".to_owned(),
        )));
        assert_eq!(announced(&events), Some("Moved 2 deals to Closed Won"));
        assert!(
            grid.deals()
                .deals()
                .iter()
                .all(|deal| deal.stage == DealStage::ClosedWon)
        );

        let events = grid.dispatch(GridCommand::Bulk(BulkAction::ChangeStage("won".to_owned())));
        assert_eq!(announced(&events), Some("Unknown stage won"));
    }

    #[test]
    fn bulk_owner_change_falls_back_to_raw_value() {
        let mut grid = grid();
        select(&mut grid, &["2"]);
        let events = grid.dispatch(GridCommand::Bulk(BulkAction::ChangeOwner("sarah".to_owned())));
        assert_eq!(announced(&events), Some("Assigned 1 deal to Sarah Chen"));

        grid.dispatch(GridCommand::Bulk(BulkAction::ChangeOwner("Jo Park".to_owned())));
        assert_eq!(
            grid.deals().get(&DealId::from("2")).map(|deal| deal.owner.as_str()),
            Some("Jo Park")
        );
    }

    #[test]
    fn bulk_archive_hands_off_selected_ids() {
        let mut grid = grid();
        select(&mut grid, &["3", "1"]);
        let events = grid.dispatch(GridCommand::Bulk(BulkAction::Archive));
        assert_eq!(
            events,
            vec![
                GridEvent::Handoff(HostRequest::Archive(vec![
                    DealId::from("1"),
                    DealId::from("3")
                ])),
                GridEvent::Announced("Archive requested for 2 deals".to_owned()),
            ]
        );
        assert_eq!(grid.deals().len(), 3);
    }

    #[test]
    fn column_sort_replaces_sorting_with_single_key() {
        let mut grid = grid();
        grid.dispatch(GridCommand::View(ViewCommand::ToggleHeaderSort(SortField::Title)));
        grid.dispatch(GridCommand::View(ViewCommand::ToggleHeaderSort(SortField::Owner)));

        let events = grid.dispatch(GridCommand::Column {
            column: ColumnId::from("dealValue"),
            action: ColumnAction::Sort(SortDirection::Desc),
        });
        assert_eq!(announced(&events), Some("Sorted by Deal value descending"));
        assert_eq!(
            grid.view().sorting,
            vec![SortKey::new(SortField::DealValue, SortDirection::Desc)]
        );
        assert_eq!(
            grid.visible_ids(),
            vec![DealId::from("1"), DealId::from("2"), DealId::from("3")]
        );
    }

    #[test]
    fn column_hide_respects_locks() {
        let mut grid = grid();
        let events = grid.dispatch(GridCommand::Column {
            column: ColumnId::from("owner"),
            action: ColumnAction::Hide,
        });
        assert_eq!(announced(&events), Some("Hid column Owner"));
        assert!(!grid.view().visible_columns().contains(&ColumnId::from("owner")));

        let events = grid.dispatch(GridCommand::Column {
            column: ColumnId::from("title"),
            action: ColumnAction::Hide,
        });
        assert_eq!(announced(&events), Some("Column Deal cannot be hidden"));
        assert!(grid.view().visible_columns().contains(&ColumnId::from("title")));
    }

    #[test]
    fn column_handoffs_carry_the_column() {
        let mut grid = grid();
        let events = grid.dispatch(GridCommand::Column {
            column: ColumnId::from("stage"),
            action: ColumnAction::Pin,
        });
        assert!(events.contains(&GridEvent::Handoff(HostRequest::PinColumn(ColumnId::from(
            "stage"
        )))));
        assert_eq!(grid.announcement(), Some("Pin requested for column Stage"));
    }

    #[test]
    fn edit_cell_applies_or_reports_parse_errors() {
        let mut grid = grid();
        let events = grid.dispatch(GridCommand::EditCell {
            id: DealId::from("2"),
            column: ColumnId::from("dealValue"),
            raw: "$90,000".to_owned(),
        });
        assert_eq!(announced(&events), Some("Updated Deal value for Globex pilot"));
        assert_eq!(
            grid.deals().get(&DealId::from("2")).map(|deal| deal.deal_value),
            Some(90_000)
        );

        let events = grid.dispatch(GridCommand::EditCell {
            id: DealId::from("2"),
            column: ColumnId::from("dealValue"),
            raw: "lots".to_owned(),
        });
        assert_eq!(
            announced(&events),
            Some("Cannot update Deal value: invalid money value")
        );
        assert!(!events.contains(&GridEvent::RecordsChanged));
    }

    #[test]
    fn missing_rows_are_noops() {
        let mut grid = grid();
        let events = grid.dispatch(GridCommand::Row {
            id: DealId::from("99"),
            action: RowAction::Delete,
        });
        assert_eq!(events, vec![GridEvent::Announced("Deal 99 no longer exists".to_owned())]);

        grid.dispatch(GridCommand::View(ViewCommand::ToggleRowSelection(DealId::from("99"))));
        assert!(grid.view().row_selection.is_empty());
    }

    #[test]
    fn select_all_follows_visible_rows() {
        let mut grid = grid();
        grid.dispatch(GridCommand::View(ViewCommand::ToggleStageFilter(
            DealStage::Proposal,
        )));
        let events = grid.dispatch(GridCommand::ToggleSelectAll);
        assert_eq!(announced(&events), Some("Selected 1 deal"));
        assert_eq!(grid.totals().selected, 1);

        grid.dispatch(GridCommand::View(ViewCommand::ClearFilters));
        assert_eq!(grid.view().selected_ids().len(), 1);

        grid.dispatch(GridCommand::ToggleSelectAll);
        assert_eq!(grid.view().selected_ids().len(), 3);
        let events = grid.dispatch(GridCommand::ToggleSelectAll);
        assert_eq!(announced(&events), Some("Cleared selection of 3 deals"));
        assert!(grid.view().selected_ids().is_empty());
    }

    #[test]
    fn view_changes_persist_to_slot() {
        let mut grid = grid();
        let events = grid.dispatch(GridCommand::View(ViewCommand::ToggleHeaderSort(
            SortField::DealValue,
        )));
        assert_eq!(
            events,
            vec![
                GridEvent::ViewChanged,
                GridEvent::Announced("Sorted by Deal value ascending".to_owned()),
            ]
        );
        assert_eq!(grid.view_store().slot().writes(), 1);
        assert_eq!(
            grid.visible_ids(),
            vec![DealId::from("3"), DealId::from("2"), DealId::from("1")]
        );
    }

    #[test]
    fn search_announcement_reports_visible_count() {
        let mut grid = grid();
        let events = grid.dispatch(GridCommand::View(ViewCommand::SetSearch("acme".to_owned())));
        assert_eq!(
            announced(&events),
            Some("Searching for \"acme\", 1 of 3 deals shown")
        );
    }

    #[test]
    fn clear_announcement_emits_nothing() {
        let mut grid = grid();
        grid.dispatch(GridCommand::ToggleSelectAll);
        assert!(grid.announcement().is_some());
        assert!(grid.dispatch(GridCommand::ClearAnnouncement).is_empty());
        assert_eq!(grid.announcement(), None);
    }
}
