// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ColumnId, DealId, DealStage, SortDirection};

/// Bulk stage codes and the stage each one selects.
pub const STAGE_CODES: [(&str, DealStage); 5] = [
    ("discovery", DealStage::Discovery),
    ("proposal", DealStage::Proposal),
    ("negotiation", DealStage::Negotiation),
    ("closed-won", DealStage::ClosedWon),
    ("closed-lost", DealStage::ClosedLost),
];

/// Bulk owner codes and the display name each one assigns.
pub const OWNER_CODES: [(&str, &str); 5] = [
    ("sarah", "Sarah Chen"),
    ("marcus", "Marcus Reid"),
    ("priya", "Priya Patel"),
    ("diego", "Diego Alvarez"),
    ("emma", "Emma Wilson"),
];

/// Maps a stage code through the table, then tries the value as a code or
/// label in its own right.
pub fn lookup_stage(code: &str) -> Option<DealStage> {
    let needle = code.trim();
    STAGE_CODES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(needle))
        .map(|(_, stage)| *stage)
        .or_else(|| DealStage::parse(needle))
}

/// Maps an owner code to its display name; unmapped values pass through.
pub fn lookup_owner(code: &str) -> String {
    let needle = code.trim();
    OWNER_CODES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(needle))
        .map(|(_, name)| (*name).to_owned())
        .unwrap_or_else(|| needle.to_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Duplicate,
    ChangeOwner(String),
    ChangeStage(String),
    SendEmail,
    ScheduleCall,
    ScheduleMeeting,
    Archive,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAction {
    Sort(SortDirection),
    Filter,
    Hide,
    Pin,
    Move,
    ResizeToFit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkAction {
    Delete,
    Archive,
    ChangeStage(String),
    ChangeOwner(String),
    Email,
}

/// Side effects the grid does not perform itself; the host application
/// decides what they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRequest {
    EditDeal(DealId),
    Archive(Vec<DealId>),
    SendEmail(Vec<DealId>),
    ScheduleCall(DealId),
    ScheduleMeeting(DealId),
    PinColumn(ColumnId),
    MoveColumn(ColumnId),
    FilterByColumn(ColumnId),
    ResizeToFit(ColumnId),
}

impl HostRequest {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EditDeal(_) => "edit",
            Self::Archive(_) => "archive",
            Self::SendEmail(_) => "email",
            Self::ScheduleCall(_) => "call",
            Self::ScheduleMeeting(_) => "meeting",
            Self::PinColumn(_) => "pin",
            Self::MoveColumn(_) => "move",
            Self::FilterByColumn(_) => "filter",
            Self::ResizeToFit(_) => "resize-to-fit",
        }
    }
}

pub fn pluralize_deals(count: usize) -> String {
    if count == 1 {
        "1 deal".to_owned()
    } else {
        format!("{count} deals")
    }
}

#[cfg(test)]
mod tests {
    use super::{lookup_owner, lookup_stage, pluralize_deals};
    use crate::DealStage;

    #[test]
    fn stage_codes_map_and_fall_back_to_labels() {
        assert_eq!(lookup_stage("closed-won"), Some(DealStage::ClosedWon));
        assert_eq!(lookup_stage("Negotiation"), Some(DealStage::Negotiation));
        assert_eq!(lookup_stage("won"), None);
    }

    #[test]
    fn owner_codes_fall_back_to_raw_value() {
        assert_eq!(lookup_owner("SARAH"), "Sarah Chen");
        assert_eq!(lookup_owner(" Jo Park "), "Jo Park");
    }

    #[test]
    fn deal_counts_pluralize() {
        assert_eq!(pluralize_deals(0), "0 deals");
        assert_eq!(pluralize_deals(1), "1 deal");
        assert_eq!(pluralize_deals(3), "3 deals");
    }
}
