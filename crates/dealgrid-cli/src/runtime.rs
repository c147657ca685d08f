// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use dealgrid_app::HostRequest;
use tracing::info;

/// Host collaborator for the standalone binary. Editors, mail, and
/// scheduling live outside this program, so requests are recorded in the
/// log for whatever tooling tails it.
#[derive(Debug, Default)]
pub struct HostRuntime {
    handled: usize,
}

impl HostRuntime {
    pub fn handled(&self) -> usize {
        self.handled
    }
}

impl dealgrid_tui::AppRuntime for HostRuntime {
    fn handle_request(&mut self, request: &HostRequest) -> Result<()> {
        self.handled += 1;
        match request {
            HostRequest::EditDeal(id)
            | HostRequest::ScheduleCall(id)
            | HostRequest::ScheduleMeeting(id) => {
                info!(kind = request.kind(), deal = %id, "host request");
            }
            HostRequest::Archive(ids) | HostRequest::SendEmail(ids) => {
                let deals = ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(",");
                info!(kind = request.kind(), count = ids.len(), deals = %deals, "host request");
            }
            HostRequest::PinColumn(column)
            | HostRequest::MoveColumn(column)
            | HostRequest::FilterByColumn(column)
            | HostRequest::ResizeToFit(column) => {
                info!(kind = request.kind(), column = %column, "host request");
            }
        }
        Ok(())
    }
}
