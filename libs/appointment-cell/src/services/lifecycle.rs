// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Status rules applied when an appointment is booked:
/// AV -> AC -> WL, with WL staying WL and PA closed to bookings.
#[derive(Debug, Default, Clone, Copy)]
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate that a status transition is allowed
    pub fn validate_status_transition(
        &self,
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {}", current_status, new_status);

        if !self.get_valid_transitions(current_status).contains(&new_status) {
            warn!("Invalid status transition attempted: {} -> {}", current_status, new_status);
            return Err(AppointmentError::InvalidStatusTransition {
                from: current_status,
                to: new_status,
            });
        }

        Ok(())
    }

    /// Get all valid next statuses for a given current status
    pub fn get_valid_transitions(&self, current_status: AppointmentStatus) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Available => vec![AppointmentStatus::Active],
            AppointmentStatus::Active => vec![AppointmentStatus::Waitlisted],
            // Terminal states - no transitions allowed
            AppointmentStatus::Waitlisted => vec![],
            AppointmentStatus::Processed => vec![],
        }
    }

    pub fn accepts_bookings(&self, current_status: AppointmentStatus) -> bool {
        current_status != AppointmentStatus::Processed
    }

    /// The status a booking moves the appointment to, if it moves at all.
    pub fn transition_on_booking(&self, current_status: AppointmentStatus) -> Option<AppointmentStatus> {
        if !self.accepts_bookings(current_status) {
            return None;
        }
        self.get_valid_transitions(current_status).first().copied()
    }
}
