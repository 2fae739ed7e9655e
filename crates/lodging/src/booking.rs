//! Caller-side booking workflow.
//!
//! `Room` and `Reservation` do not know about each other. These helpers pair
//! a reservation's lifecycle with a room's capacity for callers that want the
//! usual wiring; nothing else in the crate depends on them.

use chrono::{DateTime, Utc};

use staybook_core::{Clock, DomainError, DomainResult};

use crate::reservation::Reservation;
use crate::room::SharedRoom;
use crate::value::GuestName;

/// Validate a stay and take one unit of the room for it.
///
/// Either both happen or neither does: the reservation is validated first and
/// dropped if the room turns out to be full.
pub fn book<C: Clock + ?Sized>(
    room: &SharedRoom,
    guest_name: GuestName,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    clock: &C,
) -> DomainResult<Reservation> {
    let reservation = Reservation::new(room.room_type(), guest_name, check_in, check_out, clock)?;
    room.reserve()?;
    tracing::info!(
        room_id = %room.id_typed(),
        reservation_id = %reservation.id_typed(),
        "booking confirmed"
    );
    Ok(reservation)
}

/// Cancel a reservation and return its unit to the room.
///
/// The reservation is only cancelled once a unit was actually returned; a room
/// with nothing reserved is refused and the reservation stays active.
pub fn cancel<C: Clock + ?Sized>(
    room: &SharedRoom,
    reservation: &mut Reservation,
    clock: &C,
) -> DomainResult<()> {
    if reservation.room_type() != room.room_type() {
        return Err(DomainError::validation(format!(
            "reservation is for a {} room, not {}",
            reservation.room_type(),
            room.room_type()
        )));
    }
    if !reservation.is_active() {
        return Err(DomainError::invalid_state("reservation is already cancelled"));
    }
    if !room.release() {
        return Err(DomainError::invalid_state(format!(
            "room {} has no reserved unit to release",
            room.id_typed()
        )));
    }
    // Undo the release if the cancellation is refused.
    if let Err(e) = reservation.cancel_reservation(clock) {
        let _ = room.reserve();
        return Err(e);
    }
    tracing::info!(
        room_id = %room.id_typed(),
        reservation_id = %reservation.id_typed(),
        "booking cancelled"
    );
    Ok(())
}
