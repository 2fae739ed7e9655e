//! Lodging domain module.
//!
//! Room capacity accounting and the reservation lifecycle, implemented purely
//! as deterministic domain logic (no IO, no storage, no wall-clock reads).

pub mod booking;
pub mod reservation;
pub mod room;
pub mod value;

pub use reservation::{
    CancelReservation, DatesModified, ModifyDates, Reservation, ReservationCancelled,
    ReservationCommand, ReservationEvent, ReservationId, ReservationStatus,
};
pub use room::{Room, RoomId, SharedRoom};
pub use value::{GuestName, RoomType};
