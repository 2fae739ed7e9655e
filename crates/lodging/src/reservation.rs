use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use staybook_core::{Aggregate, AggregateId, AggregateRoot, Clock, DomainError, DomainResult};
use staybook_events::Event;

use crate::value::{GuestName, RoomType};

/// Reservation identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(pub AggregateId);

impl ReservationId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Reservation status lifecycle. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

/// Aggregate root: Reservation.
///
/// Not tied to any `Room`; callers pair `Room::reserve`/`Room::release` with
/// creation and cancellation themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReservationRecord")]
pub struct Reservation {
    id: ReservationId,
    room_type: RoomType,
    guest_name: GuestName,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    status: ReservationStatus,
    created_at: DateTime<Utc>,
    version: u64,
}

impl Reservation {
    /// Create an active reservation with a fresh identifier.
    ///
    /// Fails with a validation error when check-in is before `clock.now()` or
    /// check-out is not strictly after check-in.
    pub fn new<C: Clock + ?Sized>(
        room_type: RoomType,
        guest_name: GuestName,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        clock: &C,
    ) -> DomainResult<Self> {
        Self::with_id(
            ReservationId::new(AggregateId::new()),
            room_type,
            guest_name,
            check_in,
            check_out,
            clock,
        )
    }

    pub fn with_id<C: Clock + ?Sized>(
        id: ReservationId,
        room_type: RoomType,
        guest_name: GuestName,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        clock: &C,
    ) -> DomainResult<Self> {
        let now = clock.now();
        validate_stay(check_in, check_out, now)?;
        tracing::debug!(
            reservation_id = %id,
            room_type = %room_type,
            %check_in,
            %check_out,
            "reservation created"
        );
        Ok(Self {
            id,
            room_type,
            guest_name,
            check_in,
            check_out,
            status: ReservationStatus::Active,
            created_at: now,
            version: 0,
        })
    }

    pub fn id_typed(&self) -> ReservationId {
        self.id
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn guest_name(&self) -> &GuestName {
        &self.guest_name
    }

    pub fn check_in(&self) -> DateTime<Utc> {
        self.check_in
    }

    pub fn check_out(&self) -> DateTime<Utc> {
        self.check_out
    }

    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, ReservationStatus::Active)
    }

    /// Calendar nights between the check-in and check-out dates.
    pub fn nights(&self) -> i64 {
        (self.check_out.date_naive() - self.check_in.date_naive()).num_days()
    }

    /// Replace both dates. Only legal while active.
    pub fn modify_reservation<C: Clock + ?Sized>(
        &mut self,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
        clock: &C,
    ) -> DomainResult<()> {
        let cmd = ModifyDates {
            reservation_id: self.id,
            check_in,
            check_out,
            occurred_at: clock.now(),
        };
        self.execute(&ReservationCommand::ModifyDates(cmd))?;
        Ok(())
    }

    /// Move to `Cancelled`. A second call is an error, not a no-op.
    pub fn cancel_reservation<C: Clock + ?Sized>(&mut self, clock: &C) -> DomainResult<()> {
        let cmd = CancelReservation {
            reservation_id: self.id,
            occurred_at: clock.now(),
        };
        self.execute(&ReservationCommand::CancelReservation(cmd))?;
        Ok(())
    }
}

fn validate_stay(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    now: DateTime<Utc>,
) -> DomainResult<()> {
    if check_in < now {
        return Err(DomainError::validation("check-in date cannot be in the past"));
    }
    validate_date_order(check_in, check_out)
}

fn validate_date_order(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> DomainResult<()> {
    if check_out <= check_in {
        return Err(DomainError::validation(
            "check-out date must be after check-in date",
        ));
    }
    Ok(())
}

impl AggregateRoot for Reservation {
    type Id = ReservationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ModifyDates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyDates {
    pub reservation_id: ReservationId,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    /// Business time the change is requested at; check-in may not precede it.
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelReservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelReservation {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationCommand {
    ModifyDates(ModifyDates),
    CancelReservation(CancelReservation),
}

/// Event: DatesModified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatesModified {
    pub reservation_id: ReservationId,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ReservationCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationCancelled {
    pub reservation_id: ReservationId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationEvent {
    DatesModified(DatesModified),
    ReservationCancelled(ReservationCancelled),
}

impl Event for ReservationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ReservationEvent::DatesModified(_) => "lodging.reservation.dates_modified",
            ReservationEvent::ReservationCancelled(_) => "lodging.reservation.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ReservationEvent::DatesModified(e) => e.occurred_at,
            ReservationEvent::ReservationCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Reservation {
    type Command = ReservationCommand;
    type Event = ReservationEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ReservationEvent::DatesModified(e) => {
                self.check_in = e.check_in;
                self.check_out = e.check_out;
                tracing::debug!(
                    reservation_id = %self.id,
                    check_in = %e.check_in,
                    check_out = %e.check_out,
                    "reservation dates modified"
                );
            }
            ReservationEvent::ReservationCancelled(_) => {
                self.status = ReservationStatus::Cancelled;
                tracing::info!(reservation_id = %self.id, "reservation cancelled");
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ReservationCommand::ModifyDates(cmd) => self.handle_modify(cmd),
            ReservationCommand::CancelReservation(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl Reservation {
    fn ensure_reservation_id(&self, reservation_id: ReservationId) -> DomainResult<()> {
        if self.id != reservation_id {
            return Err(DomainError::validation("reservation_id mismatch"));
        }
        Ok(())
    }

    fn handle_modify(&self, cmd: &ModifyDates) -> DomainResult<Vec<ReservationEvent>> {
        self.ensure_reservation_id(cmd.reservation_id)?;

        if !self.is_active() {
            return Err(DomainError::invalid_state(
                "cannot modify a cancelled reservation",
            ));
        }
        validate_stay(cmd.check_in, cmd.check_out, cmd.occurred_at)?;

        Ok(vec![ReservationEvent::DatesModified(DatesModified {
            reservation_id: cmd.reservation_id,
            check_in: cmd.check_in,
            check_out: cmd.check_out,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelReservation) -> DomainResult<Vec<ReservationEvent>> {
        self.ensure_reservation_id(cmd.reservation_id)?;

        if !self.is_active() {
            return Err(DomainError::invalid_state("reservation is already cancelled"));
        }

        Ok(vec![ReservationEvent::ReservationCancelled(
            ReservationCancelled {
                reservation_id: cmd.reservation_id,
                occurred_at: cmd.occurred_at,
            },
        )])
    }
}

/// Unvalidated wire shape of a reservation.
///
/// "Now" on load is not the booking time, so check-in is checked against the
/// recorded `created_at` instead of a clock.
#[derive(Deserialize)]
struct ReservationRecord {
    id: ReservationId,
    room_type: RoomType,
    guest_name: GuestName,
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    status: ReservationStatus,
    created_at: DateTime<Utc>,
    version: u64,
}

impl TryFrom<ReservationRecord> for Reservation {
    type Error = DomainError;

    fn try_from(r: ReservationRecord) -> Result<Self, Self::Error> {
        if r.check_in < r.created_at {
            return Err(DomainError::validation(
                "check-in date cannot precede the reservation's creation",
            ));
        }
        validate_date_order(r.check_in, r.check_out)?;
        if r.status == ReservationStatus::Cancelled && r.version == 0 {
            return Err(DomainError::validation(
                "a cancelled reservation must have at least one applied event",
            ));
        }
        Ok(Self {
            id: r.id,
            room_type: r.room_type,
            guest_name: r.guest_name,
            check_in: r.check_in,
            check_out: r.check_out,
            status: r.status,
            created_at: r.created_at,
            version: r.version,
        })
    }
}
