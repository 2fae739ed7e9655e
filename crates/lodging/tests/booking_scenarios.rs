//! End-to-end scenarios against the public lodging API.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use staybook_core::{AggregateRoot, Clock, DomainError, DomainResult, FixedClock, SystemClock};
use staybook_lodging::{
    GuestName, Reservation, ReservationStatus, Room, RoomType, SharedRoom, booking,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2031, 11, 2, 8, 30, 0).unwrap()
}

fn days(n: i64) -> DateTime<Utc> {
    now() + Duration::days(n)
}

fn clock() -> FixedClock {
    staybook_observability::init();
    FixedClock::new(now())
}

#[test]
fn deluxe_room_fills_and_frees() -> anyhow::Result<()> {
    let mut room = Room::new(RoomType::new("Deluxe")?, 2)?;
    room.reserve()?;
    room.reserve()?;
    assert!(!room.is_available());
    assert!(room.release());
    assert!(room.is_available());
    Ok(())
}

#[test]
fn single_suite_rejects_second_reserve() -> anyhow::Result<()> {
    let mut room = Room::new(RoomType::new("Suite")?, 1)?;
    room.reserve()?;
    let err = room.reserve().unwrap_err();
    assert!(matches!(err, DomainError::CapacityExceeded { capacity: 1 }));
    Ok(())
}

#[test]
fn valid_reservation_exposes_its_labels() -> anyhow::Result<()> {
    let reservation = Reservation::new(
        RoomType::new("Deluxe")?,
        GuestName::new("Jane Doe")?,
        days(2),
        days(7),
        &clock(),
    )?;
    assert_eq!(reservation.room_type().as_str(), "Deluxe");
    assert_eq!(reservation.guest_name().name(), "Jane Doe");
    Ok(())
}

#[test]
fn reservation_against_the_system_clock() -> anyhow::Result<()> {
    let clock = SystemClock;
    let start = clock.now() + Duration::days(2);
    let reservation = Reservation::new(
        RoomType::Deluxe,
        GuestName::new("Jane Doe")?,
        start,
        start + Duration::days(5),
        &clock,
    )?;
    assert!(reservation.is_active());
    Ok(())
}

#[test]
fn past_check_in_fails_validation() -> anyhow::Result<()> {
    let err = Reservation::new(
        RoomType::new("Standard")?,
        GuestName::new("John Doe")?,
        days(-1),
        days(1),
        &clock(),
    )
    .unwrap_err();
    assert!(err.is_validation());
    Ok(())
}

#[test]
fn same_day_checkout_fails_validation() -> anyhow::Result<()> {
    let err = Reservation::new(
        RoomType::new("Standard")?,
        GuestName::new("John Doe")?,
        days(1),
        days(1),
        &clock(),
    )
    .unwrap_err();
    assert!(err.is_validation());
    Ok(())
}

#[test]
fn cancelled_reservation_refuses_further_transitions() -> anyhow::Result<()> {
    let clock = clock();
    let mut reservation = Reservation::new(
        RoomType::Deluxe,
        GuestName::new("Jane Doe")?,
        days(2),
        days(7),
        &clock,
    )?;

    reservation.cancel_reservation(&clock)?;
    assert_eq!(reservation.status(), ReservationStatus::Cancelled);

    assert!(reservation.cancel_reservation(&clock).unwrap_err().is_invalid_state());
    assert!(
        reservation
            .modify_reservation(days(3), days(8), &clock)
            .unwrap_err()
            .is_invalid_state()
    );
    assert_eq!(reservation.check_in(), days(2));
    assert_eq!(reservation.check_out(), days(7));
    assert_eq!(reservation.version(), 1);
    Ok(())
}

#[test]
fn modify_then_cancel_through_a_shared_clock() -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(clock());
    let mut reservation = Reservation::new(
        RoomType::Suite,
        GuestName::new("Grace Hopper")?,
        days(2),
        days(7),
        clock.as_ref(),
    )?;
    reservation.modify_reservation(days(3), days(8), clock.as_ref())?;
    assert_eq!(reservation.check_in(), days(3));
    assert_eq!(reservation.check_out(), days(8));
    assert_eq!(reservation.nights(), 5);

    reservation.cancel_reservation(&clock)?;
    assert!(!reservation.is_active());
    assert_eq!(reservation.version(), 2);
    Ok(())
}

#[test]
fn concurrent_bookings_respect_capacity() -> anyhow::Result<()> {
    let clock = Arc::new(clock());
    let room = Arc::new(SharedRoom::new(RoomType::Standard, 5)?);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let room = Arc::clone(&room);
            let clock = Arc::clone(&clock);
            std::thread::spawn(move || -> DomainResult<Reservation> {
                let guest = GuestName::new(format!("Guest {i}"))?;
                booking::book(&room, guest, days(1), days(2), &clock)
            })
        })
        .collect();

    let mut confirmed = Vec::new();
    let mut rejected = 0;
    for handle in handles {
        match handle.join().expect("booking thread panicked") {
            Ok(reservation) => confirmed.push(reservation),
            Err(DomainError::CapacityExceeded { capacity }) => {
                assert_eq!(capacity, 5);
                rejected += 1;
            }
            Err(other) => anyhow::bail!("unexpected error: {other}"),
        }
    }

    assert_eq!(confirmed.len(), 5);
    assert_eq!(rejected, 11);
    assert_eq!(room.reserved_count(), 5);

    for reservation in &mut confirmed {
        booking::cancel(&room, reservation, clock.as_ref())?;
    }
    assert_eq!(room.reserved_count(), 0);
    assert!(room.snapshot().is_available());
    Ok(())
}
