//! Room entity: a room type with a bounded reservation counter.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use staybook_core::{AggregateId, DomainError, DomainResult, Entity};

use crate::value::RoomType;

/// Room identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub AggregateId);

impl RoomId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for RoomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Entity: Room.
///
/// Invariant: `0 <= reserved_count <= capacity`, and `capacity > 0`.
/// `reserved_count` changes only through `reserve` / `release`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RoomRecord")]
pub struct Room {
    id: RoomId,
    room_type: RoomType,
    capacity: u32,
    reserved_count: u32,
}

impl Room {
    /// Create a room with a fresh identifier.
    pub fn new(room_type: RoomType, capacity: u32) -> DomainResult<Self> {
        Self::with_id(RoomId::new(AggregateId::new()), room_type, capacity)
    }

    pub fn with_id(id: RoomId, room_type: RoomType, capacity: u32) -> DomainResult<Self> {
        if capacity == 0 {
            return Err(DomainError::validation("capacity must be positive"));
        }
        Ok(Self {
            id,
            room_type,
            capacity,
            reserved_count: 0,
        })
    }

    pub fn id_typed(&self) -> RoomId {
        self.id
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn reserved_count(&self) -> u32 {
        self.reserved_count
    }

    /// Units still free.
    pub fn remaining(&self) -> u32 {
        self.capacity - self.reserved_count
    }

    pub fn is_available(&self) -> bool {
        self.reserved_count < self.capacity
    }

    /// Take one unit of capacity.
    ///
    /// Fails with `CapacityExceeded` when the room is full; the count is left
    /// as it was.
    pub fn reserve(&mut self) -> DomainResult<()> {
        if !self.is_available() {
            tracing::debug!(room_id = %self.id, capacity = self.capacity, "room is full");
            return Err(DomainError::capacity_exceeded(self.capacity));
        }
        self.reserved_count += 1;
        tracing::debug!(
            room_id = %self.id,
            reserved = self.reserved_count,
            capacity = self.capacity,
            "room unit reserved"
        );
        Ok(())
    }

    /// Give one unit of capacity back.
    ///
    /// Returns `false` (and changes nothing) when nothing was reserved.
    pub fn release(&mut self) -> bool {
        if self.reserved_count == 0 {
            tracing::warn!(room_id = %self.id, "release on a room with no reservations");
            return false;
        }
        self.reserved_count -= 1;
        tracing::debug!(
            room_id = %self.id,
            reserved = self.reserved_count,
            capacity = self.capacity,
            "room unit released"
        );
        true
    }
}

impl Entity for Room {
    type Id = RoomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Unvalidated wire shape of a room.
#[derive(Deserialize)]
struct RoomRecord {
    id: RoomId,
    room_type: RoomType,
    capacity: u32,
    reserved_count: u32,
}

impl TryFrom<RoomRecord> for Room {
    type Error = DomainError;

    fn try_from(record: RoomRecord) -> Result<Self, Self::Error> {
        let mut room = Room::with_id(record.id, record.room_type, record.capacity)?;
        if record.reserved_count > room.capacity {
            return Err(DomainError::validation(
                "reserved_count cannot exceed capacity",
            ));
        }
        room.reserved_count = record.reserved_count;
        Ok(room)
    }
}

/// A room that can be shared across threads.
///
/// The reserved counter is a single atomic updated with a bounded
/// compare-and-swap, so concurrent `reserve`/`release` calls are
/// linearizable and the capacity bound holds under contention.
#[derive(Debug)]
pub struct SharedRoom {
    id: RoomId,
    room_type: RoomType,
    capacity: u32,
    reserved_count: AtomicU32,
}

impl SharedRoom {
    pub fn new(room_type: RoomType, capacity: u32) -> DomainResult<Self> {
        Room::new(room_type, capacity).map(Self::from)
    }

    pub fn id_typed(&self) -> RoomId {
        self.id
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn reserved_count(&self) -> u32 {
        self.reserved_count.load(Ordering::Acquire)
    }

    pub fn is_available(&self) -> bool {
        self.reserved_count() < self.capacity
    }

    /// Atomically take one unit if any is free.
    pub fn reserve(&self) -> DomainResult<()> {
        let capacity = self.capacity;
        match self
            .reserved_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < capacity).then(|| n + 1)
            }) {
            Ok(previous) => {
                tracing::debug!(
                    room_id = %self.id,
                    reserved = previous + 1,
                    capacity,
                    "room unit reserved"
                );
                Ok(())
            }
            Err(_) => {
                tracing::debug!(room_id = %self.id, capacity, "room is full");
                Err(DomainError::capacity_exceeded(capacity))
            }
        }
    }

    /// Atomically give one unit back; floors at zero.
    pub fn release(&self) -> bool {
        match self
            .reserved_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
        {
            Ok(previous) => {
                tracing::debug!(room_id = %self.id, reserved = previous - 1, "room unit released");
                true
            }
            Err(_) => {
                tracing::warn!(room_id = %self.id, "release on a room with no reservations");
                false
            }
        }
    }

    /// Point-in-time copy as a plain `Room`.
    pub fn snapshot(&self) -> Room {
        Room {
            id: self.id,
            room_type: self.room_type,
            capacity: self.capacity,
            reserved_count: self.reserved_count(),
        }
    }
}

impl From<Room> for SharedRoom {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            room_type: room.room_type,
            capacity: room.capacity,
            reserved_count: AtomicU32::new(room.reserved_count),
        }
    }
}

impl Entity for SharedRoom {
    type Id = RoomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
