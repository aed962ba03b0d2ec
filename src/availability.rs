//! Room availability.
//!
//! A room is busy for `[start, end)` on a date when a schedule entry that
//! still occupies the room overlaps that window. The scan is linear in the
//! number of entries; there is no (room, date) index.

use crate::id::RoomId;
use crate::schedule::ScheduleEntry;
use crate::time::{windows_overlap, Date, Time};
use crate::venue::Room;

/// Returns false iff a non-canceled entry for `room` on `date` overlaps
/// `[start, end)`.
///
/// Zero-length and inverted windows are not rejected here; they go through
/// the same overlap test as any other window.
#[must_use]
pub fn is_room_available(
    entries: &[ScheduleEntry],
    room: RoomId,
    date: Date,
    start: Time,
    end: Time,
) -> bool {
    !entries.iter().any(|entry| {
        entry.room_id == room
            && entry.date == date
            && entry.occupies_room()
            && windows_overlap(entry.expected_start, entry.expected_end, start, end)
    })
}

/// Every room free for `[start, end)` on `date`, in room order.
#[must_use]
pub fn available_rooms<'a>(
    rooms: &'a [Room],
    entries: &[ScheduleEntry],
    date: Date,
    start: Time,
    end: Time,
) -> Vec<&'a Room> {
    rooms
        .iter()
        .filter(|room| is_room_available(entries, room.id, date, start, end))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{BuildingId, ScheduleId, SectionId};

    fn t(h: u64, m: u64) -> Time {
        Time::new(h, m).unwrap()
    }

    fn day() -> Date {
        Date::new(2024, 3, 10).unwrap()
    }

    fn booked(room: u64) -> ScheduleEntry {
        ScheduleEntry::new(
            ScheduleId::new(4001),
            SectionId::new(2001),
            RoomId::new(room),
            day(),
            t(9, 0),
            t(10, 0),
            false,
        )
    }

    #[test]
    fn test_overlap_blocks_room() {
        let entries = vec![booked(3001)];
        assert!(!is_room_available(&entries, RoomId::new(3001), day(), t(9, 30), t(10, 30)));
        assert!(!is_room_available(&entries, RoomId::new(3001), day(), t(8, 0), t(12, 0)));
    }

    #[test]
    fn test_adjacent_window_is_free() {
        let entries = vec![booked(3001)];
        assert!(is_room_available(&entries, RoomId::new(3001), day(), t(10, 0), t(11, 0)));
        assert!(is_room_available(&entries, RoomId::new(3001), day(), t(8, 0), t(9, 0)));
    }

    #[test]
    fn test_other_room_or_date_is_free() {
        let entries = vec![booked(3001)];
        assert!(is_room_available(&entries, RoomId::new(3002), day(), t(9, 0), t(10, 0)));
        let next_day = Date::new(2024, 3, 11).unwrap();
        assert!(is_room_available(&entries, RoomId::new(3001), next_day, t(9, 0), t(10, 0)));
    }

    #[test]
    fn test_canceled_entry_does_not_block() {
        let mut entry = booked(3001);
        entry.cancel();
        assert!(is_room_available(&[entry], RoomId::new(3001), day(), t(9, 0), t(10, 0)));
    }

    #[test]
    fn test_degenerate_windows_use_plain_overlap_test() {
        let entries = vec![booked(3001)];
        // zero-length window inside the booking: 09:00 < 09:30 && 09:30 < 10:00
        assert!(!is_room_available(&entries, RoomId::new(3001), day(), t(9, 30), t(9, 30)));
        // inverted window after the booking: 11:00 < 10:00 fails
        assert!(is_room_available(&entries, RoomId::new(3001), day(), t(11, 0), t(10, 30)));
    }

    #[test]
    fn test_available_rooms_filters_in_order() {
        let rooms: Vec<Room> = (1..=3)
            .map(|i| Room {
                id: RoomId::new(3000 + i),
                name: format!("R{i}"),
                building_id: BuildingId::new(6001),
            })
            .collect();
        let entries = vec![booked(3002)];
        let free: Vec<RoomId> = available_rooms(&rooms, &entries, day(), t(9, 0), t(10, 0))
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(free, vec![RoomId::new(3001), RoomId::new(3003)]);
    }
}
