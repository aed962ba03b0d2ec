//! On-disk layout of every entity type.
//!
//! Field order per record:
//!
//! | Record          | Fields                                                                 |
//! |-----------------|------------------------------------------------------------------------|
//! | `Person`        | id, name, role, password                                               |
//! | `Building`      | id, name, address, attendant id                                        |
//! | `Room`          | id, name, building id                                                  |
//! | `LabSection`    | course id, course code, course name, section id, section name, instructor id (0 = none), TA ids |
//! | `ScheduleEntry` | id, section id, room id, date, expected start, expected end, actual start, actual end, makeup flag, canceled flag, status |
//! | `MakeupRequest` | id, section id, instructor id, date, start, end, reason, status        |

use crate::id::{BuildingId, CourseId, PersonId, RequestId, RoomId, ScheduleId, SectionId};
use crate::makeup::{MakeupRequest, RequestStatus};
use crate::person::{Person, Role};
use crate::schedule::{ScheduleEntry, ScheduleStatus};
use crate::section::{LabSection, MAX_TAS};
use crate::venue::{Building, Room};

use super::codec::{DecodeError, Record, RecordReader, RecordWriter};

impl Record for Person {
    fn encode(&self, out: &mut RecordWriter) {
        out.put_u64(self.id.get());
        out.put_str(&self.name);
        out.put_str(self.role.as_str());
        out.put_str(&self.password);
    }

    fn decode(input: &mut RecordReader<'_>) -> Result<Self, DecodeError> {
        let id = PersonId::new(input.take_u64()?);
        let name = input.take_str("person.name")?;
        let role_name = input.take_str("person.role")?;
        let role = role_name.parse::<Role>().map_err(|_| DecodeError::InvalidValue {
            field: "person.role",
            value: role_name,
        })?;
        let password = input.take_str("person.password")?;
        Ok(Self { id, name, role, password })
    }
}

impl Record for Building {
    fn encode(&self, out: &mut RecordWriter) {
        out.put_u64(self.id.get());
        out.put_str(&self.name);
        out.put_str(&self.address);
        out.put_u64(self.attendant_id.get());
    }

    fn decode(input: &mut RecordReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: BuildingId::new(input.take_u64()?),
            name: input.take_str("building.name")?,
            address: input.take_str("building.address")?,
            attendant_id: PersonId::new(input.take_u64()?),
        })
    }
}

impl Record for Room {
    fn encode(&self, out: &mut RecordWriter) {
        out.put_u64(self.id.get());
        out.put_str(&self.name);
        out.put_u64(self.building_id.get());
    }

    fn decode(input: &mut RecordReader<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            id: RoomId::new(input.take_u64()?),
            name: input.take_str("room.name")?,
            building_id: BuildingId::new(input.take_u64()?),
        })
    }
}

impl Record for LabSection {
    fn encode(&self, out: &mut RecordWriter) {
        out.put_u64(self.course_id.get());
        out.put_str(&self.course_code);
        out.put_str(&self.course_name);
        out.put_u64(self.id.get());
        out.put_str(&self.section_name);
        out.put_u64(self.instructor_id.map_or(0, PersonId::get));
        out.put_seq(self.ta_ids.iter().map(|id| id.get()));
    }

    fn decode(input: &mut RecordReader<'_>) -> Result<Self, DecodeError> {
        let course_id = CourseId::new(input.take_u64()?);
        let course_code = input.take_str("section.course_code")?;
        let course_name = input.take_str("section.course_name")?;
        let id = SectionId::new(input.take_u64()?);
        let section_name = input.take_str("section.section_name")?;
        let instructor_id = match input.take_u64()? {
            0 => None,
            raw => Some(PersonId::new(raw)),
        };
        let ta_ids = input.take_seq()?;
        if ta_ids.len() > MAX_TAS {
            return Err(DecodeError::InvalidValue {
                field: "section.ta_ids",
                value: format!("{} entries", ta_ids.len()),
            });
        }
        Ok(Self {
            course_id,
            course_code,
            course_name,
            id,
            section_name,
            instructor_id,
            ta_ids: ta_ids.into_iter().map(PersonId::new).collect(),
        })
    }
}

impl Record for ScheduleEntry {
    fn encode(&self, out: &mut RecordWriter) {
        out.put_u64(self.id.get());
        out.put_u64(self.section_id.get());
        out.put_u64(self.room_id.get());
        out.put_date(self.date);
        out.put_time(self.expected_start);
        out.put_time(self.expected_end);
        out.put_time(self.actual_start);
        out.put_time(self.actual_end);
        out.put_bool(self.is_makeup);
        out.put_bool(self.is_canceled);
        out.put_u64(self.status.code());
    }

    fn decode(input: &mut RecordReader<'_>) -> Result<Self, DecodeError> {
        let id = ScheduleId::new(input.take_u64()?);
        let section_id = SectionId::new(input.take_u64()?);
        let room_id = RoomId::new(input.take_u64()?);
        let date = input.take_date("schedule.date")?;
        let expected_start = input.take_time("schedule.expected_start")?;
        let expected_end = input.take_time("schedule.expected_end")?;
        let actual_start = input.take_time("schedule.actual_start")?;
        let actual_end = input.take_time("schedule.actual_end")?;
        let is_makeup = input.take_bool("schedule.is_makeup")?;
        let is_canceled = input.take_bool("schedule.is_canceled")?;
        let code = input.take_u64()?;
        let status = ScheduleStatus::from_code(code).ok_or(DecodeError::InvalidValue {
            field: "schedule.status",
            value: code.to_string(),
        })?;
        Ok(Self {
            id,
            section_id,
            room_id,
            date,
            expected_start,
            expected_end,
            actual_start,
            actual_end,
            is_makeup,
            is_canceled,
            status,
        })
    }
}

impl Record for MakeupRequest {
    fn encode(&self, out: &mut RecordWriter) {
        out.put_u64(self.id.get());
        out.put_u64(self.section_id.get());
        out.put_u64(self.instructor_id.get());
        out.put_date(self.requested_date);
        out.put_time(self.requested_start);
        out.put_time(self.requested_end);
        out.put_str(&self.reason);
        out.put_u64(self.status.code());
    }

    fn decode(input: &mut RecordReader<'_>) -> Result<Self, DecodeError> {
        let id = RequestId::new(input.take_u64()?);
        let section_id = SectionId::new(input.take_u64()?);
        let instructor_id = PersonId::new(input.take_u64()?);
        let requested_date = input.take_date("makeup.date")?;
        let requested_start = input.take_time("makeup.start")?;
        let requested_end = input.take_time("makeup.end")?;
        let reason = input.take_str("makeup.reason")?;
        let code = input.take_u64()?;
        let status = RequestStatus::from_code(code).ok_or(DecodeError::InvalidValue {
            field: "makeup.status",
            value: code.to_string(),
        })?;
        Ok(Self {
            id,
            section_id,
            instructor_id,
            requested_date,
            requested_start,
            requested_end,
            reason,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::codec::{decode_all, WORD};
    use crate::time::{Date, Time};

    fn sample_section() -> LabSection {
        let mut ls = LabSection::new(CourseId::new(7001), "CS101", "Programming Lab", SectionId::new(2001), "A");
        ls.instructor_id = Some(PersonId::new(1002));
        ls.ta_ids = vec![PersonId::new(1003), PersonId::new(1004)];
        ls
    }

    fn sample_entry() -> ScheduleEntry {
        let mut e = ScheduleEntry::new(
            ScheduleId::new(4001),
            SectionId::new(2001),
            RoomId::new(3001),
            Date::new(2024, 3, 10).unwrap(),
            Time::new(9, 0).unwrap(),
            Time::new(10, 0).unwrap(),
            true,
        );
        e.fill(Time::new(9, 5).unwrap(), Time::new(9, 55).unwrap());
        e
    }

    #[test]
    fn test_person_layout() {
        let p = Person {
            id: PersonId::new(1001),
            name: "Ada".to_string(),
            role: Role::Ta,
            password: "pw".to_string(),
        };
        let bytes = p.to_bytes();
        // id + (len + "Ada") + (len + "TA") + (len + "pw")
        assert_eq!(bytes.len(), WORD + (WORD + 3) + (WORD + 2) + (WORD + 2));
        assert_eq!(&bytes[..WORD], &1001u64.to_le_bytes());
        assert_eq!(&bytes[WORD + WORD + 3 + WORD..WORD + WORD + 3 + WORD + 2], b"TA");

        let (decoded, consumed) = decode_all::<Person>(&bytes);
        assert_eq!(decoded, vec![p]);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn test_section_unassigned_instructor_is_zero() {
        let ls = LabSection::new(CourseId::new(7001), "CS", "Lab", SectionId::new(2001), "B");
        let bytes = ls.to_bytes();
        let (decoded, _) = decode_all::<LabSection>(&bytes);
        assert_eq!(decoded[0].instructor_id, None);
        assert!(decoded[0].ta_ids.is_empty());
    }

    #[test]
    fn test_section_and_entry_decode() {
        let mut bytes = sample_section().to_bytes();
        let (sections, _) = decode_all::<LabSection>(&bytes);
        assert_eq!(sections, vec![sample_section()]);

        bytes = sample_entry().to_bytes();
        // 3 ids + date(3) + 4 times(2 each) + 2 flags + status
        assert_eq!(bytes.len(), WORD * (3 + 3 + 8 + 2 + 1));
        let (entries, _) = decode_all::<ScheduleEntry>(&bytes);
        assert_eq!(entries, vec![sample_entry()]);
    }

    #[test]
    fn test_truncated_tail_is_dropped() {
        let first = sample_entry();
        let mut second = sample_entry();
        second.id = ScheduleId::new(4002);

        let mut bytes = first.to_bytes();
        let first_len = bytes.len();
        let tail = second.to_bytes();
        bytes.extend_from_slice(&tail[..tail.len() - 3]);

        let (decoded, consumed) = decode_all::<ScheduleEntry>(&bytes);
        assert_eq!(decoded, vec![first]);
        assert_eq!(consumed, first_len);
    }

    #[test]
    fn test_unknown_status_stops_decoding() {
        let mut bytes = sample_entry().to_bytes();
        let status_at = bytes.len() - WORD;
        bytes[status_at..].copy_from_slice(&7u64.to_le_bytes());
        let (decoded, consumed) = decode_all::<ScheduleEntry>(&bytes);
        assert!(decoded.is_empty());
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_too_many_tas_is_corrupt() {
        let mut ls = sample_section();
        ls.ta_ids = (0..6).map(|i| PersonId::new(1100 + i)).collect();
        let bytes = ls.to_bytes();
        let (decoded, _) = decode_all::<LabSection>(&bytes);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_makeup_request_decode() {
        let mr = MakeupRequest {
            id: RequestId::new(5001),
            section_id: SectionId::new(2001),
            instructor_id: PersonId::new(1002),
            requested_date: Date::new(2024, 3, 12).unwrap(),
            requested_start: Time::new(14, 0).unwrap(),
            requested_end: Time::new(15, 30).unwrap(),
            reason: "Public holiday".to_string(),
            status: RequestStatus::Disapproved,
        };
        let (decoded, _) = decode_all::<MakeupRequest>(&mr.to_bytes());
        assert_eq!(decoded, vec![mr]);
    }
}
