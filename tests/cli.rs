//! The `labdesk` binary driving sessions and makeup decisions.

use std::path::Path;
use std::process::{Command, Output};

use labdesk::{Date, RequestStatus, Repository, Role, ScheduleStatus, Time};
use tempfile::tempdir;

fn labdesk(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_labdesk"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("run labdesk")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn t(h: u64, m: u64) -> Time {
    Time::new(h, m).unwrap()
}

#[test]
fn test_schedule_fill_and_makeup_commands() {
    let dir = tempdir().unwrap();
    let date = Date::new(2024, 3, 11).unwrap();
    let (attendant, section, r1, r2, request) = {
        let mut repo = Repository::open_dir(dir.path()).unwrap();
        let attendant = repo.add_person("Bo", Role::Attendant, "pw").unwrap();
        let instructor = repo.add_person("Ines", Role::Instructor, "pw").unwrap();
        let building = repo.add_building("Science", "1 Campus Rd", attendant).unwrap();
        let r1 = repo.add_room("R1", building).unwrap();
        let r2 = repo.add_room("R2", building).unwrap();
        let section = repo.add_lab_section("CS101", "Programming Lab", "A").unwrap();
        repo.assign_instructor(section, instructor).unwrap();
        let request = repo
            .add_makeup_request(section, instructor, date, t(9, 30), t(10, 30), "sick day")
            .unwrap();
        (attendant, section, r1, r2, request)
    };

    let out = labdesk(
        dir.path(),
        &["schedule", &section.to_string(), &r1.to_string(), "2024-03-11", "09:00", "10:00"],
    );
    assert!(out.status.success(), "schedule failed: {out:?}");
    assert!(stdout(&out).contains("Scheduled session 4001"));

    let out = labdesk(dir.path(), &["fill", &attendant.to_string(), "4001", "09:05", "10:00"]);
    assert!(out.status.success(), "fill failed: {out:?}");

    let out = labdesk(dir.path(), &["makeup", "rooms", &request.to_string()]);
    assert!(out.status.success());
    let listing = stdout(&out);
    assert!(listing.contains("R2 in Science"));
    assert!(!listing.contains("R1 in Science"));

    let out = labdesk(dir.path(), &["makeup", "approve", &request.to_string(), &r2.to_string()]);
    assert!(out.status.success(), "approve failed: {out:?}");
    assert!(stdout(&out).contains("approved: makeup session"));

    // A decided request is refused.
    let out = labdesk(dir.path(), &["makeup", "disapprove", &request.to_string()]);
    assert!(!out.status.success());

    let repo = Repository::open_dir(dir.path()).unwrap();
    assert_eq!(repo.makeup_request(request).unwrap().status, RequestStatus::Approved);
    let filled = repo.entries_for_section(section);
    assert_eq!(filled.len(), 2);
    assert_eq!(filled[0].status, ScheduleStatus::Filled);
    assert!(filled[1].is_makeup);
    assert_eq!(filled[1].room_id, r2);
}

#[test]
fn test_approving_busy_room_disapproves() {
    let dir = tempdir().unwrap();
    let date = Date::new(2024, 3, 11).unwrap();
    let (room, request) = {
        let mut repo = Repository::open_dir(dir.path()).unwrap();
        let attendant = repo.add_person("Bo", Role::Attendant, "pw").unwrap();
        let building = repo.add_building("Science", "1 Campus Rd", attendant).unwrap();
        let room = repo.add_room("R1", building).unwrap();
        let section = repo.add_lab_section("CS101", "Programming Lab", "A").unwrap();
        repo.add_schedule_entry(section, room, date, t(9, 0), t(10, 0), false)
            .unwrap();
        let request = repo
            .add_makeup_request(section, labdesk::PersonId::new(1001), date, t(9, 30), t(10, 30), "")
            .unwrap();
        (room, request)
    };

    let out = labdesk(dir.path(), &["makeup", "approve", &request.to_string(), &room.to_string()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("disapproved"));

    let repo = Repository::open_dir(dir.path()).unwrap();
    assert_eq!(repo.makeup_request(request).unwrap().status, RequestStatus::Disapproved);
    assert!(repo.schedule_entries().iter().all(|e| !e.is_makeup));
}

#[test]
fn test_malformed_time_is_rejected() {
    let dir = tempdir().unwrap();
    let out = labdesk(dir.path(), &["fill", "1001", "4001", "9h00", "10:00"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid time"));
}
