//! labdesk command line
//!
//! Thin front end over the labdesk library: bootstraps a data directory,
//! books and fills sessions, decides makeup requests, writes reports and
//! exports JSON.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use labdesk::{
    write_report, Date, LabConfig, MakeupOutcome, MakeupWorkflow, PersonId, ReportGenerator,
    Repository, RequestId, RoomId, ScheduleId, SectionId, Time,
};

enum Command {
    Bootstrap,
    Pending,
    Schedule {
        section: SectionId,
        room: RoomId,
        date: Date,
        start: Time,
        end: Time,
    },
    Fill {
        attendant: PersonId,
        entry: ScheduleId,
        start: Time,
        end: Time,
    },
    MakeupRooms(RequestId),
    MakeupApprove(RequestId, RoomId),
    MakeupDisapprove(RequestId),
    ReportSchedule,
    ReportTimesheet(String),
    ReportSummary(SectionId),
    Export,
}

struct Args {
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    command: Command,
}

fn usage() {
    println!("labdesk - lab records for an academic department");
    println!();
    println!("USAGE:");
    println!("    labdesk [OPTIONS] <COMMAND>");
    println!();
    println!("OPTIONS:");
    println!("    -c, --config <FILE>       JSON configuration file");
    println!("    -d, --data-dir <DIR>      Data directory [default: ./lab_data]");
    println!("    -h, --help                Print help information");
    println!();
    println!("COMMANDS:");
    println!("    bootstrap                       Create the default academic officer if needed");
    println!("    pending                         List pending makeup requests");
    println!("    schedule <SECTION> <ROOM> <DATE> <START> <END>");
    println!("                                    Book a session (DATE as YYYY-MM-DD, times as HH:MM)");
    println!("    fill <ATTENDANT> <ENTRY> <START> <END>");
    println!("                                    Record the actual times of a session");
    println!("    makeup rooms <REQUEST>          List rooms free for a pending request");
    println!("    makeup approve <REQUEST> <ROOM> Approve a request into one of its free rooms");
    println!("    makeup disapprove <REQUEST>     Disapprove a pending request");
    println!("    report schedule                 Write the complete lab schedule");
    println!("    report timesheet <LABEL>        Write the filled timesheet report");
    println!("    report summary <SECTION-ID>     Write the contact-hours summary of a section");
    println!("    export                          Print every collection as JSON");
}

fn fail(msg: &str) -> ! {
    eprintln!("error: {msg}");
    std::process::exit(1);
}

fn parse_id(what: &str, raw: &str) -> u64 {
    raw.parse()
        .unwrap_or_else(|_| fail(&format!("invalid {what} id: {raw}")))
}

fn parse_date(raw: &str) -> Date {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Date::from_naive)
        .unwrap_or_else(|_| fail(&format!("invalid date (expected YYYY-MM-DD): {raw}")))
}

fn parse_time(raw: &str) -> Time {
    raw.split_once(':')
        .and_then(|(h, m)| Some((h.parse::<u64>().ok()?, m.parse::<u64>().ok()?)))
        .and_then(|(h, m)| Time::new(h, m).ok())
        .unwrap_or_else(|| fail(&format!("invalid time (expected HH:MM): {raw}")))
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut config = None;
    let mut data_dir = None;
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    fail("--config requires a value");
                }
            }
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    fail("--data-dir requires a value");
                }
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => fail(&format!("unknown argument: {arg}")),
            arg => {
                positional.push(arg.to_string());
                i += 1;
            }
        }
    }

    let words: Vec<&str> = positional.iter().map(String::as_str).collect();
    let command = match words.as_slice() {
        ["bootstrap"] => Command::Bootstrap,
        ["pending"] => Command::Pending,
        ["report", "schedule"] => Command::ReportSchedule,
        ["report", "timesheet", label] => Command::ReportTimesheet((*label).to_string()),
        ["schedule", section, room, date, start, end] => Command::Schedule {
            section: SectionId::new(parse_id("section", section)),
            room: RoomId::new(parse_id("room", room)),
            date: parse_date(date),
            start: parse_time(start),
            end: parse_time(end),
        },
        ["fill", attendant, entry, start, end] => Command::Fill {
            attendant: PersonId::new(parse_id("attendant", attendant)),
            entry: ScheduleId::new(parse_id("schedule", entry)),
            start: parse_time(start),
            end: parse_time(end),
        },
        ["makeup", "rooms", req] => Command::MakeupRooms(RequestId::new(parse_id("request", req))),
        ["makeup", "approve", req, room] => Command::MakeupApprove(
            RequestId::new(parse_id("request", req)),
            RoomId::new(parse_id("room", room)),
        ),
        ["makeup", "disapprove", req] => {
            Command::MakeupDisapprove(RequestId::new(parse_id("request", req)))
        }
        ["report", "summary", id] => Command::ReportSummary(SectionId::new(parse_id("section", id))),
        ["export"] => Command::Export,
        [] => {
            usage();
            std::process::exit(1);
        }
        other => fail(&format!("unknown command: {}", other.join(" "))),
    };

    Args {
        config,
        data_dir,
        command,
    }
}

fn report_outcome(request: RequestId, outcome: MakeupOutcome) {
    match outcome {
        MakeupOutcome::Approved { schedule_id, room_id } => {
            println!("Request {request} approved: makeup session {schedule_id} in room {room_id}");
        }
        MakeupOutcome::Disapproved => println!("Request {request} disapproved"),
        MakeupOutcome::NoRoomAvailable => {
            println!("Request {request} disapproved: no room is free for that window");
        }
        MakeupOutcome::RoomNotOffered { room_id } => {
            let room = room_id.map_or_else(|| "none".to_string(), |id| id.to_string());
            println!("Request {request} disapproved: room {room} is not free for that window");
        }
    }
}

fn today() -> Date {
    Date::from_naive(chrono::Local::now().date_naive())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let mut config = match &args.config {
        Some(path) => LabConfig::from_file(path)?,
        None => LabConfig::default(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    let config = config.validate()?;

    let mut repo = Repository::open(&config)?;

    match args.command {
        Command::Bootstrap => match repo.ensure_default_officer()? {
            Some(id) => println!("Created default academic officer with ID {id}"),
            None => println!("Data directory already has {} people", repo.persons().len()),
        },
        Command::Pending => {
            let pending = repo.pending_requests();
            if pending.is_empty() {
                println!("No pending makeup requests.");
            }
            for req in pending {
                let section = repo
                    .section(req.section_id)
                    .map_or_else(|| "N/A".to_string(), |s| s.full_code());
                println!(
                    "{:<8}{:<15}{:<12}{:<7}{:<7}{}",
                    req.id,
                    section,
                    req.requested_date.to_string(),
                    req.requested_start.to_string(),
                    req.requested_end.to_string(),
                    req.reason
                );
            }
        }
        Command::Schedule {
            section,
            room,
            date,
            start,
            end,
        } => {
            let id = repo.schedule_lab(section, room, date, start, end)?;
            println!("Scheduled session {id} on {date} {start}-{end}");
        }
        Command::Fill {
            attendant,
            entry,
            start,
            end,
        } => {
            repo.fill_timesheet(attendant, entry, start, end)?;
            println!("Timesheet filled for session {entry}");
        }
        Command::MakeupRooms(request) => {
            let rooms = MakeupWorkflow::new(&mut repo).candidate_rooms(request)?;
            if rooms.is_empty() {
                println!("No rooms are free for request {request}; approving it will disapprove it.");
            }
            let reports = ReportGenerator::new(&repo);
            for room in rooms {
                println!("{:<8}{}", room.id, reports.room_info(room.id));
            }
        }
        Command::MakeupApprove(request, room) => {
            let outcome = MakeupWorkflow::new(&mut repo).approve(request, |_| Some(room))?;
            report_outcome(request, outcome);
        }
        Command::MakeupDisapprove(request) => {
            let outcome = MakeupWorkflow::new(&mut repo).disapprove(request)?;
            report_outcome(request, outcome);
        }
        Command::ReportSchedule => {
            let content = ReportGenerator::new(&repo).lab_schedule(today());
            let path = write_report(&config.report_dir, "LabScheduleReport", today(), &content)?;
            println!("Report generated: {}", path.display());
        }
        Command::ReportTimesheet(label) => {
            let content = ReportGenerator::new(&repo).timesheet(&label, today());
            let stem = format!("TimeSheetReport_{label}");
            let path = write_report(&config.report_dir, &stem, today(), &content)?;
            println!("Report generated: {}", path.display());
        }
        Command::ReportSummary(section_id) => {
            let content = ReportGenerator::new(&repo).lab_summary(section_id, today())?;
            let code = repo
                .section(section_id)
                .map_or_else(|| section_id.to_string(), |s| s.full_code());
            let stem = format!("LabSummaryReport_{code}");
            let path = write_report(&config.report_dir, &stem, today(), &content)?;
            println!("Report generated: {}", path.display());
        }
        Command::Export => {
            let dump = serde_json::json!({
                "persons": repo.persons(),
                "buildings": repo.buildings(),
                "rooms": repo.rooms(),
                "lab_sections": repo.sections(),
                "schedules": repo.schedule_entries(),
                "makeup_requests": repo.makeup_requests(),
            });
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }

    Ok(())
}
