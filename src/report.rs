//! Plain-text reports for the head of department.
//!
//! Each report renders to a `String`; [`write_report`] saves one under a
//! dated file name.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::info;

use crate::error::{LabError, LabResult, ValidationError};
use crate::id::{PersonId, RoomId, SectionId};
use crate::repository::Repository;
use crate::schedule::{ScheduleEntry, ScheduleStatus};
use crate::storage::StorageError;
use crate::time::Date;

const NA: &str = "N/A";

static STEM_UNSAFE: OnceLock<Regex> = OnceLock::new();

fn stem_unsafe() -> Result<&'static Regex, ValidationError> {
    if let Some(re) = STEM_UNSAFE.get() {
        return Ok(re);
    }
    let re = Regex::new(r"[^A-Za-z0-9_-]+").map_err(|e| ValidationError::InvalidReportName {
        stem: e.to_string(),
    })?;
    Ok(STEM_UNSAFE.get_or_init(|| re))
}

/// Replaces every run of characters outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_stem(stem: &str) -> Result<String, ValidationError> {
    let cleaned = stem_unsafe()?.replace_all(stem.trim(), "_");
    if cleaned.trim_matches('_').is_empty() {
        return Err(ValidationError::InvalidReportName {
            stem: stem.to_string(),
        });
    }
    Ok(cleaned.into_owned())
}

/// Writes `content` to `<dir>/<stem>_<YYYY-MM-DD>.txt` and returns the path.
pub fn write_report(dir: &Path, stem: &str, on: Date, content: &str) -> LabResult<PathBuf> {
    let name = format!("{}_{}.txt", sanitize_stem(stem)?, on.iso());
    let path = dir.join(name);
    let io = |source| StorageError::Io {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(io)?;
    fs::write(&path, content).map_err(io)?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

/// Renders reports from a repository's read-only views.
pub struct ReportGenerator<'a> {
    repo: &'a Repository,
}

impl<'a> ReportGenerator<'a> {
    #[must_use]
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    fn person_name(&self, id: Option<PersonId>) -> String {
        id.and_then(|id| self.repo.person(id))
            .map_or_else(|| NA.to_string(), |p| p.name.clone())
    }

    fn section_code(&self, id: SectionId) -> String {
        self.repo
            .section(id)
            .map_or_else(|| NA.to_string(), |s| s.full_code())
    }

    fn section_label(&self, id: SectionId) -> String {
        self.repo.section(id).map_or_else(
            || NA.to_string(),
            |s| format!("{} ({})", s.course_name, s.full_code()),
        )
    }

    /// "R1 in Science", or a placeholder for dangling references.
    #[must_use]
    pub fn room_info(&self, id: RoomId) -> String {
        let Some(room) = self.repo.room(id) else {
            return "N/A Room".to_string();
        };
        let building = self
            .repo
            .building(room.building_id)
            .map_or("Unknown Building", |b| b.name.as_str());
        format!("{} in {}", room.name, building)
    }

    /// Every session, sorted by date then expected start.
    #[must_use]
    pub fn lab_schedule(&self, on: Date) -> String {
        let mut entries: Vec<&ScheduleEntry> = self.repo.schedule_entries().iter().collect();
        entries.sort_by_key(|e| (e.date, e.expected_start));

        let mut out = String::new();
        out.push_str("--- COMPLETE LAB SCHEDULE ---\n");
        out.push_str(&format!("Generated on: {on}\n\n"));

        if entries.is_empty() {
            out.push_str("No labs are currently scheduled.\n");
            return out;
        }

        out.push_str(&format!(
            "{:<15}{:<12}{:<10}{:<10}{:<12}{:<25}{:<30}{:<20}\n",
            "Date", "Day", "Start", "End", "Status", "Lab Section", "Venue", "Instructor"
        ));
        out.push_str(&"-".repeat(134));
        out.push('\n');

        for e in entries {
            let instructor = self.repo.section(e.section_id).and_then(|s| s.instructor_id);
            let status = if e.is_makeup {
                "Makeup".to_string()
            } else {
                e.status.to_string()
            };
            out.push_str(&format!(
                "{:<15}{:<12}{:<10}{:<10}{:<12}{:<25}{:<30}{:<20}\n",
                e.date.to_string(),
                e.date.weekday_name(),
                e.expected_start.to_string(),
                e.expected_end.to_string(),
                status,
                self.section_code(e.section_id),
                self.room_info(e.room_id),
                self.person_name(instructor),
            ));
        }
        out
    }

    /// Filled timesheets, headed with a free-form period label.
    #[must_use]
    pub fn timesheet(&self, label: &str, on: Date) -> String {
        let mut out = String::new();
        out.push_str(&format!("--- FILLED TIME SHEET REPORT (Period: {label}) ---\n"));
        out.push_str(&format!("Generated on: {on}\n\n"));
        out.push_str(&format!(
            "{:<15}{:<35}{:<15}{:<15}{:<16}{:<30}\n",
            "Date", "Lab Section", "Actual Start", "Actual End", "Duration (hrs)", "Venue"
        ));
        out.push_str(&"-".repeat(126));
        out.push('\n');

        let mut found = false;
        for e in self
            .repo
            .schedule_entries()
            .iter()
            .filter(|e| e.status == ScheduleStatus::Filled)
        {
            found = true;
            out.push_str(&format!(
                "{:<15}{:<35}{:<15}{:<15}{:<16.2}{:<30}\n",
                e.date.to_string(),
                self.section_label(e.section_id),
                e.actual_start.to_string(),
                e.actual_end.to_string(),
                e.contact_hours(),
                self.room_info(e.room_id),
            ));
        }
        if !found {
            out.push_str("No timesheets have been filled yet.\n");
        }
        out
    }

    /// Per-session breakdown and contact-hour totals for one section.
    pub fn lab_summary(&self, section_id: SectionId, on: Date) -> LabResult<String> {
        let section = self
            .repo
            .section(section_id)
            .ok_or_else(|| LabError::not_found("LabSection", section_id))?;

        let mut out = String::new();
        out.push_str("--- LAB CONTACT HOURS SUMMARY ---\n");
        out.push_str(&format!(
            "Lab Section: {} ({})\n",
            section.course_name,
            section.full_code()
        ));
        out.push_str(&format!(
            "Instructor: {}\n",
            self.person_name(section.instructor_id)
        ));
        out.push_str(&format!("Generated on: {on}\n\n"));
        out.push_str(&format!(
            "{:<15}{:<12}{:<12}{:<12}{:<12}{:<10}{:<16}\n",
            "Date", "Exp. Start", "Exp. End", "Act. Start", "Act. End", "Duration", "Status"
        ));
        out.push_str(&"-".repeat(89));
        out.push('\n');

        let mut total_hours = 0.0;
        let mut canceled = 0usize;
        for e in self.repo.entries_for_section(section_id) {
            total_hours += e.contact_hours();
            let (status, actual_start, actual_end, duration) = match e.status {
                ScheduleStatus::Canceled => {
                    canceled += 1;
                    ("Canceled/Leave", NA.to_string(), NA.to_string(), NA.to_string())
                }
                ScheduleStatus::Filled => (
                    "Completed",
                    e.actual_start.to_string(),
                    e.actual_end.to_string(),
                    format!("{:.2}", e.contact_hours()),
                ),
                ScheduleStatus::Scheduled => {
                    ("Scheduled", NA.to_string(), NA.to_string(), NA.to_string())
                }
            };
            out.push_str(&format!(
                "{:<15}{:<12}{:<12}{:<12}{:<12}{:<10}{:<16}\n",
                e.date.to_string(),
                e.expected_start.to_string(),
                e.expected_end.to_string(),
                actual_start,
                actual_end,
                duration,
                status,
            ));
        }

        out.push_str("\n--- SUMMARY ---\n");
        out.push_str(&format!("Total Contact Hours Logged: {total_hours:.2} hours\n"));
        out.push_str(&format!("Total Canceled/Leaves: {canceled} sessions\n"));
        Ok(out)
    }
}
