//! Courses and their lab sections.
//!
//! A course has no record of its own: it exists implicitly through the
//! sections that share its course code, and its id is carried on each.

use serde::{Deserialize, Serialize};

use crate::id::{CourseId, PersonId, SectionId};

/// Maximum number of TAs a section can list.
pub const MAX_TAS: usize = 5;

/// A lab section of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabSection {
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub id: SectionId,
    pub section_name: String,
    /// `None` until an instructor is assigned.
    pub instructor_id: Option<PersonId>,
    /// Assigned TAs in assignment order; never longer than [`MAX_TAS`].
    pub ta_ids: Vec<PersonId>,
}

impl LabSection {
    /// Creates a section with no instructor and no TAs.
    #[must_use]
    pub fn new(
        course_id: CourseId,
        course_code: impl Into<String>,
        course_name: impl Into<String>,
        id: SectionId,
        section_name: impl Into<String>,
    ) -> Self {
        Self {
            course_id,
            course_code: course_code.into(),
            course_name: course_name.into(),
            id,
            section_name: section_name.into(),
            instructor_id: None,
            ta_ids: Vec::new(),
        }
    }

    /// Course code and section name joined, e.g. "CS101-A".
    #[must_use]
    pub fn full_code(&self) -> String {
        format!("{}-{}", self.course_code, self.section_name)
    }

    /// Appends a TA; returns false and leaves the list unchanged when full.
    pub fn add_ta(&mut self, ta: PersonId) -> bool {
        if self.ta_ids.len() >= MAX_TAS {
            return false;
        }
        self.ta_ids.push(ta);
        true
    }

    #[must_use]
    pub fn is_taught_by(&self, instructor: PersonId) -> bool {
        self.instructor_id == Some(instructor)
    }

    #[must_use]
    pub fn has_ta(&self, ta: PersonId) -> bool {
        self.ta_ids.contains(&ta)
    }
}
