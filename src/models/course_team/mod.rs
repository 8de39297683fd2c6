//! Bulk-edit change tracking for a subject's course-team roles.
//!
//! ```text
//! raw rows --initialize--> Baseline (frozen)
//!                          EditState --toggle/set_role/bulk--> EditState
//! EditState + ViewQuery --current_page--> CoursePage
//! Baseline + EditState  --diff--------> ChangeSet --SaveController--> backend
//! ChangeSet non-empty   --------------> save enabled, navigation guarded
//! ```

use std::fmt;

pub mod diff;
pub mod guard;
pub mod save;
pub mod store;
pub mod table;
pub mod types;
pub mod view;

pub use diff::{ChangeSet, ChangedCourse, RoleChangedCourse};
pub use table::{CourseTable, LoadError, Subject, TableSnapshot};
pub use types::{CourseRow, RawCourseRow, RoleValue, RowState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseTeamError {
    /// Row at this input position has no usable course id.
    MissingCourseId { index: usize },
    DuplicateCourseId(String),
    UnknownCourse(String),
    NothingToSave,
    SaveInFlight,
    ReviewNotOpen,
    /// The confirmation dialog is up; edits wait until it closes.
    ReviewOpen,
}

impl fmt::Display for CourseTeamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseTeamError::MissingCourseId { index } => write!(f, "Course row {index} has no course_id"),
            CourseTeamError::DuplicateCourseId(id) => write!(f, "Course {id} appears more than once"),
            CourseTeamError::UnknownCourse(id) => write!(f, "Course {id} is not in this table"),
            CourseTeamError::NothingToSave => write!(f, "No unsaved changes"),
            CourseTeamError::SaveInFlight => write!(f, "A save is already in progress"),
            CourseTeamError::ReviewNotOpen => write!(f, "Changes must be reviewed before saving"),
            CourseTeamError::ReviewOpen => write!(f, "Close the review dialog before editing"),
        }
    }
}

impl std::error::Error for CourseTeamError {}
