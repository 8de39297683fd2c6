use std::collections::{HashMap, HashSet};

use super::CourseTeamError;
use super::types::{CourseRow, RawCourseRow, RoleValue, RowState};

/// Checked/role state of every row exactly as loaded. Never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    states: HashMap<String, RowState>,
}

impl Baseline {
    pub fn get(&self, course_id: &str) -> Option<RowState> {
        self.states.get(course_id).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn course_ids(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }
}

/// The operator's live checked/role state, keyed by course id.
///
/// Starts as a copy of the baseline. Key set never changes after load;
/// mutators on unknown ids return `UnknownCourse` and leave state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    states: HashMap<String, RowState>,
}

impl EditState {
    pub fn get(&self, course_id: &str) -> Option<RowState> {
        self.states.get(course_id).copied()
    }

    pub fn is_checked(&self, course_id: &str) -> bool {
        self.states.get(course_id).is_some_and(|s| s.checked)
    }

    /// Current role, `NoRole` for ids outside the table.
    pub fn role(&self, course_id: &str) -> RoleValue {
        self.states.get(course_id).map_or(RoleValue::NoRole, |s| s.role)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn course_ids(&self) -> impl Iterator<Item = &str> {
        self.states.keys().map(String::as_str)
    }

    fn entry(&mut self, course_id: &str) -> Result<&mut RowState, CourseTeamError> {
        self.states
            .get_mut(course_id)
            .ok_or_else(|| CourseTeamError::UnknownCourse(course_id.to_string()))
    }

    /// Flip the checked flag. The stored role is left alone.
    pub fn toggle_checked(&mut self, course_id: &str) -> Result<bool, CourseTeamError> {
        let state = self.entry(course_id)?;
        state.checked = !state.checked;
        log::debug!("course {course_id} checked={}", state.checked);
        Ok(state.checked)
    }

    /// Set the role, whether or not the row is checked. Returns whether the
    /// stored value changed. `NoRole` cannot be chosen by an operator and is
    /// ignored.
    pub fn set_role(&mut self, course_id: &str, role: RoleValue) -> Result<bool, CourseTeamError> {
        let state = self.entry(course_id)?;
        if !role.is_assigned() {
            log::debug!("ignoring unassignable role for course {course_id}");
            return Ok(false);
        }
        let changed = state.role != role;
        state.role = role;
        Ok(changed)
    }

    /// Set `checked` on exactly the given ids. Every id is validated before
    /// any row is touched.
    pub fn set_checked_for_ids(
        &mut self,
        ids: &HashSet<String>,
        checked: bool,
    ) -> Result<(), CourseTeamError> {
        if let Some(missing) = ids.iter().find(|id| !self.states.contains_key(id.as_str())) {
            return Err(CourseTeamError::UnknownCourse(missing.clone()));
        }
        for id in ids {
            if let Some(state) = self.states.get_mut(id) {
                state.checked = checked;
            }
        }
        Ok(())
    }

    /// Bulk role action: assign `role` to every row in `ids` that is
    /// currently checked. Returns how many rows were visited.
    pub fn apply_role_to_checked(&mut self, ids: &HashSet<String>, role: RoleValue) -> usize {
        if !role.is_assigned() {
            return 0;
        }
        let mut touched = 0;
        for id in ids {
            if let Some(state) = self.states.get_mut(id) {
                if state.checked {
                    state.role = role;
                    touched += 1;
                }
            }
        }
        touched
    }
}

/// Normalize raw rows and build the baseline plus an identical edit state.
///
/// Rows without a course id, or with an id seen earlier in the input, are a
/// precondition violation: nothing is built.
pub fn initialize(
    raw_rows: &[RawCourseRow],
) -> Result<(Vec<CourseRow>, Baseline, EditState), CourseTeamError> {
    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut states = HashMap::with_capacity(raw_rows.len());

    for (index, raw) in raw_rows.iter().enumerate() {
        let course_id = match raw.course_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(CourseTeamError::MissingCourseId { index }),
        };
        if states.contains_key(&course_id) {
            return Err(CourseTeamError::DuplicateCourseId(course_id));
        }
        let role = RoleValue::from_raw(raw.role.as_deref());
        states.insert(course_id.clone(), RowState::from_role(role));
        rows.push(CourseRow {
            course_id,
            course_name: raw.course_name.clone().unwrap_or_default(),
            number: raw.number.clone().unwrap_or_default(),
            run: raw.run.clone().unwrap_or_default(),
            org: raw.org.clone().unwrap_or_default(),
            status: raw.status.clone().unwrap_or_default(),
            course_url: raw.course_url.clone().unwrap_or_default(),
        });
    }

    let baseline = Baseline { states: states.clone() };
    let edits = EditState { states };
    Ok((rows, baseline, edits))
}
