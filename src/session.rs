use actix_session::Session;

use crate::models::course_team::guard::UnsavedFlagStore;

/// Unsaved-changes flags kept in the operator's cookie session, so a revisit
/// within the same session can warn before the table is reloaded.
pub struct SessionFlagStore<'a> {
    session: &'a Session,
}

impl<'a> SessionFlagStore<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

impl UnsavedFlagStore for SessionFlagStore<'_> {
    fn put(&mut self, key: &str, value: bool) {
        if let Err(e) = self.session.insert(key, value) {
            log::warn!("Failed to store {key} in session: {e}");
        }
    }

    fn get(&self, key: &str) -> Option<bool> {
        self.session.get::<bool>(key).unwrap_or(None)
    }
}
