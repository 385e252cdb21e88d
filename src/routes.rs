//! Client-side routes of the scheduling app.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Slot editor, optionally for a specific track.
    Slots(Option<String>),
    /// Admin dashboard of saved schedules.
    SavedSchedules,
    /// Fallback for anything unrecognised.
    Home,
}

impl Route {
    /// Resolve a path. Unknown paths redirect to `/`.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["slots"] => Route::Slots(None),
            ["slots", id] => Route::Slots(Some((*id).to_string())),
            ["saved"] => Route::SavedSchedules,
            _ => Route::Home,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Slots(None) => "/slots".to_string(),
            Route::Slots(Some(id)) => format!("/slots/{}", id),
            Route::SavedSchedules => "/saved".to_string(),
            Route::Home => "/".to_string(),
        }
    }

    pub fn track_id(&self) -> Option<&str> {
        match self {
            Route::Slots(Some(id)) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
