//! UI-agnostic controllers driving the scheduling screens.
//!
//! | Module   | Screen                                  |
//! |----------|-----------------------------------------|
//! | `tracks` | admin dashboard of scheduled tracks     |
//! | `slots`  | slot editor for one track               |

pub mod slots;
pub mod tracks;

pub use slots::{EditorPhase, LoadTicket, SlotEditor};
pub use tracks::TrackList;
