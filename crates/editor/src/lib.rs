//! Edits a study's group → session → assessment tree through discrete
//! actions. Each applied action yields a new tree; the previous one is
//! left untouched.

pub mod action;
pub mod error;
pub mod ids;
pub mod invariants;
mod reducer;
mod state;

pub use action::{next_session_name, GroupAction};
pub use error::{EditError, InvariantViolation};
pub use ids::{IdSource, RandomIds, SequentialIds};
pub use invariants::{check_invariants, violations};
pub use reducer::{apply, apply_with};
pub use state::EditorState;

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod reducer_tests;

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod state_tests;
