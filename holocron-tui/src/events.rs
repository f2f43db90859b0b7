//! Event types for the TUI event loop.

use crossterm::event::KeyEvent;
use holocron_client::{Notification, PageRequest};
use holocron_core::{Page, Person, Species, UserRecord};

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Tick,
    Resize { width: u16, height: u16 },
    PeopleLoaded {
        request: PageRequest,
        result: Result<Page<Person>, String>,
    },
    SpeciesLoaded {
        request: PageRequest,
        result: Result<Page<Species>, String>,
    },
    Notify(Notification),
    MutationSettled(Result<(), String>),
    ApiError(String),
}

/// Side effects requested by the application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FetchPage(PageRequest),
    SubmitUser(UserRecord),
    RefetchUser,
    Quit,
}
