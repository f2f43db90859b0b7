//! Application state and view state definitions.
//!
//! `App` never performs I/O itself: handlers return [`Command`]s and the
//! event loop runs them, feeding results back as [`TuiEvent`]s.

use crate::config::TuiConfig;
use crate::events::{Command, TuiEvent};
use crate::keys::{editor_input, map_key, Action};
use crate::nav::View;
use crate::theme::Theme;
use chrono::{Duration as ChronoDuration, Utc};
use crossterm::event::KeyEvent;
use holocron_cache::QuerySlot;
use holocron_client::{InfiniteQuery, Notification, NotificationLevel, PageRequest};
use holocron_core::{Page, Person, QueryKey, Species, UserRecord};
use serde_json::Value;
use tui_textarea::{CursorMove, TextArea};

const MAX_NOTIFICATIONS: usize = 50;
const TOAST_SECONDS: i64 = 5;

/// Fields that identify the session rather than describe the user.
const CREDENTIAL_FIELDS: [&str; 2] = ["id", "token"];

/// A paginated list with a cursor.
#[derive(Debug, Clone)]
pub struct ListViewState<T> {
    pub query: InfiniteQuery<T>,
    pub selected: Option<usize>,
}

impl<T> ListViewState<T> {
    pub fn new(key: QueryKey, initial_url: impl Into<String>) -> Self {
        Self {
            query: InfiniteQuery::new(key, initial_url),
            selected: None,
        }
    }

    /// Move down one item. Landing on the last loaded item asks for the
    /// next page when there is one.
    pub fn select_next(&mut self) -> Option<PageRequest> {
        let count = self.query.item_count();
        if count == 0 {
            self.selected = None;
            return None;
        }
        let next = match self.selected {
            None => 0,
            Some(index) => (index + 1).min(count - 1),
        };
        self.selected = Some(next);
        if next + 1 == count && self.query.has_next_page() {
            return self.query.begin();
        }
        None
    }

    pub fn select_previous(&mut self) {
        if self.query.item_count() == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(self.selected.map_or(0, |index| index.saturating_sub(1)));
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.selected.and_then(|index| self.query.items().nth(index))
    }

    /// Drop loaded pages and request the first one again.
    pub fn refresh(&mut self) -> Option<PageRequest> {
        self.query.reset();
        self.selected = None;
        self.query.begin()
    }

    pub fn complete(&mut self, request: &PageRequest, result: Result<Page<T>, String>) {
        if self.query.complete(request, result)
            && self.selected.is_none()
            && self.query.item_count() > 0
        {
            self.selected = Some(0);
        }
    }
}

/// In-progress edit of one profile field.
#[derive(Debug, Clone)]
pub struct FieldEditor {
    pub field: String,
    pub textarea: TextArea<'static>,
}

impl FieldEditor {
    pub fn new(field: impl Into<String>, current: Option<&Value>) -> Self {
        let text = match current {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let mut textarea = TextArea::new(vec![text]);
        textarea.move_cursor(CursorMove::End);
        Self {
            field: field.into(),
            textarea,
        }
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// The typed text as JSON, or as a plain string when it does not parse.
    pub fn value(&self) -> Value {
        let text = self.text();
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileViewState {
    pub selected: usize,
    pub editor: Option<FieldEditor>,
    pub saving: bool,
}

pub struct App {
    pub config: TuiConfig,
    pub theme: Theme,
    pub active_view: View,
    pub people: ListViewState<Person>,
    pub species: ListViewState<Species>,
    pub profile: ProfileViewState,
    pub user: QuerySlot<UserRecord>,
    pub notifications: Vec<Notification>,
}

impl App {
    pub fn new(config: TuiConfig, user: QuerySlot<UserRecord>) -> Self {
        let people = ListViewState::new(QueryKey::PEOPLE, config.swapi.people_url.clone());
        let species = ListViewState::new(QueryKey::SPECIES, config.swapi.species_url.clone());
        Self {
            config,
            theme: Theme::holocron(),
            active_view: View::People,
            people,
            species,
            profile: ProfileViewState::default(),
            user,
            notifications: Vec::new(),
        }
    }

    /// Initial loads: the first page of each list and the server copy of the user.
    pub fn start(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        commands.extend(self.people.query.begin().map(Command::FetchPage));
        commands.extend(self.species.query.begin().map(Command::FetchPage));
        commands.push(Command::RefetchUser);
        commands
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.push_notification(Notification::new(level, message));
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    /// Latest notification, while it is still fresh enough to show.
    pub fn active_toast(&self) -> Option<&Notification> {
        let note = self.notifications.last()?;
        let age = Utc::now().signed_duration_since(note.created_at);
        (age < ChronoDuration::seconds(TOAST_SECONDS)).then_some(note)
    }

    pub fn handle_event(&mut self, event: TuiEvent) -> Vec<Command> {
        match event {
            TuiEvent::Input(key) => {
                if self.profile.editor.is_some() {
                    return self.handle_editor_key(key);
                }
                match map_key(key) {
                    Some(action) => self.handle_action(action),
                    None => Vec::new(),
                }
            }
            TuiEvent::PeopleLoaded { request, result } => {
                self.people.complete(&request, result);
                Vec::new()
            }
            TuiEvent::SpeciesLoaded { request, result } => {
                self.species.complete(&request, result);
                Vec::new()
            }
            TuiEvent::Notify(notification) => {
                self.push_notification(notification);
                Vec::new()
            }
            TuiEvent::MutationSettled(result) => {
                self.profile.saving = false;
                if let Err(reason) = result {
                    tracing::debug!(%reason, "profile update settled with error");
                }
                Vec::new()
            }
            TuiEvent::ApiError(message) => {
                self.notify(NotificationLevel::Error, message);
                Vec::new()
            }
            TuiEvent::Tick | TuiEvent::Resize { .. } => Vec::new(),
        }
    }

    pub fn handle_action(&mut self, action: Action) -> Vec<Command> {
        match action {
            Action::Quit => return vec![Command::Quit],
            Action::NextView => self.active_view = self.active_view.next(),
            Action::PrevView => self.active_view = self.active_view.previous(),
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.active_view = view;
                }
            }
            Action::MoveDown => {
                let request = match self.active_view {
                    View::People => self.people.select_next(),
                    View::Species => self.species.select_next(),
                    View::Profile => {
                        let count = self.profile_fields().len();
                        if count > 0 {
                            self.profile.selected = (self.profile.selected + 1).min(count - 1);
                        }
                        None
                    }
                };
                return request.map(Command::FetchPage).into_iter().collect();
            }
            Action::MoveUp => match self.active_view {
                View::People => self.people.select_previous(),
                View::Species => self.species.select_previous(),
                View::Profile => self.profile.selected = self.profile.selected.saturating_sub(1),
            },
            Action::Refresh => {
                let command = match self.active_view {
                    View::People => self.people.refresh().map(Command::FetchPage),
                    View::Species => self.species.refresh().map(Command::FetchPage),
                    View::Profile => Some(Command::RefetchUser),
                };
                return command.into_iter().collect();
            }
            Action::EditItem => {
                if self.active_view == View::Profile {
                    self.open_editor();
                }
            }
            Action::Confirm | Action::Cancel => {}
        }
        Vec::new()
    }

    /// Editable fields of the cached user, sorted by name.
    pub fn profile_fields(&self) -> Vec<(String, Value)> {
        self.user
            .get()
            .map(|user| {
                user.fields()
                    .filter(|(field, _)| !CREDENTIAL_FIELDS.contains(&field.as_str()))
                    .map(|(field, value)| (field.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn selected_profile_field(&self) -> Option<(String, Value)> {
        let fields = self.profile_fields();
        let index = self.profile.selected.min(fields.len().checked_sub(1)?);
        fields.into_iter().nth(index)
    }

    fn open_editor(&mut self) {
        if self.profile.saving {
            self.notify(NotificationLevel::Info, "Update in progress");
            return;
        }
        if let Some((field, value)) = self.selected_profile_field() {
            self.profile.editor = Some(FieldEditor::new(field, Some(&value)));
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match map_key(key) {
            Some(Action::Cancel) => {
                self.profile.editor = None;
                Vec::new()
            }
            Some(Action::Confirm) => self.submit_edit().into_iter().collect(),
            _ => {
                if let Some(editor) = self.profile.editor.as_mut() {
                    editor.textarea.input(editor_input(key));
                }
                Vec::new()
            }
        }
    }

    fn submit_edit(&mut self) -> Option<Command> {
        let editor = self.profile.editor.take()?;
        let Some(user) = self.user.get() else {
            self.notify(NotificationLevel::Warning, "Not signed in");
            return None;
        };
        let updated = user.clone().with(editor.field.clone(), editor.value());
        if updated == user {
            return None;
        }
        tracing::debug!(field = %editor.field, "submitting profile edit");
        self.profile.saving = true;
        Some(Command::SubmitUser(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(page: &[&str]) -> Vec<String> {
        page.iter().map(|s| s.to_string()).collect()
    }

    fn loaded_list(first: &[&str], next: Option<&str>) -> ListViewState<String> {
        let mut list = ListViewState::new(QueryKey::PEOPLE, "u1");
        let request = list.query.begin().unwrap();
        list.complete(&request, Ok(Page::new(names(first), next.map(str::to_string))));
        list
    }

    #[test]
    fn test_first_page_selects_first_item() {
        let list = loaded_list(&["a", "b"], None);
        assert_eq!(list.selected, Some(0));
        assert_eq!(list.selected_item().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_reaching_last_item_requests_next_page() {
        let mut list = loaded_list(&["a", "b", "c"], Some("u2"));
        assert_eq!(list.select_next(), None);
        let request = list.select_next().expect("next page requested");
        assert_eq!(request.url, "u2");
        // Already fetching: no duplicate request.
        assert_eq!(list.select_next(), None);
        assert_eq!(list.selected, Some(2));
    }

    #[test]
    fn test_last_page_never_requests_more() {
        let mut list = loaded_list(&["a", "b"], None);
        assert_eq!(list.select_next(), None);
        assert_eq!(list.select_next(), None);
        assert_eq!(list.selected, Some(1));
    }

    #[test]
    fn test_select_previous_stops_at_top() {
        let mut list = loaded_list(&["a", "b"], None);
        list.select_previous();
        assert_eq!(list.selected, Some(0));
    }

    #[test]
    fn test_refresh_restarts_list() {
        let mut list = loaded_list(&["a"], Some("u2"));
        let request = list.refresh().unwrap();
        assert_eq!(request.url, "u1");
        assert_eq!(list.selected, None);
        assert!(list.query.is_loading());
    }

    #[test]
    fn test_editor_value_parses_json_or_falls_back_to_string() {
        let editor = FieldEditor::new("age", Some(&Value::from(41)));
        assert_eq!(editor.text(), "41");
        assert_eq!(editor.value(), Value::from(41));

        let editor = FieldEditor::new("name", Some(&Value::String("Han Solo".into())));
        assert_eq!(editor.text(), "Han Solo");
        assert_eq!(editor.value(), Value::String("Han Solo".into()));
    }
}
