//! HOLOCRON Test Utilities
//!
//! Shared test infrastructure for the HOLOCRON workspace:
//! - Proptest generators for JSON documents and user records
//! - Fixtures for common records and pages
//! - Mock API and notifier implementations

pub use holocron_client::{
    ApiClientError, Notification, NotificationLevel, Notifier, PageSource, UserApi,
};
pub use holocron_core::{apply_patch, Page, Patch, Person, Species, UserRecord};

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

// ============================================================================
// MOCKS
// ============================================================================

/// Notifier that keeps everything it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(NotificationLevel, String)> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|n| (n.level, n.message.clone()))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.lock().unwrap().push(notification);
    }
}

/// How [`MockUserApi`] answers the next patch request.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Apply the patch to the original and return the result.
    Accept,
    /// Return this record regardless of the patch.
    Respond(UserRecord),
    /// Fail with an HTTP status.
    Reject { status: u16, body: String },
}

/// A patch request as the mock received it.
#[derive(Debug, Clone)]
pub struct PatchCall {
    pub original: UserRecord,
    pub patch: Patch,
}

/// In-memory user service.
///
/// Patch replies are consumed in order; once the script is exhausted every
/// request is accepted. `get_user` returns the last record the "server"
/// stored, or echoes the request when nothing was stored yet.
#[derive(Debug, Default)]
pub struct MockUserApi {
    replies: Mutex<VecDeque<ScriptedReply>>,
    server_user: Mutex<Option<UserRecord>>,
    patches: Mutex<Vec<PatchCall>>,
    user_fetches: AtomicUsize,
    fail_fetches: AtomicBool,
}

impl MockUserApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        let api = Self::new();
        api.replies.lock().unwrap().extend(replies);
        api
    }

    pub fn rejecting(status: u16, body: impl Into<String>) -> Self {
        Self::with_replies([ScriptedReply::Reject {
            status,
            body: body.into(),
        }])
    }

    pub fn set_server_user(&self, user: UserRecord) {
        *self.server_user.lock().unwrap() = Some(user);
    }

    pub fn set_fetch_failure(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn patch_calls(&self) -> Vec<PatchCall> {
        self.patches.lock().unwrap().clone()
    }

    pub fn user_fetches(&self) -> usize {
        self.user_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserApi for MockUserApi {
    async fn patch_user(
        &self,
        original: &UserRecord,
        patch: &Patch,
    ) -> Result<UserRecord, ApiClientError> {
        self.patches.lock().unwrap().push(PatchCall {
            original: original.clone(),
            patch: patch.clone(),
        });
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScriptedReply::Accept);

        let user = match reply {
            ScriptedReply::Accept => {
                let mut doc = original.to_value();
                apply_patch(&mut doc, patch).map_err(|e| ApiClientError::Status {
                    status: 422,
                    body: e.to_string(),
                })?;
                UserRecord::from_value(doc)?
            }
            ScriptedReply::Respond(user) => user,
            ScriptedReply::Reject { status, body } => {
                return Err(ApiClientError::Status { status, body })
            }
        };
        *self.server_user.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn get_user(&self, user: &UserRecord) -> Result<UserRecord, ApiClientError> {
        self.user_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(ApiClientError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let stored = self.server_user.lock().unwrap().clone();
        Ok(stored.unwrap_or_else(|| user.clone()))
    }
}

/// Page source serving fixed pages by URL.
#[derive(Debug)]
pub struct StaticPageSource<T> {
    pages: HashMap<String, Page<T>>,
    requests: Mutex<Vec<String>>,
}

impl<T> StaticPageSource<T> {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, url: impl Into<String>, page: Page<T>) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl<T> Default for StaticPageSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> PageSource<T> for StaticPageSource<T>
where
    T: Clone + Send + Sync,
{
    async fn fetch_page(&self, url: &str) -> Result<Page<T>, ApiClientError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ApiClientError::Status {
                status: 404,
                body: format!("no page at {}", url),
            })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for JSON documents and records.
    //!
    //! Numbers are integers only so equality survives a JSON round trip.

    use super::*;
    use proptest::collection::{btree_map, vec};
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    /// Object keys, including the characters JSON Pointer must escape.
    pub fn arb_key() -> impl Strategy<Value = String> {
        "[a-z~/]{1,4}"
    }

    pub fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 ]{0,8}".prop_map(Value::String),
        ]
    }

    pub fn arb_json_value() -> impl Strategy<Value = Value> {
        arb_scalar().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                vec(inner.clone(), 0..4).prop_map(Value::Array),
                btree_map(arb_key(), inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
            ]
        })
    }

    /// A user record with a stable id and token plus random profile fields.
    pub fn arb_user_record() -> impl Strategy<Value = UserRecord> {
        (
            1u32..1000,
            "[a-z0-9]{8}",
            btree_map("[a-z]{2,8}", arb_json_value(), 0..5),
        )
            .prop_map(|(id, token, fields)| {
                let mut record = UserRecord::new()
                    .with("id", Value::from(id))
                    .with("token", Value::String(token));
                for (field, value) in fields {
                    if field != "id" && field != "token" {
                        record.set(field, value);
                    }
                }
                record
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Records and pages for common scenarios.

    use super::*;
    use serde_json::json;

    pub fn user_fixture() -> UserRecord {
        UserRecord::from_value(json!({
            "id": 7,
            "name": "Leia Organa",
            "email": "leia@alderaan.gov",
            "address": "Royal Palace, Aldera",
            "token": "header.payload.signature"
        }))
        .expect("fixture is an object")
    }

    pub fn person(name: &str) -> Person {
        Person {
            name: name.to_string(),
            hair_color: Some("brown".to_string()),
            eye_color: Some("brown".to_string()),
        }
    }

    pub fn species(name: &str) -> Species {
        Species {
            name: name.to_string(),
            language: Some("Galactic Basic".to_string()),
            average_lifespan: Some("120".to_string()),
        }
    }

    pub fn people_page(names: &[&str], next: Option<&str>) -> Page<Person> {
        Page::new(
            names.iter().map(|name| person(name)).collect(),
            next.map(str::to_string),
        )
    }

    pub fn species_page(names: &[&str], next: Option<&str>) -> Page<Species> {
        Page::new(
            names.iter().map(|name| species(name)).collect(),
            next.map(str::to_string),
        )
    }
}
