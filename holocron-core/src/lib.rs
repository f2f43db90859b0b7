//! HOLOCRON core types.
//!
//! Shared record model and the structural diff used by the optimistic
//! profile patch flow, plus the listing entities served by the paginated
//! reference API.

pub mod entities;
pub mod error;
pub mod patch;
pub mod query_key;
pub mod record;

pub use entities::{Page, Person, Species};
pub use error::{PatchError, RecordError};
pub use patch::{apply_patch, diff, diff_records, OpKind, Patch, PatchOp};
pub use query_key::QueryKey;
pub use record::{RecordId, UserRecord};
