//! Entity model for bizdash.
//!
//! Defines the typed records every store synchronizes:
//! - [`Record`] - identity, family name, draft/patch shapes and validation
//! - [`Lead`], [`Transaction`], [`Tool`], [`MemoryFact`] - the data families
//! - [`Session`] - the signed-in user, held by the auth store
//!
//! Wire rows enter the system only through [`decode_row`] / [`decode_rows`],
//! which deserialize and validate in one step.

mod decode;
mod error;
mod lead;
mod memory;
mod record;
mod session;
mod tool;
mod transaction;

pub use decode::{decode_row, decode_rows};
pub use error::{ModelError, ModelResult};
pub use lead::{Lead, LeadDraft, LeadPatch, LeadStage};
pub use memory::{MemoryCategory, MemoryFact, MemoryFactDraft, MemoryFactPatch};
pub use record::Record;
pub use session::{Credentials, Session, UserProfile};
pub use tool::{Tool, ToolDraft, ToolPatch};
pub use transaction::{Transaction, TransactionDraft, TransactionKind, TransactionPatch};

pub use bizdash_types::EntityId;
