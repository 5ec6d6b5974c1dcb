//! Retryable tickets: aliasing, identification and L2 tracking.
//!
//! - [`alias`]: L1→L2 address aliasing and strict address parsing
//! - [`message`]: retryable messages decoded from an L1 receipt
//! - [`id`]: L2 creation id of a ticket
//! - [`status`]: following a ticket to its L2 execution

pub mod alias;
pub mod id;
pub mod message;
pub mod status;
pub mod types;

pub use alias::{apply_alias, parse_address, undo_alias, AddressError, ALIAS_OFFSET};
pub use id::retryable_creation_id;
pub use message::{parse_retryable_messages, MessageError};
pub use status::RetryableStateProvider;
pub use types::{RetryableMessage, RetryablePayload, RetryableStatus, TicketId};
