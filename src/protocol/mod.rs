//! Protocol Module
//!
//! Defines the text protocol spoken over the transport.
//!
//! ## Requests
//! One command per message:
//! - `get <key>`
//! - `delete <key>`
//! - `set <key> <value>` or `set <key> "<value with spaces>"`
//!
//! ## Responses
//! - `OK <value>`: get hit
//! - `-OK`:        get miss
//! - `OK 1|0`:     set (new key / overwrite), delete (removed / absent)
//! - `ERR <msg>`:  parse or persistence failure

mod command;
mod parser;
mod response;

pub use command::{CommandName, Query};
pub use parser::{parse, ParseError};
pub use response::Response;
