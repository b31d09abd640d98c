//! Protocol Module
//!
//! Line-oriented text protocol over TCP.
//!
//! # Commands
//! - `get_<key>` - Values under a key, comma-joined
//! - `getallkeys_<prefix>` - Keys starting with a prefix
//! - `set_<key>_<v1,v2,...>` - Replace a key's list
//! - `rightadd_<key>_<value>` - Append to a list
//! - `leftadd_<key>_<value>` - Prepend to a list
//! - `exit` - Close the session

mod command;
mod server;

pub use command::{Command, GOODBYE};
pub use server::{handle_session, serve, MAX_LINE_LENGTH};
