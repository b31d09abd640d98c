//! Line Protocol Commands
//!
//! Parses one text line into a cache command and renders its reply.
//!
//! Fields are separated by `_`. The last field of `set`, `rightadd` and
//! `leftadd` takes the remainder of the line, so values may contain `_`.

use std::str::FromStr;

use crate::cache::{LruPersistentCache, Side, Values};
use crate::error::CacheError;

/// Reply sent before the server closes a session on `exit`.
pub const GOODBYE: &str = "Goodbye!";

// == Command ==
/// A parsed client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `get_<key>`
    Get { key: String },
    /// `getallkeys_<prefix>`
    GetAllKeys { prefix: String },
    /// `set_<key>_<v1,v2,...>`
    Set { key: String, values: Values },
    /// `rightadd_<key>_<value>` / `leftadd_<key>_<value>`
    Add {
        key: String,
        value: String,
        side: Side,
    },
    /// `exit`
    Exit,
}

impl FromStr for Command {
    type Err = CacheError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.eq_ignore_ascii_case("exit") {
            return Ok(Command::Exit);
        }

        let mut fields = line.splitn(3, '_');
        let name = fields.next().unwrap_or_default().to_ascii_lowercase();
        let key = fields.next().filter(|key| !key.is_empty());
        let payload = fields.next();

        let command = match (name.as_str(), key, payload) {
            ("get", Some(key), None) => Command::Get {
                key: key.to_string(),
            },
            ("getallkeys", prefix, None) => Command::GetAllKeys {
                prefix: prefix.unwrap_or_default().to_string(),
            },
            ("set", Some(key), Some(values)) => Command::Set {
                key: key.to_string(),
                values: values.split(',').map(str::to_string).collect(),
            },
            ("rightadd", Some(key), Some(value)) => Command::Add {
                key: key.to_string(),
                value: value.to_string(),
                side: Side::Right,
            },
            ("leftadd", Some(key), Some(value)) => Command::Add {
                key: key.to_string(),
                value: value.to_string(),
                side: Side::Left,
            },
            _ => return Err(CacheError::InvalidCommand(line.to_string())),
        };
        Ok(command)
    }
}

impl Command {
    /// True if the session should close after replying.
    pub fn is_exit(&self) -> bool {
        matches!(self, Command::Exit)
    }

    // == Execute ==
    /// Runs the command against `cache` and renders the one-line reply.
    ///
    /// May block on disk I/O when a lookup misses the in-memory tiers.
    pub fn execute(self, cache: &LruPersistentCache) -> String {
        match self {
            Command::Get { key } => match cache.get(&key) {
                Some(values) => join_values(&values),
                None => format!("Following key does not exist: {}", key),
            },
            Command::GetAllKeys { prefix } => {
                let keys = cache.get_all_keys(&prefix);
                if keys.is_empty() {
                    format!("No keys are available for pattern: {}", prefix)
                } else {
                    keys.into_iter().collect::<Vec<_>>().join(",")
                }
            }
            Command::Set { key, values } => {
                let joined = join_values(&values);
                cache.set(&key, values);
                format!(
                    "List of values [{}] was associated with key {} successfully.",
                    joined, key
                )
            }
            Command::Add { key, value, side } => {
                let reply = match side {
                    Side::Right => format!(
                        "Right add of val {} to key {} was done successfully.",
                        value, key
                    ),
                    Side::Left => format!(
                        "Left add of val {} to key {} was done successfully.",
                        value, key
                    ),
                };
                match side {
                    Side::Right => cache.right_add(&key, value),
                    Side::Left => cache.left_add(&key, value),
                }
                reply
            }
            Command::Exit => GOODBYE.to_string(),
        }
    }
}

fn join_values(values: &Values) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}
