//! Cache Entry Module
//!
//! Defines the list-valued payload stored under each key.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

// == Values ==
/// Ordered list of strings held under a single key.
///
/// Duplicates are allowed and insertion order is preserved. A deque keeps
/// both prepend and append O(1).
pub type Values = VecDeque<String>;

// == Side ==
/// End of a value list an append targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Front of the list (`leftAdd`)
    Left,
    /// Back of the list (`rightAdd`)
    Right,
}

impl Side {
    // == Push ==
    /// Pushes `value` onto the matching end of `values`.
    pub fn push(self, values: &mut Values, value: String) {
        match self {
            Side::Left => values.push_front(value),
            Side::Right => values.push_back(value),
        }
    }
}

/// Builds a value list from anything yielding strings.
pub fn values_of<I, S>(items: I) -> Values
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_right_appends() {
        let mut values = values_of(["p", "q"]);
        Side::Right.push(&mut values, "x".to_string());
        assert_eq!(values, values_of(["p", "q", "x"]));
    }

    #[test]
    fn test_push_left_prepends() {
        let mut values = values_of(["p", "q"]);
        Side::Left.push(&mut values, "x".to_string());
        assert_eq!(values, values_of(["x", "p", "q"]));
    }

    #[test]
    fn test_duplicates_preserved() {
        let mut values = values_of(["a"]);
        Side::Right.push(&mut values, "a".to_string());
        assert_eq!(values.len(), 2);
    }
}
