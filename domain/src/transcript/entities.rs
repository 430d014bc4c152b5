//! Transcript domain entities

use serde::{Deserialize, Serialize};

/// Role of a turn in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in a conversation (Entity)
///
/// Turns are immutable once appended to a [`Transcript`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered history of turns for one session
///
/// Serialized as a plain JSON array of `{role, content}` records, which is
/// also the persisted layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    /// Append a turn at the end. There is no way to edit or remove turns.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}

impl From<Vec<Turn>> for Transcript {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_preserves_order() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user("hello"));
        transcript.push(Turn::assistant("hi there"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0], Turn::user("hello"));
        assert_eq!(transcript.last(), Some(&Turn::assistant("hi there")));
    }

    #[test]
    fn test_persisted_layout_is_role_content_list() {
        let transcript = Transcript::from(vec![Turn::user("hello"), Turn::assistant("hi")]);
        let json = serde_json::to_value(&transcript).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "hi"}
            ])
        );

        let back: Transcript = serde_json::from_value(json).unwrap();
        assert_eq!(back, transcript);
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result: Result<Transcript, _> =
            serde_json::from_str(r#"[{"role": "system", "content": "x"}]"#);
        assert!(result.is_err());
    }
}
