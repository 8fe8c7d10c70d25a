//! # Conversation
//!
//! Ordered, append-only log of turns. Insertion order is chronological
//! order; turns are never reordered or edited after `append`.
//!
//! There is no cap or truncation: every prior turn goes into every request.

use crate::api::{Role, Turn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Read-only view of every turn, oldest first.
    pub fn history(&self) -> &[Turn] {
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

    /// True while the newest turn is the user's, i.e. a reply is owed.
    pub fn awaiting_reply(&self) -> bool {
        self.last().is_some_and(|t| t.role == Role::User)
    }
}
