//! Client-session interaction history.
//!
//! A session is an explicit value owned by the presentation surface; it is
//! never persisted and lives only as long as its owner.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::types::Interaction;

/// Interactions of one client session, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    interactions: VecDeque<Interaction>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished interaction as the newest entry.
    pub fn record(&mut self, interaction: Interaction) {
        self.interactions.push_front(interaction);
    }

    /// Interactions, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.interactions.iter()
    }

    pub fn latest(&self) -> Option<&Interaction> {
        self.interactions.front()
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn clear(&mut self) {
        self.interactions.clear();
    }
}
