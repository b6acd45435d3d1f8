//! # Conversation History
//!
//! Where the sidebar gets its list of conversations from. Storage is not
//! part of this crate, so the list comes from a [`ConversationDirectory`];
//! the stock implementation serves a fixed seed.

use serde::{Deserialize, Serialize};

/// A conversation's identifier and display title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
}

impl ConversationSummary {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Source of known conversations, most relevant first.
pub trait ConversationDirectory: Send + Sync {
    fn conversations(&self) -> Vec<ConversationSummary>;
}

/// A directory over a fixed list.
pub struct SeedDirectory {
    entries: Vec<ConversationSummary>,
}

impl SeedDirectory {
    pub fn new(entries: Vec<ConversationSummary>) -> Self {
        Self { entries }
    }
}

impl Default for SeedDirectory {
    fn default() -> Self {
        Self::new(default_seed())
    }
}

impl ConversationDirectory for SeedDirectory {
    fn conversations(&self) -> Vec<ConversationSummary> {
        self.entries.clone()
    }
}

/// The built-in sample conversations.
pub fn default_seed() -> Vec<ConversationSummary> {
    let mut seed = vec![ConversationSummary::new(
        "1",
        "This is chat 1, It's a long name for a chat",
    )];
    seed.extend((2..=9).map(|n| ConversationSummary::new(n.to_string(), format!("This is chat {n}"))));
    seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_has_nine_unique_entries() {
        let seed = default_seed();
        assert_eq!(seed.len(), 9);
        assert_eq!(seed[0].id, "1");
        assert!(seed[0].title.contains("long name"));
        assert_eq!(seed[8], ConversationSummary::new("9", "This is chat 9"));

        let mut ids: Vec<&str> = seed.iter().map(|c| c.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn test_seed_directory_serves_its_entries() {
        let dir = SeedDirectory::new(vec![ConversationSummary::new("a", "Alpha")]);
        assert_eq!(dir.conversations(), vec![ConversationSummary::new("a", "Alpha")]);
    }

    #[test]
    fn test_default_directory_uses_seed() {
        assert_eq!(SeedDirectory::default().conversations(), default_seed());
    }
}
