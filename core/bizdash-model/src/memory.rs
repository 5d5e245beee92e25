//! AI strategic memory.
//!
//! Facts the assistant should keep in mind across conversations. The
//! prompt projection in `bizdash-store` renders them as `[CATEGORY] content`.

use bizdash_types::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::require_non_blank;
use crate::{ModelResult, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum MemoryCategory {
    Strategy,
    Preference,
    Context,
    Goal,
    /// Fallback for missing, null or unrecognised categories.
    #[default]
    General,
}

impl MemoryCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryCategory::Strategy => "strategy",
            MemoryCategory::Preference => "preference",
            MemoryCategory::Context => "context",
            MemoryCategory::Goal => "goal",
            MemoryCategory::General => "general",
        }
    }

    /// Upper-case tag used in prompt text, e.g. `STRATEGY`.
    pub fn label(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl From<&str> for MemoryCategory {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strategy" => MemoryCategory::Strategy,
            "preference" => MemoryCategory::Preference,
            "context" => MemoryCategory::Context,
            "goal" => MemoryCategory::Goal,
            _ => MemoryCategory::General,
        }
    }
}

impl From<String> for MemoryCategory {
    fn from(raw: String) -> Self {
        MemoryCategory::from(raw.as_str())
    }
}

impl From<Option<String>> for MemoryCategory {
    fn from(raw: Option<String>) -> Self {
        raw.map(MemoryCategory::from).unwrap_or_default()
    }
}

/// One remembered fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFact {
    pub id: EntityId,
    #[serde(default)]
    pub category: MemoryCategory,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryFactDraft {
    #[serde(default)]
    pub category: MemoryCategory,
    pub content: String,
}

impl MemoryFactDraft {
    /// A draft with the category defaulting to [`MemoryCategory::General`].
    pub fn new(content: impl Into<String>, category: Option<MemoryCategory>) -> Self {
        Self {
            category: category.unwrap_or_default(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryFactPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MemoryCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Record for MemoryFact {
    const FAMILY: &'static str = "memory_facts";
    type Draft = MemoryFactDraft;
    type Patch = MemoryFactPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: EntityId, draft: MemoryFactDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            category: draft.category,
            content: draft.content,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: &MemoryFactPatch) {
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
    }

    fn validate(&self) -> ModelResult<()> {
        require_non_blank(Self::FAMILY, "content", &self.content)
    }
}
