//! Tools catalog entries.

use bizdash_types::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, require_non_blank};
use crate::{ModelResult, Record};

/// A bookmarked external tool shown in the tools module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: EntityId,
    pub name: String,
    pub url: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDraft {
    pub name: String,
    pub url: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub favorite: bool,
}

impl ToolDraft {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            category: category.into(),
            description: None,
            favorite: false,
        }
    }

    pub fn favorite(mut self) -> Self {
        self.favorite = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

impl Record for Tool {
    const FAMILY: &'static str = "tools";
    type Draft = ToolDraft;
    type Patch = ToolPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: EntityId, draft: ToolDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            url: draft.url,
            category: draft.category,
            description: draft.description,
            favorite: draft.favorite,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: &ToolPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(favorite) = patch.favorite {
            self.favorite = favorite;
        }
    }

    fn validate(&self) -> ModelResult<()> {
        require_non_blank(Self::FAMILY, "name", &self.name)?;
        require_non_blank(Self::FAMILY, "category", &self.category)?;
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ModelError::invalid(
                Self::FAMILY,
                "url",
                format!("must be an http(s) URL, got {:?}", self.url),
            ));
        }
        Ok(())
    }
}
