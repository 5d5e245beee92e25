//! Finance transactions.

use bizdash_types::EntityId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, require_non_blank};
use crate::{ModelResult, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// A single income or expense entry.
///
/// `amount` is always positive; the sign comes from `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: EntityId,
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with income positive and expenses negative.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    pub date: NaiveDate,
}

impl TransactionDraft {
    pub fn income(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            kind: TransactionKind::Income,
            category: category.into(),
            date,
        }
    }

    pub fn expense(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind: TransactionKind::Expense,
            ..Self::income(description, amount, category, date)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Record for Transaction {
    const FAMILY: &'static str = "transactions";
    type Draft = TransactionDraft;
    type Patch = TransactionPatch;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: EntityId, draft: TransactionDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            description: draft.description,
            amount: draft.amount,
            kind: draft.kind,
            category: draft.category,
            date: draft.date,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: &TransactionPatch) {
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }

    fn validate(&self) -> ModelResult<()> {
        require_non_blank(Self::FAMILY, "description", &self.description)?;
        require_non_blank(Self::FAMILY, "category", &self.category)?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ModelError::invalid(
                Self::FAMILY,
                "amount",
                format!("must be positive, got {}", self.amount),
            ));
        }
        Ok(())
    }
}
