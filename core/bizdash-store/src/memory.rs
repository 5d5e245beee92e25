use bizdash_model::{MemoryCategory, MemoryFact, MemoryFactDraft};

use crate::projections::MemoryPrompt;
use crate::{Store, StoreResult};

impl Store<MemoryFact> {
    /// Adds a fact; a missing category becomes [`MemoryCategory::General`].
    pub async fn add_fact(
        &self,
        content: impl Into<String>,
        category: Option<MemoryCategory>,
    ) -> StoreResult<()> {
        self.add(MemoryFactDraft::new(content, category)).await
    }

    /// Prompt text for the assistant, built with the default [`MemoryPrompt`].
    pub fn memory_prompt(&self) -> String {
        self.project(&MemoryPrompt::default())
    }
}
