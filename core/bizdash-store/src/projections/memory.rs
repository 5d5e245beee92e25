use bizdash_model::MemoryFact;

use crate::Projection;

/// Returned when there are no facts, so prompt assembly always has text.
pub const EMPTY_MEMORY_PROMPT: &str = "No strategic memory recorded yet.";

/// Renders memory facts as prompt text, one `[CATEGORY] content` line each.
#[derive(Debug, Clone)]
pub struct MemoryPrompt {
    pub header: String,
}

impl Default for MemoryPrompt {
    fn default() -> Self {
        Self {
            header: "Strategic memory about this business:".to_string(),
        }
    }
}

impl Projection<MemoryFact> for MemoryPrompt {
    type Output = String;

    fn project(&self, facts: &[MemoryFact]) -> String {
        if facts.is_empty() {
            return EMPTY_MEMORY_PROMPT.to_string();
        }
        let mut out = self.header.clone();
        for fact in facts {
            out.push('\n');
            out.push('[');
            out.push_str(&fact.category.label());
            out.push_str("] ");
            out.push_str(fact.content.trim());
        }
        out
    }
}
