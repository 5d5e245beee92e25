//! Derived projections consumed by dashboard modules.

mod crm;
mod finance;
mod memory;
mod tools;

pub use crm::{LeadPipeline, PipelineKpis};
pub use finance::{FinanceReport, FinanceSummary};
pub use memory::{EMPTY_MEMORY_PROMPT, MemoryPrompt};
pub use tools::{CatalogView, ToolCatalog, ToolGroup};
