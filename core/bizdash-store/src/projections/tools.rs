use bizdash_model::Tool;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::Projection;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolGroup {
    pub category: String,
    /// Favorites first, then collection order.
    pub tools: Vec<Tool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    /// Sorted by category name.
    pub groups: Vec<ToolGroup>,
    pub favorites: usize,
}

/// Groups the tools catalog for display.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolCatalog;

impl Projection<Tool> for ToolCatalog {
    type Output = CatalogView;

    fn project(&self, tools: &[Tool]) -> CatalogView {
        let mut grouped: BTreeMap<&str, Vec<Tool>> = BTreeMap::new();
        for tool in tools {
            grouped.entry(tool.category.as_str()).or_default().push(tool.clone());
        }

        let groups = grouped
            .into_iter()
            .map(|(category, mut tools)| {
                tools.sort_by_key(|t| !t.favorite);
                ToolGroup {
                    category: category.to_string(),
                    tools,
                }
            })
            .collect();

        CatalogView {
            groups,
            favorites: tools.iter().filter(|t| t.favorite).count(),
        }
    }
}
