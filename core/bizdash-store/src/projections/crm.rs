use bizdash_model::{Lead, LeadStage};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::Projection;

/// Pipeline KPIs for the CRM dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineKpis {
    pub total: usize,
    /// Every stage is present, zero when empty.
    pub by_stage: BTreeMap<LeadStage, usize>,
    /// Deal value of leads not yet won or lost.
    pub open_value: f64,
    pub won_value: f64,
    /// Won / (won + lost); 0 when nothing has closed.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeadPipeline;

impl Projection<Lead> for LeadPipeline {
    type Output = PipelineKpis;

    fn project(&self, leads: &[Lead]) -> PipelineKpis {
        let mut by_stage: BTreeMap<LeadStage, usize> =
            LeadStage::ALL.iter().map(|s| (*s, 0)).collect();
        let mut open_value = 0.0;
        let mut won_value = 0.0;

        for lead in leads {
            *by_stage.entry(lead.stage).or_default() += 1;
            match lead.stage {
                LeadStage::Won => won_value += lead.value,
                LeadStage::Lost => {}
                _ => open_value += lead.value,
            }
        }

        let won = by_stage[&LeadStage::Won];
        let closed = won + by_stage[&LeadStage::Lost];
        let conversion_rate = if closed == 0 {
            0.0
        } else {
            won as f64 / closed as f64
        };

        PipelineKpis {
            total: leads.len(),
            by_stage,
            open_value,
            won_value,
            conversion_rate,
        }
    }
}
