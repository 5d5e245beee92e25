use bizdash_model::{Lead, MemoryFact};
use bizdash_store::projections::{CatalogView, FinanceReport, PipelineKpis};
use std::fmt::Write;

pub fn render_pipeline(kpis: &PipelineKpis) -> String {
    let mut out = format!(
        "Leads: {} (open {:.2}, won {:.2}, conversion {:.0}%)\n",
        kpis.total,
        kpis.open_value,
        kpis.won_value,
        kpis.conversion_rate * 100.0
    );
    for (stage, count) in &kpis.by_stage {
        let _ = writeln!(out, "  {:<10} {count}", stage.as_str());
    }
    out
}

pub fn render_finance(report: &FinanceReport) -> String {
    let mut out = format!(
        "Income {:.2}  Expenses {:.2}  Balance {:.2}\n",
        report.income, report.expenses, report.balance
    );
    for (month, net) in &report.net_by_month {
        let _ = writeln!(out, "  {month}  {net:>12.2}");
    }
    out
}

pub fn render_catalog(view: &CatalogView) -> String {
    let mut out = String::new();
    for group in &view.groups {
        let _ = writeln!(out, "{}", group.category);
        for tool in &group.tools {
            let star = if tool.favorite { "*" } else { " " };
            let _ = writeln!(out, "  {star} {}  {}", tool.name, tool.url);
        }
    }
    out
}

pub fn render_leads(leads: &[Lead]) -> String {
    let mut out = String::new();
    for lead in leads {
        let _ = writeln!(
            out,
            "{}  {:<10} {:>10.2}  {}",
            lead.id,
            lead.stage.as_str(),
            lead.value,
            lead.name
        );
    }
    out
}

pub fn render_facts(facts: &[MemoryFact]) -> String {
    let mut out = String::new();
    for fact in facts {
        let _ = writeln!(out, "{}  [{}] {}", fact.id, fact.category.label(), fact.content);
    }
    out
}
