//! Human-readable report output

use cpm_recon::{Degradation, ProjectCostSummary, ReconciliationReport, TaskSource};
use std::fmt::Write;

/// Render a report as a fixed-width table followed by portfolio totals
pub(crate) fn report_text(report: &ReconciliationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<24} {:>12} {:>12} {:>6} {:>6} {:>6}  {:<16} {}",
        "PROJECT", "BUDGET", "REALIZED", "PROG%", "DONE", "OPEN", "SOURCE", "FLAGS"
    );
    for project in &report.projects {
        let _ = writeln!(out, "{}", project_line(project));
    }

    let stats = &report.stats;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} projects, {} tasks ({} done, {} open)",
        stats.total_projects, stats.total_tasks, stats.completed_tasks, stats.pending_tasks
    );
    let _ = writeln!(
        out,
        "budget {:.2}, realized {:.2}, progress {}%{}",
        stats.total_budget,
        stats.realized_cost,
        stats.progress_percentage(),
        if stats.is_over_budget() { " OVER BUDGET" } else { "" }
    );
    if stats.over_budget_projects > 0 || stats.degraded_projects > 0 {
        let _ = writeln!(
            out,
            "{} over budget, {} degraded",
            stats.over_budget_projects, stats.degraded_projects
        );
    }
    out
}

fn project_line(p: &ProjectCostSummary) -> String {
    let mut flags = Vec::new();
    if p.is_over_budget {
        flags.push("over-budget".to_string());
    }
    for degradation in &p.degradations {
        flags.push(match degradation {
            Degradation::NoTaskSource { failed_probes } => {
                format!("no-task-source({})", failed_probes.len())
            }
            Degradation::CostLookupFailed { task_ids } => {
                format!("cost-lookup-failed({})", task_ids.len())
            }
        });
    }

    format!(
        "{:<24} {:>12.2} {:>12.2} {:>6} {:>6} {:>6}  {:<16} {}",
        truncate(&p.project_name, 24),
        p.total_budget,
        p.realized_cost,
        p.progress_percentage,
        p.completed_tasks,
        p.pending_tasks,
        p.task_source.as_deref().unwrap_or("-"),
        flags.join(",")
    )
    .trim_end()
    .to_string()
}

/// One line per candidate, in probe order
pub(crate) fn sources_text(sources: &[TaskSource]) -> String {
    let mut out = String::new();
    for (i, source) in sources.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {:<18} {:<14} GET {}",
            i + 1,
            source.name,
            format!("{:?}", source.shape),
            source.path
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max - 1).collect();
        t.push('~');
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpm_recon::{aggregate, default_sources, ProjectMeta, TaskRecord};

    fn report() -> ReconciliationReport {
        let healthy = aggregate(
            &ProjectMeta::new("1", "Harbor Bridge", 1000.0),
            &[
                TaskRecord::new("11", "1").with_status("done").into_enriched(300.0),
                TaskRecord::new("12", "1").into_enriched(200.0),
            ],
        )
        .with_task_source(Some("kanban"));
        let degraded = aggregate(
            &ProjectMeta::new("2", "North Depot", 100.0),
            &[TaskRecord::new("21", "2").into_enriched(150.0)],
        )
        .with_degradation(Degradation::CostLookupFailed {
            task_ids: vec!["22".into()],
        });
        ReconciliationReport::from_projects(vec![healthy, degraded])
    }

    #[test]
    fn table_has_one_line_per_project() {
        let text = report_text(&report());
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].starts_with("PROJECT"));
        assert!(lines[1].starts_with("Harbor Bridge"));
        assert!(lines[1].contains("500.00"));
        assert!(lines[1].contains("kanban"));
        assert!(lines[2].starts_with("North Depot"));
        assert!(lines[2].ends_with("over-budget,cost-lookup-failed(1)"));
    }

    #[test]
    fn totals_follow_the_table() {
        let text = report_text(&report());

        assert!(text.contains("2 projects, 3 tasks (1 done, 2 open)"));
        assert!(text.contains("budget 1100.00, realized 650.00, progress 59%"));
        assert!(text.contains("1 over budget, 1 degraded"));
        assert!(!text.contains("OVER BUDGET"));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("abcdef", 4), "abc~");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn sources_are_listed_in_probe_order() {
        let text = sources_text(&default_sources());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("1. kanban"));
        assert!(lines[0].ends_with("GET /projects/{id}/tasks/kanban"));
        assert!(lines[3].starts_with("4. all_tasks"));
    }
}
