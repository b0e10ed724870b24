//! Report rendering shared by CLI commands.

use anyhow::{Context, Result};

use crate::data::{AnalysisReport, CommitReport, OutputFormat};
use crate::web::PageContent;

/// Renders a report in the requested format.
pub(crate) fn render_report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).context("Failed to serialize report to YAML")
        }
    }
}

/// Formats a duration in seconds as e.g. `45s`, `3m 20s` or `2h 05m`.
pub(crate) fn format_duration(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let s = seconds.unsigned_abs();
    if s < 60 {
        format!("{sign}{s}s")
    } else if s < 3600 {
        format!("{sign}{}m {:02}s", s / 60, s % 60)
    } else if s < 86_400 {
        format!("{sign}{}h {:02}m", s / 3600, (s % 3600) / 60)
    } else {
        format!("{sign}{}d {:02}h", s / 86_400, (s % 86_400) / 3600)
    }
}

/// Returns an emoji icon for a commit verdict.
pub(crate) fn verdict_icon(flagged: bool) -> &'static str {
    if flagged {
        "\u{26a0}\u{fe0f} "
    } else {
        "\u{2705}"
    }
}

fn render_commit(out: &mut String, commit: &CommitReport) {
    let rate = commit
        .additions_per_minute
        .map_or_else(String::new, |r| format!(", {r:.1} add/min"));
    out.push_str(&format!(
        "{} {} {}\n     +{} -{} in {} file(s), {} after parent{rate}\n",
        verdict_icon(commit.verdict.flagged),
        commit.hash,
        commit.message,
        commit.stats.additions,
        commit.stats.deletions,
        commit.stats.files_changed,
        format_duration(commit.time_delta_seconds),
    ));
    for t in &commit.verdict.triggered {
        out.push_str(&format!("     - {}: {}\n", t.name, t.reason));
    }
    if let Some(ai) = &commit.ai_assessment {
        out.push_str(&format!("     \u{1f916} {ai}\n"));
    }
}

/// Human-readable report.
pub(crate) fn render_text(report: &AnalysisReport) -> String {
    let summary = &report.summary;
    let stats = &report.stats;
    let mut out = String::new();

    out.push_str(&format!("\u{1f4c2} Repository: {}\n", report.repository));
    out.push_str(&format!(
        "\u{1f50d} Commits analyzed: {}, flagged: {} ({:.1}%)\n",
        summary.total_commits,
        summary.flagged_commits,
        summary.flagged_ratio * 100.0
    ));
    out.push_str(&format!(
        "\u{1f4ca} +{} -{} across {} file change(s), {:.1} additions/commit, {:.1} additions/min over {}\n",
        stats.total_additions,
        stats.total_deletions,
        stats.total_files_changed,
        stats.average_additions,
        stats.average_additions_per_minute,
        format_duration(stats.time_span_seconds),
    ));

    if !report.commits.is_empty() {
        out.push('\n');
        for commit in &report.commits {
            render_commit(&mut out, commit);
        }
    }

    out.push_str("\nStrategy triggers:\n");
    let width = summary
        .strategies
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(0);
    for s in &summary.strategies {
        out.push_str(&format!("  {:<width$}  {}\n", s.name, s.triggered));
    }

    out
}

/// Human-readable page summary for `cadence fetch`.
pub(crate) fn render_page(page: &PageContent) -> String {
    let mut out = format!("URL: {}\nStatus: {}\n", page.url, page.status_code);
    if !page.title.is_empty() {
        out.push_str(&format!("Title: {}\n", page.title));
    }
    if !page.description.is_empty() {
        out.push_str(&format!("Description: {}\n", page.description));
    }
    out.push('\n');
    out.push_str(page.main_content());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReportSummary;
    use crate::detector::{TriggeredStrategy, Verdict};
    use crate::git::DiffStats;
    use crate::metrics::RepositoryStats;

    #[test]
    fn durations() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(200), "3m 20s");
        assert_eq!(format_duration(7500), "2h 05m");
        assert_eq!(format_duration(90_000), "1d 01h");
        assert_eq!(format_duration(-30), "-30s");
    }

    fn report() -> AnalysisReport {
        let commit = CommitReport {
            hash: "abcdef12".to_string(),
            previous: "12345678".to_string(),
            author: "Dev".to_string(),
            message: "Rework cache".to_string(),
            stats: DiffStats {
                additions: 150,
                deletions: 150,
                files_changed: 3,
            },
            time_delta_seconds: 100,
            additions_per_minute: Some(90.0),
            deletions_per_minute: Some(90.0),
            verdict: Verdict {
                flagged: true,
                triggered: vec![TriggeredStrategy {
                    name: "burst_pattern_analysis".to_string(),
                    reason: "fast".to_string(),
                }],
                score: 1.0 / 7.0,
                total_strategies: 7,
            },
            ai_assessment: Some("Probably scripted.".to_string()),
        };
        let commits = vec![commit];
        let summary = ReportSummary::from_results(&commits, &["burst_pattern_analysis"]);
        AnalysisReport {
            repository: "/tmp/repo".to_string(),
            stats: RepositoryStats::default(),
            commits,
            summary,
        }
    }

    #[test]
    fn text_lists_findings() {
        let text = render_text(&report());
        assert!(text.contains("Commits analyzed: 1, flagged: 1 (100.0%)"));
        assert!(text.contains("abcdef12 Rework cache"));
        assert!(text.contains("+150 -150 in 3 file(s), 1m 40s after parent, 90.0 add/min"));
        assert!(text.contains("- burst_pattern_analysis: fast"));
        assert!(text.contains("Probably scripted."));
        assert!(text.contains("  burst_pattern_analysis  1"));
    }

    #[test]
    fn structured_formats_parse_back() {
        let json = render_report(&report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["flagged_commits"], 1);

        let yaml = render_report(&report(), OutputFormat::Yaml).unwrap();
        let back: AnalysisReport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.commits[0].hash, "abcdef12");
    }
}
