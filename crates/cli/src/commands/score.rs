//! Offline scoring: run the deterministic rules against a lead JSON file.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use leadflow_core::config::{AppConfig, LoadOptions};
use leadflow_core::domain::lead::Lead;
use leadflow_core::routing::workflow_for;
use leadflow_core::scoring::{rules, LeadScore};

use crate::commands::CommandResult;

#[derive(Debug, Serialize)]
struct ScoreReport {
    lead_id: String,
    score: LeadScore,
    quality: String,
    workflow: String,
}

pub fn run(path: &Path, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "score",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "score",
                "input_file",
                format!("could not read `{}`: {error}", path.display()),
                3,
            );
        }
    };

    let data: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(error) => {
            return CommandResult::failure(
                "score",
                "input_parse",
                format!("`{}` is not valid JSON: {error}", path.display()),
                3,
            );
        }
    };

    let lead = match Lead::from_event_data(&data, Utc::now()) {
        Ok(lead) => lead,
        Err(error) => {
            return CommandResult::failure("score", "input_validation", error.to_string(), 3);
        }
    };

    let score = rules::score(&lead);
    let thresholds = config.scoring.thresholds();
    let quality = score.quality_with(&thresholds);
    let report = ScoreReport {
        lead_id: lead.id.0.clone(),
        score,
        quality: quality.as_str().to_string(),
        workflow: workflow_for(quality).as_str().to_string(),
    };

    if json_output {
        let output = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"error\":\"{error}\"}}"));
        return CommandResult { exit_code: 0, output };
    }

    CommandResult { exit_code: 0, output: render_human(&report) }
}

fn render_human(report: &ScoreReport) -> String {
    let score = &report.score;
    [
        format!("lead {} scored {}/100 ({})", report.lead_id, score.total, report.quality),
        format!("- interest_level:      {:>2}/20", score.interest_level),
        format!("- budget_clarity:      {:>2}/20", score.budget_clarity),
        format!("- urgency:             {:>2}/15", score.urgency),
        format!("- problem_clarity:     {:>2}/20", score.problem_clarity),
        format!("- decision_authority:  {:>2}/15", score.decision_authority),
        format!("- tech_readiness:      {:>2}/10", score.tech_readiness),
        format!("workflow: {}", report.workflow),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::run;

    #[test]
    fn scores_a_lead_file_with_the_rule_based_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "id": "lead-cli-1",
                "name": "Ada",
                "role": "CTO",
                "budget_range": "$50k",
                "urgency": "asap",
                "interest_level": 10,
                "problem_text": "{}",
                "tools_used": ["Slack", "Zapier", "Notion"]
            }}"#,
            "x".repeat(120)
        )
        .expect("write lead json");

        let result = run(file.path(), true);

        assert_eq!(result.exit_code, 0);
        let report: serde_json::Value =
            serde_json::from_str(&result.output).expect("json output");
        assert_eq!(report["score"]["total"], 92);
        assert_eq!(report["quality"], "high");
        assert_eq!(report["workflow"], "qualified_lead_workflow");
    }

    #[test]
    fn missing_file_fails_with_input_error() {
        let result = run(std::path::Path::new("/nonexistent/lead.json"), false);
        assert_ne!(result.exit_code, 0);
        assert!(result.output.contains("input_file"));
    }

    #[test]
    fn lead_without_id_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"name": "No Id"}}"#).expect("write lead json");

        let result = run(file.path(), false);
        assert_ne!(result.exit_code, 0);
        assert!(result.output.contains("input_validation"));
    }
}
