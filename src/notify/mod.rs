pub mod sink;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Outcome of one job run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    Failure,
}

/// The run log that gets notified at the end of every job: each reconciling
/// step appends a line, and the failure path appends the error chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub job: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcome: RunOutcome,
    pub lines: Vec<String>,
    pub error: Option<String>,
}

impl RunReport {
    pub fn start(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            started_at: Utc::now(),
            finished_at: None,
            outcome: RunOutcome::Failure,
            lines: Vec::new(),
            error: None,
        }
    }

    /// Log a step and keep it for the notification body.
    pub fn note(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{line}");
        self.lines.push(line);
    }

    pub fn succeed(&mut self) {
        self.outcome = RunOutcome::Success;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error: &anyhow::Error) {
        self.outcome = RunOutcome::Failure;
        self.error = Some(format!("{error:#}"));
        self.finished_at = Some(Utc::now());
    }

    pub fn subject(&self) -> String {
        match self.outcome {
            RunOutcome::Success => format!("{} - Success", self.job),
            RunOutcome::Failure => format!("{} - Error", self.job),
        }
    }

    pub fn body(&self) -> String {
        let mut body = match self.outcome {
            RunOutcome::Success => format!("{} was successful:\n", self.job),
            RunOutcome::Failure => format!("{} encountered an error:\n", self.job),
        };
        for line in &self.lines {
            body.push_str(line);
            body.push('\n');
        }
        if let Some(error) = &self.error {
            body.push_str(error);
            body.push('\n');
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_body_carries_the_log_and_the_error() {
        let mut report = RunReport::start("onboarding refresh");
        report.note("Found 3 records to add or update");
        report.fail(&anyhow::anyhow!("duplicate keys in tracker: 1001"));

        assert_eq!(report.subject(), "onboarding refresh - Error");
        let body = report.body();
        assert!(body.contains("encountered an error"));
        assert!(body.contains("Found 3 records to add or update"));
        assert!(body.contains("duplicate keys in tracker: 1001"));
    }

    #[test]
    fn success_subject_and_body() {
        let mut report = RunReport::start("sla refresh");
        report.note("Inserted 120 rows");
        report.succeed();
        assert_eq!(report.subject(), "sla refresh - Success");
        assert!(report.body().starts_with("sla refresh was successful:"));
    }
}
