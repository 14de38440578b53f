//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use tourbook_domain::{Candidate, FieldValue, ImportJob, JobStatus};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format one job with its candidates and error trail.
    pub fn format_job(&self, job: &ImportJob) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(job)?),
            OutputFormat::Table => Ok(self.format_job_table(job)),
        }
    }

    /// Format a job listing.
    pub fn format_jobs(&self, jobs: &[ImportJob]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(jobs)?),
            OutputFormat::Table => Ok(self.format_jobs_table(jobs)),
        }
    }

    fn format_job_table(&self, job: &ImportJob) -> String {
        let mut out = vec![
            format!("Job:        {}", job.id),
            format!("Org:        {}", job.org_id),
            format!("Status:     {}", self.status(job.status)),
            format!("Mode:       {}", job.extraction_mode),
            format!("Attempt:    {}", job.attempt),
            format!("Confidence: {:.2}", job.confidence),
        ];

        if let Some(metadata) = &job.source_file_metadata {
            out.push(format!(
                "Source:     {} ({} bytes)",
                metadata.file_name, metadata.size_bytes
            ));
        }
        if let Some(extraction) = &job.extraction {
            let format = extraction.format.map(|f| f.to_string());
            out.push(format!(
                "Extraction: {} words, {} pages, format {}",
                optional(extraction.word_count),
                optional(extraction.page_count),
                format.as_deref().unwrap_or("-")
            ));
            if extraction.is_low_text {
                out.push(self.warning("Low-text document, review the candidates carefully"));
            }
        }

        out.push(String::new());
        out.push(self.candidates_table(&job.candidates));

        if !job.errors.is_empty() {
            out.push(String::new());
            out.push(self.colorize("Errors:", "red"));
            for error in &job.errors {
                out.push(format!("  {}", error));
            }
        }

        out.join("\n")
    }

    fn candidates_table(&self, candidates: &[Candidate]) -> String {
        if candidates.is_empty() {
            return self.colorize("No candidates.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "#", "Date", "Title", "Venue", "City", "Fee", "Confidence", "Duplicates",
        ]);

        for (i, candidate) in candidates.iter().enumerate() {
            let fee = match (candidate.deal.fee.as_str(), candidate.deal.currency.as_str()) {
                (Some(fee), Some(currency)) => format!("{} {}", fee, currency),
                (Some(fee), None) => fee.to_string(),
                _ => "-".to_string(),
            };
            let duplicates = candidate
                .duplicates
                .iter()
                .map(|d| format!("{} ({:.2})", d.existing_record_id, d.score))
                .collect::<Vec<_>>()
                .join(", ");

            builder.push_record([
                (i + 1).to_string(),
                text(&candidate.core.date),
                text(candidate.display_title()),
                text(&candidate.venue.name),
                text(&candidate.venue.city),
                fee,
                format!("{:.2}", candidate.confidence),
                if duplicates.is_empty() {
                    "-".to_string()
                } else {
                    duplicates
                },
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    fn format_jobs_table(&self, jobs: &[ImportJob]) -> String {
        if jobs.is_empty() {
            return self.colorize("No jobs found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Status", "Mode", "Candidates", "Confidence", "Created"]);

        for job in jobs {
            let id = job.id.to_string();
            builder.push_record([
                id[..8].to_string(),
                job.status.to_string(),
                job.extraction_mode.to_string(),
                job.candidates.len().to_string(),
                format!("{:.2}", job.confidence),
                job.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// One-line outcome of a run, retry or improve.
    pub fn job_outcome(&self, job: &ImportJob) -> String {
        let summary = format!(
            "Job {} is {} ({} candidate(s), confidence {:.2})",
            job.id,
            job.status,
            job.candidates.len(),
            job.confidence
        );
        match job.status {
            JobStatus::Completed => self.success(&summary),
            JobStatus::Failed => self.error(&summary),
            _ => self.warning(&summary),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn status(&self, status: JobStatus) -> String {
        let color = match status {
            JobStatus::Completed => "green",
            JobStatus::Failed => "red",
            JobStatus::NeedsReview => "yellow",
            _ => "cyan",
        };
        self.colorize(status.as_str(), color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn text(field: &FieldValue<String>) -> String {
    field.as_str().unwrap_or("-").to_string()
}

fn optional(value: Option<usize>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}
