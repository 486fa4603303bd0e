//! `ats`: run and manage ATS analyses against a running Resume ATS API.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use resume_ats::analysis::handlers::AnalysisView;
use resume_ats::analysis::markup::strip_tags;
use resume_ats::client::api::{AnalyzeCall, ApiClient};
use resume_ats::client::recovery::{analyze_with_recovery, CredentialPrompt, RecoveryOutcome};

#[derive(Parser)]
#[command(name = "ats")]
#[command(author, version, about = "ATS resume analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the API server
    #[arg(long, env = "ATS_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    /// Owner of the resumes
    #[arg(long, env = "ATS_USER_ID")]
    user_id: Uuid,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a resume, optionally against a job description
    Analyze {
        resume_id: Uuid,
        /// File holding the job description text
        #[arg(short, long)]
        job_description_file: Option<PathBuf>,
        /// Generation API key sent with the request
        #[arg(long, env = "GENERATION_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        /// Echo the key while typing it into the recovery prompt
        #[arg(long)]
        show_key: bool,
    },

    /// List the stored analyses of a resume, newest first
    History { resume_id: Uuid },

    /// Delete one stored analysis
    Delete { resume_id: Uuid, analysis_id: Uuid },
}

/// Terminal version of the credential modal.
struct DialoguerPrompt {
    theme: ColorfulTheme,
    show_key: bool,
}

impl CredentialPrompt for DialoguerPrompt {
    fn request_credential(&mut self, reason: &str) -> Option<String> {
        eprintln!("\n⚠️  {reason}");
        let retry = Confirm::with_theme(&self.theme)
            .with_prompt("Enter a new API key and retry?")
            .default(true)
            .interact()
            .ok()?;
        if !retry {
            return None;
        }

        let key = if self.show_key {
            Input::<String>::with_theme(&self.theme)
                .with_prompt("API key")
                .allow_empty(true)
                .interact_text()
        } else {
            Password::with_theme(&self.theme)
                .with_prompt("API key")
                .allow_empty_password(true)
                .interact()
        };
        key.ok()
    }

    fn acknowledge_unavailable(&mut self, reason: &str) {
        eprintln!("\n⛔ {reason}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.api_url, cli.user_id);

    match cli.command {
        Commands::Analyze {
            resume_id,
            job_description_file,
            api_key,
            show_key,
        } => {
            let job_description = match job_description_file {
                Some(path) => Some(
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };

            let call = AnalyzeCall {
                client: &client,
                resume_id,
                job_description: job_description.as_deref(),
            };
            let mut prompt = DialoguerPrompt {
                theme: ColorfulTheme::default(),
                show_key,
            };

            let (outcome, _) = analyze_with_recovery(&call, &mut prompt, api_key).await;
            match outcome {
                RecoveryOutcome::Completed(view) => print_analysis(&view),
                RecoveryOutcome::Abandoned => eprintln!("Analysis cancelled."),
                RecoveryOutcome::Failed(failure) => {
                    anyhow::bail!("Analysis failed: {}", failure.message)
                }
            }
        }
        Commands::History { resume_id } => {
            let views = client.list(resume_id).await?;
            if views.is_empty() {
                println!("No analyses stored for {resume_id}.");
            }
            for view in views {
                println!(
                    "{}  {}  {:<30}  {}",
                    view.row.id,
                    view.row.created_at.format("%Y-%m-%d %H:%M"),
                    view.row.job_title,
                    score_label(view.score)
                );
            }
        }
        Commands::Delete {
            resume_id,
            analysis_id,
        } => {
            client.delete(resume_id, analysis_id).await?;
            println!("Deleted {analysis_id}.");
        }
    }

    Ok(())
}

fn print_analysis(view: &AnalysisView) {
    println!("{} ({})", view.row.job_title, score_label(view.score));
    println!("{}", "─".repeat(48));
    let text = view
        .sanitized_html
        .replace("<li>", "<li>  • ")
        .replace("</h3>", "</h3>\n")
        .replace("</p>", "</p>\n")
        .replace("</li>", "</li>\n");
    println!("{}", strip_tags(&text).trim_end());
    println!("\nSaved as {}", view.row.id);
}

fn score_label(score: Option<u8>) -> String {
    score.map_or_else(|| "no score".to_string(), |s| format!("{s}/100"))
}
