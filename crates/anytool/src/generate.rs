use crate::prelude::{println, *};
use crate::workflow::AppState;
use colored::Colorize;
use std::io::IsTerminal;

#[derive(Debug, clap::Args)]
pub struct GenerateOptions {
    /// Public GitHub repository URL (https://github.com/<owner>/<repo> or git@github.com:<owner>/<repo>.git)
    #[clap(env = "ANYTOOL_REPO_URL")]
    pub repo_url: String,

    /// Change request describing what the diff should do
    pub prompt: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, serde::Serialize)]
struct GenerateOutput<'a> {
    repo_url: &'a str,
    prompt: &'a str,
    diff: &'a str,
}

/// Run the workflow once and print the resulting diff.
pub async fn run(options: GenerateOptions, state: AppState) -> Result<()> {
    let diff = crate::workflow::generate_diff(&state, &options.repo_url, &options.prompt)
        .await
        .map_err(|e| eyre!(e))?;

    if options.json {
        let output = GenerateOutput {
            repo_url: &options.repo_url,
            prompt: &options.prompt,
            diff: &diff,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if std::io::stdout().is_terminal() {
        println!("{}", colorize_diff(&diff));
    } else {
        println!("{diff}");
    }

    Ok(())
}

fn colorize_diff(diff: &str) -> String {
    diff.lines()
        .map(|line| {
            if line.starts_with("diff --git") || line.starts_with("+++") || line.starts_with("---")
            {
                line.bold().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
