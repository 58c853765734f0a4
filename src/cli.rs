//! Command line driver.
//!
//! Runs one form session headlessly through the same controller handlers a
//! view would call, then prints the resulting view as JSON.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use sp_app::PreferenceFormController;
use sp_core::preference::TextField;
use sp_core::{FormView, LearningLevel, SessionContext, Stage, SubmitStatus};
use sp_infra::ApiBackend;

use crate::bootstrap::{build_controller, default_config, load_config, resolve_backend};

#[derive(Debug, Parser)]
#[command(name = "subprefs")]
#[command(about = "Newsletter subscription preferences", long_about = None)]
pub struct Cli {
    /// TOML config file; built-in defaults when omitted
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Preferences backend (mock or http), overrides the config file
    #[arg(long, global = true)]
    pub backend: Option<ApiBackend>,

    /// Act as this authenticated user instead of an anonymous visitor
    #[arg(long, global = true, value_name = "EMAIL")]
    pub logged_in_as: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the newsletters on offer
    Newsletters,
    /// Run the selection flow once and print the final view
    Submit(SubmitArgs),
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub confirm_email: Option<String>,

    /// Newsletter key to subscribe to; repeat for several. Replaces the
    /// current selection when given.
    #[arg(long = "newsletter", value_name = "KEY")]
    pub newsletters: Vec<String>,

    /// Opt out of marketing emails
    #[arg(long)]
    pub opt_out: bool,

    /// Learning level (1-5) to store after the selection is accepted
    #[arg(long, value_parser = parse_learning_level, conflicts_with = "skip_learning_level")]
    pub learning_level: Option<LearningLevel>,

    /// Finish without storing a learning level
    #[arg(long)]
    pub skip_learning_level: bool,
}

fn parse_learning_level(value: &str) -> Result<LearningLevel, String> {
    let level: i64 = value
        .parse()
        .map_err(|_| format!("not a number: {value}"))?;
    LearningLevel::new(level).map_err(|err| err.to_string())
}

/// Runs the parsed command and returns what should be printed.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config(),
    };
    let backend = resolve_backend(&config, cli.backend)?;
    let session = match cli.logged_in_as {
        Some(email) => SessionContext::authenticated(email),
        None => SessionContext::anonymous(),
    };
    let controller = build_controller(&config, backend, session)?;

    match cli.command {
        Commands::Newsletters => {
            let view = controller.mount().await?;
            serde_json::to_string_pretty(&view.newsletters).context("Failed to encode newsletters")
        }
        Commands::Submit(args) => {
            let view = run_submit(&controller, args).await?;
            controller.dispose();
            let output =
                serde_json::to_string_pretty(&view).context("Failed to encode form view")?;
            if view.form_status.status == SubmitStatus::Error {
                println!("{output}");
                bail!(failure_summary(&view));
            }
            Ok(output)
        }
    }
}

async fn run_submit(
    controller: &PreferenceFormController,
    args: SubmitArgs,
) -> anyhow::Result<FormView> {
    let mounted = controller.mount().await?;

    let fields = [
        (TextField::FirstName, args.first_name),
        (TextField::LastName, args.last_name),
        (TextField::Email, args.email),
        (TextField::ConfirmEmail, args.confirm_email),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            controller.on_field_change(field, value).await?;
        }
    }

    if !args.newsletters.is_empty() || args.opt_out {
        let wanted: BTreeSet<&str> = args.newsletters.iter().map(String::as_str).collect();
        let current = &mounted.form_data.selected_newsletters;
        let mut toggles: Vec<String> = current
            .selected_keys()
            .filter(|key| !wanted.contains(key.as_str()))
            .map(|key| key.to_string())
            .collect();
        let mut seen = BTreeSet::new();
        toggles.extend(
            args.newsletters
                .iter()
                .filter(|key| seen.insert(key.as_str()) && !current.is_selected(key))
                .cloned(),
        );
        for key in toggles {
            controller.on_toggle_newsletter(key).await?;
        }
    }
    if args.opt_out {
        controller.on_set_wants_marketing(false).await?;
    }

    let view = controller.on_submit().await?;
    if view.form_status.current_stage != Stage::Confirmation {
        return Ok(view);
    }
    info!(labels = %controller.selected_labels().await, "selection accepted");

    if let Some(level) = args.learning_level {
        controller.on_select_learning_level(Some(level)).await?;
        Ok(controller.on_save_learning_level().await?)
    } else if args.skip_learning_level {
        Ok(controller.on_skip_learning_level().await?)
    } else {
        Ok(view)
    }
}

fn failure_summary(view: &FormView) -> String {
    if let Some(message) = &view.form_status.error_message {
        return message.clone();
    }
    let errors: Vec<&str> = view
        .validation_state
        .field_errors
        .iter()
        .map(|(_, message)| message)
        .collect();
    if errors.is_empty() {
        "submission failed".to_string()
    } else {
        errors.join(" ")
    }
}
