use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use genchat_cli::app;
use genchat_core::{Mode, Settings};

#[derive(Parser)]
#[command(name = "genchat")]
#[command(about = "GenChat - chat and image generation in the terminal")]
#[command(version)]
struct Cli {
    /// Run a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Generation mode (chat, image)
    #[arg(long)]
    mode: Option<Mode>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Prompt template for chat mode (e.g. "Code Assistant")
    #[arg(short, long)]
    template: Option<String>,

    /// Folder for generated images and their history file
    #[arg(long)]
    image_folder: Option<PathBuf>,

    /// Send the selected prompt template with each chat request
    #[arg(long)]
    inject_template: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("no .env loaded: {e}");
    }

    let cli = Cli::parse();

    let mut settings = Settings::load();

    if let Some(mode) = cli.mode {
        settings.session.default_mode = mode;
    }
    if let Some(ref model) = cli.model {
        settings.session.default_model = Some(model.clone());
    }
    if let Some(ref template) = cli.template {
        settings.session.default_template = Some(template.clone());
    }
    if let Some(ref folder) = cli.image_folder {
        settings.session.image_folder = folder.clone();
    }
    if cli.inject_template {
        settings.chat.inject_prompt_template = true;
    }

    let mut controller = app::build_controller(&settings)?;
    let mut stdout = std::io::stdout();

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&mut controller, &prompt, &mut stdout).await?;
    } else {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        app::run_chat(&mut controller, stdin, &mut stdout).await?;
    }

    Ok(())
}
