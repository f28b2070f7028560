use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use genchat_core::{Session, SessionController, Settings};

use crate::commands::{handle_command, CommandResult};
use crate::render::{option_list, render_message, status_text, template_list};

enum Flow {
    Continue,
    Quit,
}

/// Build a controller for the OpenAI backend described by `settings`.
pub fn build_controller(settings: &Settings) -> Result<SessionController> {
    let client = settings.build_generation_client()?;
    let session = Session::from_settings(&settings.session);
    Ok(SessionController::new(session, client))
}

/// Run one exchange and print the reply. Errors end the process.
pub async fn run_single_prompt<W: Write>(
    controller: &mut SessionController,
    prompt: &str,
    out: &mut W,
) -> Result<()> {
    let reply = controller.record_exchange(prompt).await?;
    if let Some(line) = render_message(&reply) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Interactive loop: load persisted images, then read prompts and slash
/// commands line by line until `/quit` or end of input.
pub async fn run_chat<R, W>(
    controller: &mut SessionController,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    controller.load_persisted_image_history()?;

    print_history(controller, out)?;
    writeln!(out, "{}", status_text(controller.session()))?;
    writeln!(out, "Start chat ... (type /help for commands)")?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match handle_command(line) {
            CommandResult::NotACommand => {
                match controller.record_exchange(line).await {
                    Ok(reply) => {
                        if let Some(rendered) = render_message(&reply) {
                            writeln!(out, "{rendered}")?;
                        }
                    }
                    Err(e) => {
                        tracing::error!("exchange failed: {e}");
                        writeln!(out, "error: {e}")?;
                    }
                }
            }
            result => {
                if let Flow::Quit = apply_command(controller, result, out)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn apply_command<W: Write>(
    controller: &mut SessionController,
    result: CommandResult,
    out: &mut W,
) -> Result<Flow> {
    match result {
        CommandResult::Quit => return Ok(Flow::Quit),
        CommandResult::Message(text) => writeln!(out, "{text}")?,
        CommandResult::Clear => {
            controller.clear_history();
            writeln!(out, "History cleared.")?;
        }
        CommandResult::ModeChanged(mode) => {
            controller.select_mode(mode);
            writeln!(out, "{}", status_text(controller.session()))?;
        }
        CommandResult::ModelChanged(model) => {
            if !controller.offered_models().contains(&model.as_str()) {
                writeln!(
                    out,
                    "note: \"{}\" is not one of the {} models",
                    model,
                    controller.session().mode
                )?;
            }
            controller.select_model(model);
            writeln!(out, "{}", status_text(controller.session()))?;
        }
        CommandResult::TemplateChanged(template) => {
            if !controller.session().mode.uses_prompt_templates() {
                writeln!(out, "note: prompt templates only apply in Chatting mode")?;
            }
            controller.select_prompt_template(template);
            writeln!(out, "{}", status_text(controller.session()))?;
        }
        CommandResult::ListModels => {
            let session = controller.session();
            writeln!(
                out,
                "{}",
                option_list(controller.offered_models(), Some(session.model.as_str()))
            )?;
        }
        CommandResult::ListTemplates => {
            let selected = controller.session().prompt_template.as_deref();
            writeln!(out, "{}", template_list(selected))?;
        }
        CommandResult::ShowStatus => writeln!(out, "{}", status_text(controller.session()))?,
        CommandResult::ShowHistory => print_history(controller, out)?,
        CommandResult::NotACommand => {}
    }
    Ok(Flow::Continue)
}

fn print_history<W: Write>(controller: &SessionController, out: &mut W) -> Result<()> {
    for message in controller.history().iter() {
        if let Some(line) = render_message(message) {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}
