mod decision_text;
mod error_text;
mod format;
mod instruments_text;
mod json;
mod mode;
mod upload_text;

use std::io;

use loanbook_client::{ClientError, SuccessEnvelope};

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    println!("{body}");
    Ok(())
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    println!("{body}");
    Ok(())
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "upload" => upload_text::render_upload_run(&success.data),
        "upload list" => upload_text::render_upload_list(&success.data),
        "instruments list" => instruments_text::render_instruments_list(&success.data),
        "decision" => decision_text::render_decision(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
