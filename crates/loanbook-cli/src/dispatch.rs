use loanbook_client::commands;
use loanbook_client::commands::decision::DecisionOptions;
use loanbook_client::{ClientResult, SuccessEnvelope};

use crate::cli::{Cli, Commands, InstrumentsCommand, UploadCommand};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Upload { command } => match command {
            UploadCommand::Create {
                dry_run,
                json: _,
                path,
            } => commands::upload::run(path.clone(), *dry_run),
            UploadCommand::List { .. } => commands::upload::list(),
        },
        Commands::Instruments { command } => match command {
            InstrumentsCommand::List {
                asset_class,
                classification_category,
                off_balance_flag,
                errors,
                ..
            } => commands::instruments::list(
                asset_class.clone(),
                classification_category.clone(),
                *off_balance_flag,
                *errors,
            ),
        },
        Commands::Decision {
            default_flag,
            dpd,
            sicr,
            sppi,
            business_model,
            ..
        } => commands::decision::run_with_options(DecisionOptions {
            default_flag: *default_flag,
            days_past_due: dpd.clone(),
            sicr_flag: *sicr,
            sppi_passed: *sppi,
            business_model: business_model.clone(),
        }),
    }
}
