use crate::cli::{Commands, InstrumentsCommand, UploadCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Upload { command } => match command {
            UploadCommand::Create { json, .. } | UploadCommand::List { json } => *json,
        },
        Commands::Instruments { command } => match command {
            InstrumentsCommand::List { json, .. } => *json,
        },
        Commands::Decision { json, .. } => *json,
    };

    if json { OutputMode::Json } else { OutputMode::Text }
}

#[cfg(test)]
mod tests {
    use super::{OutputMode, mode_for_command};
    use crate::cli::parse_from;

    #[test]
    fn json_flag_selects_json_mode_per_command() {
        let cases: [(&[&str], OutputMode); 5] = [
            (
                &["loanbook", "upload", "create", "book.csv", "--json"],
                OutputMode::Json,
            ),
            (&["loanbook", "upload", "list", "--json"], OutputMode::Json),
            (
                &["loanbook", "instruments", "list", "--json"],
                OutputMode::Json,
            ),
            (&["loanbook", "decision", "--json"], OutputMode::Json),
            (
                &["loanbook", "upload", "create", "book.csv"],
                OutputMode::Text,
            ),
        ];

        for (args, expected) in cases {
            let parsed = parse_from(args);
            assert!(parsed.is_ok(), "failed to parse {args:?}");
            if let Ok(cli) = parsed {
                assert_eq!(mode_for_command(&cli.command), expected);
            }
        }
    }
}
