use clap::{Parser, Subcommand};

pub fn parse_bool_filter(value: &str) -> Result<bool, String> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("filter value must be `true` or `false`".to_string()),
    }
}

/// Extended help shown after `loanbook upload create --help`.
/// Contains workflow guidance, the column schema, and next-step instructions.
pub const UPLOAD_CREATE_AFTER_HELP: &str = "\
How upload works:
  Loanbook ingests one instrument book per call, as CSV or XLSX.
  Every row is validated against the IFRS 9 upload schema; rows that fail
  keep their raw payload and a full error list, rows that pass are also
  stored as typed instruments with their staging/classification decision.

  Accepted formats:
    CSV  — UTF-8 (optional BOM), one header row with schema column names
    XLSX — first worksheet only, header row first

  Column headers are matched after trimming and lower-casing.

What to do next:
  1. Run `loanbook upload create --dry-run <path>` and fix reported rows.
  2. Run `loanbook upload create <path>` once the dry run is clean.
  3. Inspect persisted rows with `loanbook instruments list`.

Required columns:
  instrument_id, borrower_id, asset_class, classification_category,
  measurement_basis, off_balance_flag, pd_12m, pd_lifetime, lgd, ead,
  sicr_flag, eir, collateral_flag, drawdown_date, maturity_date

  Booleans accept true/1/yes and false/0/no (case-insensitive).
  pd_12m and pd_lifetime must lie in [0,1].
  Dates are ISO `YYYY-MM-DD`; maturity_date must be after drawdown_date.

Conditionally required (when collateral_flag is true):
  collateral_type, collateral_value, appraisal_date

Optional decision columns (never block validation):
  default_flag, days_past_due, sppi_flag, business_model
  These feed the stored IFRS 9 staging/classification trace. A missing or
  unreadable days_past_due is treated as 0 and noted in the trace.

Duplicate rules:
  A repeated instrument_id inside one file reports `Duplicate instrument_id`
  on every occurrence after the first. An instrument_id already present in
  the ledger reports `instrument_id already exists`.
";

#[derive(Debug, Parser)]
#[command(
    name = "loanbook",
    version,
    about = "IFRS 9 instrument ledger",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest and review instrument uploads
    #[command(arg_required_else_help = true)]
    Upload {
        #[command(subcommand)]
        command: UploadCommand,
    },
    /// Query persisted instrument rows
    #[command(arg_required_else_help = true)]
    Instruments {
        #[command(subcommand)]
        command: InstrumentsCommand,
    },
    /// Evaluate the IFRS 9 staging and classification rules for one instrument
    Decision {
        /// Instrument is in default (stage 3 trigger)
        #[arg(long)]
        default_flag: bool,
        /// Days past due (raw value; non-numeric input is noted and treated as 0)
        #[arg(long, value_name = "DAYS")]
        dpd: Option<String>,
        /// Significant increase in credit risk observed
        #[arg(long)]
        sicr: bool,
        /// Cash flows are solely payments of principal and interest
        #[arg(long)]
        sppi: bool,
        /// Business model, e.g. "Hold to collect"
        #[arg(long, value_name = "MODEL")]
        business_model: Option<String>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum UploadCommand {
    /// Validate and ingest an instrument book into the local ledger
    #[command(after_long_help = UPLOAD_CREATE_AFTER_HELP)]
    Create {
        /// Validate the upload without writing to the ledger
        #[arg(long)]
        dry_run: bool,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
        /// Path to a CSV or XLSX instrument book
        path: String,
    },
    /// List past uploads with their checksums and row counts
    List {
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum InstrumentsCommand {
    /// List persisted instrument rows, optionally filtered
    List {
        /// Filter by asset class (exact match)
        #[arg(long, value_name = "CLASS")]
        asset_class: Option<String>,
        /// Filter by classification category (exact match)
        #[arg(long, value_name = "CATEGORY")]
        classification_category: Option<String>,
        /// Filter by off-balance flag
        #[arg(long, value_name = "BOOL", value_parser = parse_bool_filter)]
        off_balance_flag: Option<bool>,
        /// Keep only rows with (true) or without (false) validation errors
        #[arg(long, value_name = "BOOL", value_parser = parse_bool_filter)]
        errors: Option<bool>,
        /// Emit machine-readable JSON output
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::{Commands, InstrumentsCommand, UploadCommand, parse_from};

    #[test]
    fn parse_command_paths() {
        let cases: [Vec<&str>; 12] = [
            vec!["loanbook", "upload", "create", "./book.csv"],
            vec!["loanbook", "upload", "create", "--dry-run", "./book.csv"],
            vec!["loanbook", "upload", "create", "./book.xlsx", "--json"],
            vec!["loanbook", "upload", "list"],
            vec!["loanbook", "upload", "list", "--json"],
            vec!["loanbook", "instruments", "list"],
            vec!["loanbook", "instruments", "list", "--asset-class", "Corporate"],
            vec![
                "loanbook",
                "instruments",
                "list",
                "--off-balance-flag",
                "true",
                "--errors",
                "false",
            ],
            vec!["loanbook", "instruments", "list", "--json"],
            vec!["loanbook", "decision", "--sicr", "--dpd", "45"],
            vec![
                "loanbook",
                "decision",
                "--sppi",
                "--business-model",
                "Hold to collect",
            ],
            vec!["loanbook", "decision", "--default-flag", "--json"],
        ];

        for case in cases {
            let parsed = parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse: {case:?}");
        }
    }

    #[test]
    fn upload_create_requires_a_path() {
        let parsed = parse_from(["loanbook", "upload", "create"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parse_upload_create_flags() {
        let parsed = parse_from([
            "loanbook",
            "upload",
            "create",
            "--dry-run",
            "book.csv",
            "--json",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Upload {
                    command: UploadCommand::Create {
                        dry_run: true,
                        json: true,
                        ..
                    },
                }
            ));
        }
    }

    #[test]
    fn parse_instruments_filters() {
        let parsed = parse_from([
            "loanbook",
            "instruments",
            "list",
            "--asset-class",
            "Retail",
            "--errors",
            "true",
        ]);
        assert!(parsed.is_ok());
        if let Ok(cli) = parsed {
            assert!(matches!(
                cli.command,
                Commands::Instruments {
                    command: InstrumentsCommand::List {
                        errors: Some(true),
                        ..
                    },
                }
            ));
        }
    }

    #[test]
    fn invalid_bool_filter_is_rejected() {
        let parsed = parse_from([
            "loanbook",
            "instruments",
            "list",
            "--off-balance-flag",
            "yes",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn bare_upload_shows_help() {
        let parsed = parse_from(["loanbook", "upload"]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(
                err.kind(),
                ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            );
        }
    }

    #[test]
    fn help_command_is_rejected() {
        let parsed = parse_from(["loanbook", "help"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn upload_create_help_uses_clap_display_help() {
        let parsed = parse_from(["loanbook", "upload", "create", "--help"]);
        assert!(parsed.is_err());
        if let Err(err) = parsed {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
