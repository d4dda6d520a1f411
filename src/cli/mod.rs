pub mod details;
pub mod generate;
pub mod list;
pub mod presets;
pub mod theme;

use std::io;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::error::{ReceivablesError, Result};

pub(crate) fn parse_date_arg(value: &str) -> Result<NaiveDate> {
    crate::fmt::parse_date(value).ok_or_else(|| ReceivablesError::InvalidDate(value.to_string()))
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[derive(Parser)]
#[command(
    name = "receivables",
    about = "Accounts receivable screen: installment plans, date ranges and receivables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an installment plan.
    Generate {
        /// Total amount, e.g. "10.000,00"
        #[arg(long)]
        amount: String,
        /// Days between installments (prazo)
        #[arg(long, default_value = "30")]
        interval: String,
        /// Number of installments (default 10)
        #[arg(long)]
        count: Option<String>,
        /// First day of the plan, dd/mm/yyyy (default: today)
        #[arg(long)]
        start: Option<String>,
    },
    /// List receivables matching the filters.
    List {
        /// abertas, baixadas, canceladas or todos
        #[arg(long, default_value = "abertas")]
        situation: String,
        /// Date range preset, e.g. "Last 30 Days"
        #[arg(long, conflicts_with_all = ["from", "to"])]
        preset: Option<String>,
        /// Period start, dd/mm/yyyy
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Period end, dd/mm/yyyy
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Filter by issue date instead of due date
        #[arg(long)]
        issued: bool,
        /// Client name or code contains
        #[arg(long)]
        client: Option<String>,
    },
    /// Show the installment schedule of a receivable.
    Details {
        /// Receivable id
        id: String,
    },
    /// List date range presets with their computed ranges.
    Presets,
    /// Show or change the persisted theme.
    Theme {
        /// light, dark or toggle
        value: Option<String>,
    },
    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

pub fn completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "receivables", &mut io::stdout());
    Ok(())
}
