mod cli;
mod date_range;
mod error;
mod filters;
mod fmt;
mod forms;
mod hover;
mod installments;
mod logging;
mod models;
mod screen;
mod settings;
mod theme;
mod timer;
mod tui;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init();

    let result = match cli.command {
        None => screen::run(theme::ThemeContext::load(settings::settings_path())),
        Some(Commands::Generate {
            amount,
            interval,
            count,
            start,
        }) => cli::generate::run(&amount, &interval, count.as_deref(), start.as_deref()),
        Some(Commands::List {
            situation,
            preset,
            from,
            to,
            issued,
            client,
        }) => cli::list::run(cli::list::ListArgs {
            situation: &situation,
            preset: preset.as_deref(),
            from: from.as_deref(),
            to: to.as_deref(),
            issued,
            client: client.as_deref(),
        }),
        Some(Commands::Details { id }) => cli::details::run(&id),
        Some(Commands::Presets) => cli::presets::run(),
        Some(Commands::Theme { value }) => cli::theme::run(value.as_deref()),
        Some(Commands::Completions { shell }) => cli::completions(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
