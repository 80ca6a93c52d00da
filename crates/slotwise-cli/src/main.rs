use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "slotwise-cli", version, about = "Slotwise CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute placements for tasks in a snapshot
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Inspect tasks in a snapshot
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Resolve availability windows
    Windows {
        #[command(subcommand)]
        action: commands::windows::WindowsAction,
    },
    /// Manage dependency edges
    Deps {
        #[command(subcommand)]
        action: commands::deps::DepsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Windows { action } => commands::windows::run(action),
        Commands::Deps { action } => commands::deps::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "slotwise-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
