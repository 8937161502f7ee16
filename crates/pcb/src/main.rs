use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod panel;
mod vars;

#[derive(Parser)]
#[command(name = "pcb")]
#[command(about = "Tools for KiCad board files: panel splitting and text variables", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a panel into one board file per outline
    #[command(alias = "p")]
    Panel(panel::PanelArgs),

    /// Expand ${VAR} references in board text
    #[command(alias = "v")]
    Vars(vars::VarsArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG wins when set
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Panel(args) => panel::execute(args),
        Commands::Vars(args) => vars::execute(args),
    }
}
