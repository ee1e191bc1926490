use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod browse;
mod search;

#[derive(Parser)]
#[command(name = "curio")]
#[command(about = "Browse and search an art collection API", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively browse the collection
    #[command(alias = "b")]
    Browse(browse::BrowseArgs),

    /// One-shot search, printed to stdout
    #[command(alias = "s")]
    Search(search::SearchArgs),
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

    // Default level depends on --debug; RUST_LOG still wins.
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Browse(args) => browse::execute(args),
        Commands::Search(args) => search::execute(args),
    }
}
