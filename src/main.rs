use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use colored::Colorize;
use std::io;
use std::process;
use treemark::cli::{Cli, Commands};
use treemark::commands::{self, Outcome, check, compare, init, status, update};
use treemark::output::{self, Verbosity};
use treemark::{TreemarkContext, logging};

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(commands::exit::ERROR);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    output::set_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));
    logging::init(cli.verbose).map_err(|e| anyhow::anyhow!("Invalid log filter: {e}"))?;

    let code = match cli.command {
        Commands::Completion { shell } => {
            print_completions(shell, &mut Cli::command());
            commands::exit::SUCCESS
        }
        Commands::Compare { dir1, dir2 } => compare::execute(&dir1, &dir2)?.exit_code(),
        Commands::Status { directory } => status::execute(&directory)?.exit_code(),
        Commands::Init {
            identity,
            directory,
            yes,
        } => {
            let ctx = TreemarkContext::new()?;
            init::execute(&ctx, &directory, &identity, &init::InitOptions { yes })?.exit_code()
        }
        Commands::Check { directory } => {
            let ctx = TreemarkContext::new()?;
            check::execute(&ctx, &directory)?.exit_code()
        }
        Commands::Update {
            directory,
            if_changed,
        } => {
            let ctx = TreemarkContext::new()?;
            update::execute(&ctx, &directory, &update::UpdateOptions { if_changed })?.exit_code()
        }
    };

    Ok(code)
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
