//! Tally - A terminal spreadsheet with a small integer formula engine

mod command;
mod config;
mod error;
#[cfg(feature = "tui")]
mod tui;

use std::env;
use std::path::PathBuf;

use command::Outcome;
use config::Config;
use tally_engine::engine::Sheet;

fn print_usage() {
    eprintln!("Usage: tally [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate one formula and print its value");
    eprintln!("  --tree                    With -c, print the parsed tree instead");
    eprintln!("  --width <N>               With -c, format the value N characters wide");
    eprintln!("  --config <FILE>           Load settings from a TOML file");
    eprintln!("  -h, --help                Print help");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut formula: Option<String> = None;
    let mut tree = false;
    let mut width: Option<usize> = None;
    let mut config_file: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a formula");
                    std::process::exit(1);
                }
                formula = Some(args[i].to_string());
            }
            "--tree" => tree = true,
            "--width" => {
                i += 1;
                match args.get(i).map(|s| s.parse::<usize>()) {
                    Some(Ok(n)) => width = Some(n),
                    _ => {
                        eprintln!("Error: --width requires a number");
                        std::process::exit(1);
                    }
                }
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            arg => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (config, warnings) = Config::load(config_file.as_deref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    if let Some(formula) = formula {
        let mut sheet = match Sheet::new(config.rows, config.cols) {
            Ok(sheet) => sheet,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        let outcome = command::run_formula(&mut sheet, &formula, tree, width);
        match &outcome {
            Outcome::Printed(text) | Outcome::ErrorValue(text) => println!("{}", text),
            Outcome::Invalid(err) => eprintln!("Error: {}", err),
        }
        std::process::exit(outcome.exit_code());
    }

    if tree || width.is_some() {
        eprintln!("Error: --tree and --width require --command");
        std::process::exit(1);
    }

    if let Err(e) = run_interactive(&config) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "tui")]
fn run_interactive(config: &Config) -> anyhow::Result<()> {
    use anyhow::Context;

    let mut app = tui::App::new(config).context("cannot create the sheet")?;
    tui::run(&mut app).context("terminal UI failed")
}

#[cfg(not(feature = "tui"))]
fn run_interactive(_config: &Config) -> anyhow::Result<()> {
    anyhow::bail!("built without the `tui` feature; use --command")
}
