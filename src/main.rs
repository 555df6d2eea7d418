mod classify;
mod cli;
mod config;
mod dataset;
mod download;
mod merge;
mod parquet;
mod pipeline;
mod record;
mod store;
mod window;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};
use pipeline::RunReport;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Aggregate(args) => match command::aggregate(args) {
            Ok(report) => print_report(&report),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        },
        Commands::Poll(args) => match command::poll(args).await {
            Ok(paths) => println!("{} records saved to `{}`", paths.len(), args.records.display()),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("Datasets for {}:", report.window);

    for pair in &report.pairs {
        let produced: Vec<&str> = pair.produced.iter().map(|s| s.as_str()).collect();
        let produced = if produced.is_empty() {
            "none".to_string()
        } else {
            produced.join(", ")
        };
        println!("  {}/{}: {}", pair.location, pair.sublocation, produced);
        for source in &pair.missing {
            println!("    {}: no data", source);
        }
        for source in &pair.failed {
            println!("    {}: not saved, see log", source);
        }
    }

    for dataset in &report.datasets {
        println!("File saved to `{}`", dataset);
    }
}
