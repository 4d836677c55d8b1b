use std::fs;
use std::io::Write;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::{Cli, Commands};
use shiftsched_core::{validate, InputPayload, Session};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    match cli.command {
        Commands::Validate { input } => run_validate(&input),
        Commands::Run { input, output } => run_solve(&input, output.as_deref()),
    }
}

fn load_payload(path: &std::path::Path) -> Result<InputPayload> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading input payload from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing input payload from {}", path.display()))
}

fn run_validate(input: &std::path::Path) -> Result<()> {
    let payload = load_payload(input)?;
    match validate(&payload) {
        Ok(validated) => {
            info!(run_id = %validated.run_id, "payload is valid");
            println!("ok: {} slots, {} vehicles", validated.demand.len(), validated.num_vehicles);
            Ok(())
        }
        Err(issues) => {
            for issue in &issues {
                eprintln!("{issue}");
            }
            anyhow::bail!("{} validation issue(s) found", issues.len());
        }
    }
}

fn run_solve(input: &std::path::Path, output: Option<&std::path::Path>) -> Result<()> {
    let payload = load_payload(input)?;
    let validated = validate(&payload).map_err(|issues| {
        for issue in &issues {
            eprintln!("{issue}");
        }
        anyhow::anyhow!("{} validation issue(s) found", issues.len())
    })?;

    let session = Session::new();
    let cancel = session.cancel_handle();
    ctrlc::set_handler(move || {
        cancel.store(true, Ordering::Relaxed);
    })
    .context("installing Ctrl-C handler")?;

    let (tx, rx) = mpsc::channel();
    let writer = thread::spawn(move || {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        for event in rx {
            if let Ok(line) = serde_json::to_string(&event) {
                let _ = writeln!(handle, "{line}");
            }
        }
    });

    let result = session.run(&validated, tx);
    let _ = writer.join();

    let schedule = match result {
        Ok(schedule) => schedule,
        Err(err) => {
            error!(error = %err, "run did not produce a schedule");
            return Err(err.into());
        }
    };

    let json = serde_json::to_string_pretty(&schedule)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("writing schedule to {}", path.display()))?;
        }
        None => println!("{json}"),
    }

    Ok(())
}
