//! Arcana harness.
//!
//! Runs a scenario file through a `CasterSession`, prints one report per
//! step, replays the session log to confirm determinism and prints the
//! final canonical hash.
//!
//! Usage: `arcana-harness <scenario.json> [--config <config.json>]`

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use arcana_engine::engine::ActionOutcome;
use arcana_runtime::config::RuntimeConfig;
use arcana_runtime::drift::compare_records;
use arcana_runtime::replay::rebuild_record;
use arcana_runtime::scenario::Scenario;
use arcana_runtime::session::CasterSession;

struct Args {
    scenario: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Option<Args> {
    let mut scenario = None;
    let mut config = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next()?)),
            _ if scenario.is_none() => scenario = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }
    Some(Args {
        scenario: scenario?,
        config,
    })
}

/// `RUST_LOG` wins; otherwise the config's filter.
fn init_logging(config: &RuntimeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        eprintln!("usage: arcana-harness <scenario.json> [--config <config.json>]");
        return ExitCode::from(2);
    };

    let config = match &args.config {
        Some(path) => match RuntimeConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::from(2);
            }
        },
        None => RuntimeConfig::default(),
    };
    init_logging(&config);

    match run(&args, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &RuntimeConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let scenario = Scenario::load(&args.scenario)?;
    let actions = scenario.actions()?;
    println!("Loaded scenario from: {}", args.scenario.display());

    let mut session = CasterSession::from_config(scenario.record.clone(), config)?;
    for (i, action) in actions.into_iter().enumerate() {
        let name = action.name();
        let outcome = session.apply(action)?;
        match &outcome {
            ActionOutcome::Cast(report) if !report.success => {
                let reasons: Vec<&str> = report.errors.iter().map(|e| e.message.as_str()).collect();
                println!("[{:>3}] {name}: rejected ({})", i + 1, reasons.join("; "));
            }
            _ => println!("[{:>3}] {name}: {}", i + 1, serde_json::to_string(&outcome)?),
        }
    }

    let hash = session.current_hash()?;
    let (replayed, replay_hash) = rebuild_record(&scenario.record, session.log())?;
    let determinism_ok = replay_hash == hash;
    if !determinism_ok {
        println!("[FAIL] replay diverged: {:?}", compare_records(session.record(), &replayed));
    }

    let hash_ok = match &scenario.expected_hash {
        Some(expected) if *expected != hash => {
            println!("[FAIL] hash mismatch: got={hash} expected={expected}");
            false
        }
        _ => true,
    };

    println!("\n===========================================");
    println!("Final record: {}", serde_json::to_string(session.record())?);
    println!("Final hash:   {hash}");
    println!("Replay:       {}", if determinism_ok { "PASS" } else { "FAIL" });
    Ok(determinism_ok && hash_ok)
}
