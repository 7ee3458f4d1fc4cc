mod speed;
mod trace;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vchain_core::test_harness::{run_simulator, SimulatorConfig, TestHarness};
use vchain_core::{Catalog, Engine, SimulationConfig};
use vchain_insight::{InsightClient, InsightConfig, InsightService};

const DEFAULT_FILTER: &str = "vchain=info,vchain_core=info,vchain_insight=info";

fn cli() -> Command {
    Command::new("vchain")
        .version(vchain_core::VERSION)
        .about("Animated AI value-chain simulation")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML simulation config"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON catalog replacing the built-in diagram and timeline"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("simulate")
                .about("Play one run and print its trace")
                .arg(
                    Arg::new("message")
                        .default_value("Qual o lucro?")
                        .help("Text to submit"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Seed for the agent picker"),
                )
                .arg(
                    Arg::new("speed")
                        .long("speed")
                        .default_value("1.0")
                        .value_parser(value_parser!(f64))
                        .help("Playback speed multiplier"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the final state as JSON"),
                ),
        )
        .subcommand(Command::new("nodes").about("List diagram nodes and their connections"))
        .subcommand(Command::new("timeline").about("List timeline steps"))
        .subcommand(
            Command::new("insight")
                .about("Generate a micro insight")
                .arg(
                    Arg::new("topic")
                        .long("topic")
                        .default_value("Mapa da Carreira")
                        .help("Topic being explored"),
                )
                .arg(
                    Arg::new("trait")
                        .long("trait")
                        .default_value("curiosidade")
                        .help("Observed user trait"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Run the randomized sequencer simulator")
                .arg(
                    Arg::new("operations")
                        .long("ops")
                        .default_value("2000")
                        .value_parser(value_parser!(u64))
                        .help("Number of operations per seed"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .default_value("42")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducibility"),
                )
                .arg(
                    Arg::new("seeds")
                        .long("seeds")
                        .value_parser(value_parser!(u64))
                        .help("Certify across seeds 0..N instead of a single seed"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_setup(matches: &ArgMatches) -> Result<(Catalog, SimulationConfig)> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let catalog = match matches.get_one::<PathBuf>("catalog") {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading catalog {}", path.display()))?;
            Catalog::from_json(&raw)
                .with_context(|| format!("loading catalog {}", path.display()))?
        }
        None => Catalog::try_builtin().context("built-in catalog")?,
    };
    Ok((catalog, config))
}

async fn simulate(matches: &ArgMatches, args: &ArgMatches) -> Result<()> {
    let message = args.get_one::<String>("message").cloned().unwrap_or_default();
    if message.trim().is_empty() {
        bail!("message must not be blank");
    }
    let (catalog, config) = load_setup(matches)?;
    let speed = args.get_one::<f64>("speed").copied().unwrap_or(1.0);
    let (catalog, config) = speed::apply(&catalog, &config, speed)?;

    let catalog = Arc::new(catalog);
    let completion = config.completion_message.clone();
    let mut engine =
        Engine::new(Arc::clone(&catalog), config).context("invalid simulation config")?;
    if let Some(seed) = args.get_one::<u64>("seed") {
        engine = engine.with_seed(*seed);
    }

    tracing::info!(speed, steps = catalog.len(), "simulation starting");
    let (handle, task) = vchain_core::runtime::spawn(engine);
    let mut updates = handle.subscribe();
    let mut last = handle.state();
    let transcript_start = last.chat_history.len();

    handle.start(message).await?;
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = updates.borrow_and_update().clone();
                for line in trace::describe_change(&catalog, &last, &next) {
                    println!("{line}");
                }
                let finished = trace::run_finished(&next, transcript_start, &completion);
                last = next;
                if finished {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("interrompido");
                handle.reset().await?;
                break;
            }
        }
    }

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&handle.state())?);
    }
    handle.shutdown().await?;
    task.await.context("simulation task panicked")?;
    Ok(())
}

fn nodes(matches: &ArgMatches) -> Result<()> {
    let (catalog, _) = load_setup(matches)?;
    for layer in catalog.layers() {
        println!(
            "{:<12} L{} {} - {}",
            layer.id.as_str(),
            layer.layer_num,
            layer.label,
            layer.subtitle
        );
        let outgoing: Vec<&str> = catalog
            .outgoing(&layer.id)
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        if !outgoing.is_empty() {
            println!("             -> {}", outgoing.join(", "));
        }
    }
    Ok(())
}

fn timeline(matches: &ArgMatches) -> Result<()> {
    let (catalog, _) = load_setup(matches)?;
    for (index, step) in catalog.timeline().iter().enumerate() {
        println!(
            "{:>2}. {:<40} {:>5} ms  [{}]",
            index,
            step.description,
            step.duration_ms,
            step.active_nodes
                .iter()
                .map(|n| n.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!("Total: {} ms", catalog.total_duration().as_millis());
    Ok(())
}

async fn insight(args: &ArgMatches) -> Result<()> {
    let topic = args.get_one::<String>("topic").cloned().unwrap_or_default();
    let user_trait = args.get_one::<String>("trait").cloned().unwrap_or_default();
    let client = InsightClient::new(InsightConfig::from_env());
    println!("{}", client.generate_insight(&topic, &user_trait).await);
    Ok(())
}

fn check(args: &ArgMatches) -> bool {
    let operations = args.get_one::<u64>("operations").copied().unwrap_or(2000);

    if let Some(seeds) = args.get_one::<u64>("seeds").copied() {
        println!("Certifying {seeds} seeds x {operations} operations...");
        let report = TestHarness::run_certification(seeds, operations);
        println!("Seeds: {}", report.seeds_tested);
        println!("Violations: {}", report.total_violations);
        println!("Result: {}", if report.passed { "PASS" } else { "FAIL" });
        return report.passed;
    }

    let seed = args.get_one::<u64>("seed").copied().unwrap_or(42);
    println!("Running sequencer simulator...");
    println!("Operations: {operations}");
    println!("Seed: {seed}");
    println!();

    let report = run_simulator(SimulatorConfig {
        seed,
        total_operations: operations,
        ..Default::default()
    });
    println!("{}", report.generate_text());
    report.passed()
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match matches.subcommand() {
        Some(("simulate", args)) => simulate(&matches, args).await,
        Some(("nodes", _)) => nodes(&matches),
        Some(("timeline", _)) => timeline(&matches),
        Some(("insight", args)) => insight(args).await,
        Some(("check", args)) => {
            let passed = check(args);
            std::process::exit(if passed { 0 } else { 1 });
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn global_flags_reach_subcommands() {
        let matches = cli()
            .try_get_matches_from(["vchain", "simulate", "oi", "--seed", "3", "--speed", "4"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "simulate");
        assert_eq!(args.get_one::<String>("message").map(String::as_str), Some("oi"));
        assert_eq!(args.get_one::<u64>("seed"), Some(&3));
        assert_eq!(args.get_one::<f64>("speed"), Some(&4.0));
    }

    #[test]
    fn builtin_setup_without_flags() {
        let matches = cli().try_get_matches_from(["vchain", "nodes"]).unwrap();
        let (catalog, config) = load_setup(&matches).unwrap();
        assert_eq!(catalog.layers().len(), 8);
        assert_eq!(config, SimulationConfig::default());
    }
}
