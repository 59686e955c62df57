use crate::app::dto::{MatchDto, MatchRequest, UpstreamRequest};
use crate::app::engine::MatchEngine;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Rule matching over symbolic computation signal graphs.
#[derive(Parser, Debug)]
#[command(name = "symflow", author, version, about, long_about = None)]
pub struct Cli {
    /// System description (signals, ports, patterns) as JSON.
    #[arg(short, long, global = true, default_value = "system.json")]
    pub system: PathBuf,

    /// Engine config file (JSON); defaults apply when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print element and pattern counts.
    Summary,

    /// List every pattern matching a signal, best first.
    Match {
        /// Signal label.
        signal: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the single best match for a signal.
    MatchFirst {
        /// Signal label.
        signal: String,
    },

    /// List signals and ports upstream of the given signals.
    Upstream {
        /// Root signal labels.
        #[arg(required = true)]
        signals: Vec<String>,

        /// Regex filter on upstream signal labels.
        #[arg(long)]
        label: Option<String>,

        /// Only list ports of this entity.
        #[arg(long)]
        entity: Option<String>,
    },

    /// Serve the engine over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: SocketAddr,
    },
}

pub fn display_summary(engine: &MatchEngine) -> Result<()> {
    let health = engine.health()?;
    println!("System Summary:");
    if let Some(path) = &health.source_path {
        println!("  Source: {}", path);
    }
    println!("  Signals: {}", health.signal_count);
    println!("  Ports: {}", health.port_count);
    println!("  Buses: {}", health.bus_count);
    println!("  Edges: {}", health.edge_count);
    println!("  Patterns: {} ({} network nodes)", health.pattern_count, health.network_node_count);
    Ok(())
}

fn print_match(rank: usize, m: &MatchDto) {
    println!("{}. {} (score {})", rank, m.pattern, m.score);
    for (label, captures) in &m.groups {
        let rendered: Vec<String> = captures
            .iter()
            .map(|capture| match &capture.port {
                Some(port) => format!("{}@{}", capture.signal, port.entity),
                None => capture.signal.clone(),
            })
            .collect();
        println!("   {}: {}", label, rendered.join(", "));
    }
}

pub fn display_matches(engine: &MatchEngine, signal: &str, limit: Option<usize>) -> Result<()> {
    let result = engine.match_all(MatchRequest {
        signal: signal.to_string(),
        max_results: limit,
    })?;

    println!("Patterns matching \"{}\": {}", signal, result.total);
    println!("{}", "=".repeat(80));
    if let Some(lim) = limit.filter(|&lim| result.total > lim) {
        println!("Showing top {} by score:\n", lim);
    }
    for (i, m) in result.matches.iter().enumerate() {
        print_match(i + 1, m);
    }
    Ok(())
}

pub fn display_best_match(engine: &MatchEngine, signal: &str) -> Result<()> {
    let result = engine.match_first(MatchRequest {
        signal: signal.to_string(),
        max_results: None,
    })?;
    match &result.best {
        Some(best) => print_match(1, best),
        None => println!("No pattern matches \"{}\"", signal),
    }
    Ok(())
}

pub fn display_upstream(
    engine: &MatchEngine,
    signals: &[String],
    label_pattern: Option<String>,
    entity: Option<String>,
) -> Result<()> {
    let result = engine.upstream(UpstreamRequest {
        signals: signals.to_vec(),
        label_pattern,
        entity,
    })?;

    println!("Upstream of {:?}:", signals);
    println!("  Signals ({}): {}", result.signals.len(), result.signals.join(", "));
    println!("  Ports ({}):", result.ports.len());
    for port in &result.ports {
        match &port.architecture {
            Some(arch) => println!("    #{} {} [{}]", port.id, port.entity, arch),
            None => println!("    #{} {}", port.id, port.entity),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_upstream_filters() {
        let cli = Cli::try_parse_from([
            "symflow",
            "--system",
            "s.json",
            "upstream",
            "out",
            "--label",
            "^x",
            "--entity",
            "Std.Add",
        ])
        .unwrap();
        assert_eq!(cli.system, PathBuf::from("s.json"));
        match cli.command {
            Commands::Upstream { signals, label, entity } => {
                assert_eq!(signals, vec!["out"]);
                assert_eq!(label.as_deref(), Some("^x"));
                assert_eq!(entity.as_deref(), Some("Std.Add"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
