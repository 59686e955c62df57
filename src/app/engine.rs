use crate::adapters::catalog::MapEntityCatalog;
use crate::adapters::observer::TracingObserver;
use crate::adapters::properties::ConstantEntityProvider;
use crate::adapters::source::JsonSystemSource;
use crate::app::config::EngineConfig;
use crate::app::dto::*;
use crate::domain::builder::SystemBuilder;
use crate::domain::command::{
    AttachOptions, Mediator, MediatorOptions, ObserverHandle, PushOutcome, SystemObserver,
};
use crate::domain::description::SystemDescription;
use crate::domain::graph::SignalSystem;
use crate::domain::ids::{EntityId, PortId, SignalId};
use crate::domain::matching::{Capture, Match};
use crate::domain::network::DiscriminationNetwork;
use crate::domain::ports::{GraphView, SystemSource};
use crate::domain::traversal::{ScanRoot, Scanner};
use anyhow::{Context as _, Result, anyhow};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// Thread-safe facade over a mediated signal system and its rule network.
#[derive(Clone)]
pub struct MatchEngine {
    inner: Arc<RwLock<EngineState>>,
}

struct EngineState {
    source_path: Option<PathBuf>,
    mediator: Mediator,
    network: DiscriminationNetwork,
    scanner: Scanner,
    config: EngineConfig,
}

impl MatchEngine {
    /// Build an engine from an in-memory description; such an engine cannot reload.
    pub fn from_description(description: &SystemDescription, config: EngineConfig) -> Result<Self> {
        Self::assemble(None, description, config)
    }

    pub fn load_from_json(path: &Path, config: EngineConfig) -> Result<Self> {
        let description = JsonSystemSource::new(path).load()?;
        Self::assemble(Some(path.to_path_buf()), &description, config)
    }

    fn assemble(
        source_path: Option<PathBuf>,
        description: &SystemDescription,
        config: EngineConfig,
    ) -> Result<Self> {
        let (system, network) = compile(description)?;
        let mut mediator = Mediator::new(system, MediatorOptions::from(&config.mediator));
        mediator.attach(
            Box::new(TracingObserver::default()),
            AttachOptions {
                auto_initialize: false,
                auto_detach: false,
            },
        );
        let scanner = Scanner::new(config.scan.ignore_hold);
        info!(
            signals = mediator.system().signals().len(),
            patterns = network.len(),
            "match engine ready"
        );
        Ok(Self {
            inner: Arc::new(RwLock::new(EngineState {
                source_path,
                mediator,
                network,
                scanner,
                config,
            })),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, EngineState>> {
        self.inner.read().map_err(|_| anyhow!("Engine state lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, EngineState>> {
        self.inner.write().map_err(|_| anyhow!("Engine state lock poisoned"))
    }

    pub fn config(&self) -> Result<EngineConfig> {
        Ok(self.read()?.config.clone())
    }

    pub fn health(&self) -> Result<HealthResponse> {
        Ok(health_of(&*self.read()?))
    }

    /// Re-read the description file and swap the new system in, keeping observers.
    pub fn reload(&self) -> Result<HealthResponse> {
        let path = self
            .read()?
            .source_path
            .clone()
            .ok_or_else(|| anyhow!("Engine was not loaded from a file; nothing to reload"))?;
        let description = JsonSystemSource::new(&path).load()?;
        let (system, network) = compile(&description)?;

        let mut state = self.write()?;
        state.mediator.replace_system(system);
        state.network = network;
        info!(path = %path.display(), "reloaded system description");
        Ok(health_of(&state))
    }

    pub fn attach_observer(
        &self,
        observer: Box<dyn SystemObserver>,
        options: AttachOptions,
    ) -> Result<ObserverHandle> {
        Ok(self.write()?.mediator.attach(observer, options))
    }

    pub fn detach_observer(&self, handle: ObserverHandle) -> Result<bool> {
        Ok(self.write()?.mediator.detach(handle).is_some())
    }

    /// Every pattern matching the signal, best first.
    pub fn match_all(&self, req: MatchRequest) -> Result<MatchResponse> {
        let state = self.read()?;
        let system = state.mediator.system();
        let signal = system.find_signal_by_label(&req.signal)?;
        let collection = state
            .network
            .match_signal(system, signal)
            .with_context(|| format!("Failed to match signal {}", req.signal))?;

        let total = collection.len();
        let mut matches = collection.into_matches();
        matches.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.pattern.cmp(&b.pattern)));
        if let Some(limit) = req.max_results.or(state.config.matching.max_results) {
            matches.truncate(limit);
        }
        Ok(MatchResponse {
            signal: req.signal,
            total,
            matches: matches.iter().map(|m| match_dto(system, m)).collect(),
        })
    }

    pub fn match_first(&self, req: MatchRequest) -> Result<MatchFirstResponse> {
        let state = self.read()?;
        let system = state.mediator.system();
        let signal = system.find_signal_by_label(&req.signal)?;
        let best = state
            .network
            .match_first(system, signal, system.driven_by_port(signal))
            .with_context(|| format!("Failed to match signal {}", req.signal))?;
        Ok(MatchFirstResponse {
            signal: req.signal,
            best: best.as_ref().map(|m| match_dto(system, m)),
        })
    }

    /// Post a batch through the mediator and flush it.
    pub fn post_commands(&self, req: CommandsRequest) -> Result<CommandsResponse> {
        let mut state = self.write()?;
        let mut rejected = 0;
        for kind in req.commands {
            if state.mediator.post_command(kind) == PushOutcome::Rejected {
                rejected += 1;
            }
        }
        let report = state.mediator.flush();
        Ok(CommandsResponse {
            executed: report
                .executed
                .iter()
                .map(|done| ExecutedDto {
                    command: done.command.to_string(),
                    created: done.created.map(|id| id.0),
                })
                .collect(),
            aborted: report
                .aborted
                .iter()
                .map(|failed| AbortedDto {
                    command: failed.command.to_string(),
                    error: failed.error.to_string(),
                })
                .collect(),
            rejected,
        })
    }

    /// Signals and ports upstream of the given roots, each reported once.
    pub fn upstream(&self, req: UpstreamRequest) -> Result<UpstreamResponse> {
        let label_filter = req
            .label_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("Invalid label pattern")?;
        let entity_filter = req.entity.as_deref().map(EntityId::from);

        let state = self.read()?;
        let system = state.mediator.system();
        let roots = req
            .signals
            .iter()
            .map(|label| system.find_signal_by_label(label).map(ScanRoot::Signal))
            .collect::<Result<Vec<_>, _>>()?;

        let signals = state.scanner.find_all_signals(system, &roots, |signal| {
            label_filter
                .as_ref()
                .is_none_or(|re| re.is_match(&signal_label(system, signal)))
        })?;
        let ports = state.scanner.find_all_ports(system, &roots, |port| {
            entity_filter
                .as_ref()
                .is_none_or(|entity| system.entity(port) == Some(entity))
        })?;

        Ok(UpstreamResponse {
            signals: signals.into_iter().map(|signal| signal_label(system, signal)).collect(),
            ports: ports.into_iter().filter_map(|port| port_dto(system, port)).collect(),
        })
    }
}

/// Build the system and the network described by `description`.
fn compile(description: &SystemDescription) -> Result<(SignalSystem, DiscriminationNetwork)> {
    let mut catalog = MapEntityCatalog::standard();
    catalog.extend_from(&description.entities);
    let builder = SystemBuilder::with_catalog(&catalog);

    let mut system = builder.build(description).context("Failed to build signal system")?;
    system.add_property_provider(Arc::new(ConstantEntityProvider::standard()));
    if !description.constant_entities.is_empty() {
        system.add_property_provider(Arc::new(ConstantEntityProvider::new(
            "Constant",
            description.constant_entities.iter().cloned(),
        )));
    }
    let network = builder
        .build_network(description)
        .context("Failed to build discrimination network")?;
    Ok((system, network))
}

fn health_of(state: &EngineState) -> HealthResponse {
    let system = state.mediator.system();
    HealthResponse {
        source_path: state
            .source_path
            .as_ref()
            .map(|path| path.to_string_lossy().to_string()),
        signal_count: system.signals().len(),
        port_count: system.ports().len(),
        bus_count: system.buses().len(),
        edge_count: system.edge_count(),
        pattern_count: state.network.len(),
        network_node_count: state.network.node_count(),
        observer_count: state.mediator.observer_count(),
    }
}

/// The signal's label, or its id when it has none.
fn signal_label(system: &SignalSystem, signal: SignalId) -> String {
    system
        .signal(signal)
        .and_then(|node| node.label.clone())
        .unwrap_or_else(|| signal.to_string())
}

fn port_dto(system: &SignalSystem, port: PortId) -> Option<PortDto> {
    let node = system.port(port)?;
    Some(PortDto {
        id: port.0.0,
        entity: node.entity.to_string(),
        architecture: node.architecture.as_ref().map(ToString::to_string),
    })
}

fn capture_dto(system: &SignalSystem, capture: &Capture) -> CaptureDto {
    CaptureDto {
        signal: signal_label(system, capture.signal),
        port: capture.port.and_then(|port| port_dto(system, port)),
    }
}

fn match_dto(system: &SignalSystem, m: &Match) -> MatchDto {
    MatchDto {
        pattern: m.pattern.to_string(),
        score: m.score,
        groups: m
            .groups
            .iter()
            .map(|(label, captures)| {
                (
                    label.clone(),
                    captures.iter().map(|capture| capture_dto(system, capture)).collect(),
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::source::parse_description;

    const NEGATED_SUM: &str = r#"{
        "signals": [{"label": "x"}, {"label": "y"}, {"label": "s"}, {"label": "n"}],
        "ports": [
            {"entity": "Std.Add", "inputs": ["x", "y"], "outputs": ["s"]},
            {"entity": "Std.Negate", "inputs": ["s"], "outputs": ["n"]}
        ],
        "inputs": ["x", "y"],
        "outputs": ["n"],
        "patterns": [
            {"id": "negate", "condition": {"type": "entity", "entity": "Std.Negate"}},
            {"id": "anything"}
        ]
    }"#;

    fn engine() -> MatchEngine {
        let description = parse_description(NEGATED_SUM).unwrap();
        MatchEngine::from_description(&description, EngineConfig::default()).unwrap()
    }

    fn request(signal: &str) -> MatchRequest {
        MatchRequest {
            signal: signal.into(),
            max_results: None,
        }
    }

    #[test]
    fn test_health_counts() {
        let health = engine().health().unwrap();
        assert_eq!(health.source_path, None);
        assert_eq!(health.signal_count, 4);
        assert_eq!(health.port_count, 2);
        assert_eq!(health.pattern_count, 2);
        assert_eq!(health.observer_count, 1);
    }

    #[test]
    fn test_match_all_orders_by_score() {
        let response = engine().match_all(request("n")).unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.matches[0].pattern, "negate");
        assert_eq!(response.matches[0].score, 2);
        assert_eq!(response.matches[1].pattern, "anything");
    }

    #[test]
    fn test_max_results_truncates() {
        let mut req = request("n");
        req.max_results = Some(1);
        let response = engine().match_all(req).unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.matches.len(), 1);
    }

    #[test]
    fn test_unknown_signal_is_an_error() {
        let err = engine().match_first(request("missing")).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_upstream_filters_by_entity() {
        let response = engine()
            .upstream(UpstreamRequest {
                signals: vec!["n".into()],
                label_pattern: Some("^[xy]$".into()),
                entity: Some("Std.Add".into()),
            })
            .unwrap();
        let mut signals = response.signals;
        signals.sort();
        assert_eq!(signals, vec!["x", "y"]);
        assert_eq!(response.ports.len(), 1);
        assert_eq!(response.ports[0].entity, "Std.Add");
    }

    #[test]
    fn test_reload_requires_a_source_file() {
        assert!(engine().reload().is_err());
    }
}
