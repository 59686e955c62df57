use crate::domain::command::CommandKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `None` when the engine was built from an in-memory description.
    pub source_path: Option<String>,
    pub signal_count: usize,
    pub port_count: usize,
    pub bus_count: usize,
    pub edge_count: usize,
    pub pattern_count: usize,
    pub network_node_count: usize,
    pub observer_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Label of the signal to match; its driving port is the match context.
    pub signal: String,
    /// Overrides `matching.max_results` from the engine config.
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDto {
    pub signal: String,
    pub port: Option<PortDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDto {
    pub id: u64,
    pub entity: String,
    pub architecture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDto {
    pub pattern: String,
    pub score: u32,
    pub groups: BTreeMap<String, Vec<CaptureDto>>,
}

/// Matches ordered by descending score, ties by pattern id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub signal: String,
    pub total: usize,
    pub matches: Vec<MatchDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFirstResponse {
    pub signal: String,
    pub best: Option<MatchDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsRequest {
    pub commands: Vec<CommandKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutedDto {
    pub command: String,
    pub created: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortedDto {
    pub command: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsResponse {
    pub executed: Vec<ExecutedDto>,
    pub aborted: Vec<AbortedDto>,
    /// Commands dropped because the command channel is disabled.
    pub rejected: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamRequest {
    /// Root signal labels.
    pub signals: Vec<String>,
    /// Regex applied to upstream signal labels.
    #[serde(default)]
    pub label_pattern: Option<String>,
    /// Only report ports of this entity.
    #[serde(default)]
    pub entity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamResponse {
    pub signals: Vec<String>,
    pub ports: Vec<PortDto>,
}
