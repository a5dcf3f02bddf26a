use chrono::{SecondsFormat, Utc};
use clap::Parser;
use pacman_ghost_ai::config::{AiInfo, LevelConfig};
use pacman_ghost_ai::constants::TICK_MS;
use pacman_ghost_ai::error::ConfigError;
use pacman_ghost_ai::game::GameSession;
use pacman_ghost_ai::rng::Rng;
use pacman_ghost_ai::types::{
    CellIndex, GameEvent, GhostState, MapCellType, MoveDirection, Snapshot,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated seconds per scenario.
    #[arg(long, default_value_t = 90)]
    seconds: u32,
    #[arg(long)]
    level: Option<PathBuf>,
    #[arg(long)]
    ai: Option<PathBuf>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    /// Do not log individual game events.
    #[arg(long)]
    quiet_events: bool,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u64,
    seconds: u32,
}

#[derive(Clone, Debug, Default, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u64,
    seconds: u32,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    cleared: bool,
    #[serde(rename = "dotsEaten")]
    dots_eaten: usize,
    #[serde(rename = "dotsTotal")]
    dots_total: usize,
    #[serde(rename = "frightenedCount")]
    frightened_count: usize,
    #[serde(rename = "scatterCount")]
    scatter_count: usize,
    #[serde(rename = "ghostReleases")]
    ghost_releases: usize,
    #[serde(rename = "tunnelWraps")]
    tunnel_wraps: usize,
    #[serde(rename = "stateChanges")]
    state_changes: usize,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "clearedCount")]
    cleared_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "eventCounts")]
    event_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

struct Autopilot {
    rng: Rng,
    planned_from: Option<CellIndex>,
}

impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Rng::from_seed(seed ^ 0x5eed_0001),
            planned_from: None,
        }
    }

    fn choose(&mut self, session: &GameSession) -> Option<MoveDirection> {
        let pacman = session.pacman();
        let from = pacman.target_cell().unwrap_or_else(|| pacman.cell());
        if pacman.is_moving() && self.planned_from == Some(from) {
            return None;
        }
        self.planned_from = Some(from);

        let grid = session.grid();
        let open: Vec<(MoveDirection, CellIndex)> = MoveDirection::TRAVEL
            .into_iter()
            .filter_map(|direction| {
                let next = grid.neighbor(from, direction)?;
                (grid.get_cell(next) == Ok(MapCellType::Empty)).then_some((direction, next))
            })
            .collect();
        let forward: Vec<(MoveDirection, CellIndex)> = open
            .iter()
            .copied()
            .filter(|(direction, _)| *direction != pacman.direction().back())
            .collect();
        if forward.is_empty() && pacman.is_moving() {
            return None;
        }
        let hungry: Vec<MoveDirection> = forward
            .iter()
            .filter(|(_, next)| session.pellets().has(*next))
            .map(|(direction, _)| *direction)
            .collect();
        let pool: Vec<MoveDirection> = if !hungry.is_empty() {
            hungry
        } else if !forward.is_empty() {
            forward.iter().map(|(direction, _)| *direction).collect()
        } else {
            open.iter().map(|(direction, _)| *direction).collect()
        };
        self.rng.pick(&pool)
    }
}

fn main() {
    let cli = Cli::parse();
    let started_at = Utc::now();
    let run_started_at_ms = now_ms();
    let scenarios = resolve_scenarios(&cli);
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, run_started_at_ms));

    let (level, info) = match load_configuration(&cli) {
        Ok(loaded) => loaded,
        Err(error) => {
            emit_log(
                "error",
                "config_load_failed",
                &run_id,
                None,
                None,
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };

    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut event_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration_ms = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({ "seconds": scenario.seconds }),
        );
        let session = match GameSession::new(&level, info.clone(), scenario.seed) {
            Ok(session) => session,
            Err(error) => {
                emit_log(
                    "error",
                    "session_build_failed",
                    &run_id,
                    Some(&scenario.name),
                    Some(scenario.seed),
                    None,
                    json!({ "error": error.to_string() }),
                );
                std::process::exit(2);
            }
        };
        let scenario_run = run_scenario(
            &scenario,
            session,
            &mut event_counts,
            |tick, event| {
                if !cli.quiet_events {
                    emit_log(
                        "info",
                        "game_event",
                        &run_id,
                        Some(&scenario.name),
                        Some(scenario.seed),
                        Some(tick),
                        serde_json::to_value(event).unwrap_or(Value::Null),
                    );
                }
            },
        );

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({ "message": anomaly.message }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_duration_ms += scenario_run.result.duration_ms;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "cleared": scenario_run.result.cleared,
                "durationMs": scenario_run.result.duration_ms,
                "dotsEaten": scenario_run.result.dots_eaten,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        run_started_at_ms,
        now_ms(),
        scenario_results,
        event_counts,
        total_anomalies,
        total_duration_ms,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "clearedCount": summary.cleared_count,
            "averageDurationMs": summary.average_duration_ms,
            "eventCounts": summary.event_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn load_configuration(cli: &Cli) -> Result<(LevelConfig, AiInfo), ConfigError> {
    let level = match cli.level.as_deref() {
        Some(path) => LevelConfig::load(path)?,
        None => LevelConfig::classic()?,
    };
    let info = match cli.ai.as_deref() {
        Some(path) => AiInfo::load(path)?,
        None => AiInfo::classic()?,
    };
    Ok((level, info))
}

fn run_scenario(
    scenario: &Scenario,
    mut session: GameSession,
    event_counts: &mut BTreeMap<String, usize>,
    mut on_event: impl FnMut(u64, &GameEvent),
) -> ScenarioRunResult {
    let mut autopilot = Autopilot::new(scenario.seed);
    let rows = session.grid().rows();
    let columns = session.grid().columns();
    let duration_ms = scenario.seconds as u64 * 1_000;

    let mut result = ScenarioResultLine {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        seconds: scenario.seconds,
        ..ScenarioResultLine::default()
    };
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;

    while session.elapsed_ms() < duration_ms && !session.is_cleared() {
        if let Some(direction) = autopilot.choose(&session) {
            session.steer_pacman(direction);
        }
        session.step(TICK_MS);
        let snapshot = session.build_snapshot(true);
        last_tick = snapshot.tick;
        for message in collect_snapshot_anomalies(&snapshot, rows, columns) {
            push_anomaly(
                &mut result.anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        for event in &snapshot.events {
            *event_counts.entry(event_key(event).to_string()).or_insert(0) += 1;
            match event {
                GameEvent::FrightenedStarted => result.frightened_count += 1,
                GameEvent::ScatterStarted => result.scatter_count += 1,
                GameEvent::GhostReleased { .. } => result.ghost_releases += 1,
                GameEvent::TunnelWrap { .. } => result.tunnel_wraps += 1,
                GameEvent::GhostStateChanged { .. } => result.state_changes += 1,
                GameEvent::DotEaten { .. } => continue,
                _ => {}
            }
            on_event(snapshot.tick, event);
        }
        result.dots_eaten = snapshot.dots_eaten;
        result.dots_total = snapshot.dots_total;
    }

    result.cleared = session.is_cleared();
    result.duration_ms = session.elapsed_ms();
    ScenarioRunResult {
        result,
        anomaly_records,
        finished_tick: last_tick,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, rows: u16, columns: u16) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.dots_eaten > snapshot.dots_total {
        anomalies.push(format!(
            "pellet counter exceeds total: {}/{}",
            snapshot.dots_eaten, snapshot.dots_total
        ));
    }
    for ghost in &snapshot.ghosts {
        if ghost.cell.row >= rows || ghost.cell.column >= columns {
            anomalies.push(format!("{} outside the maze at {:?}", ghost.id.name(), ghost.cell));
        }
        if ghost.state == GhostState::Frightened && !snapshot.frightened_active {
            anomalies.push(format!("{} frightened without an active timer", ghost.id.name()));
        }
        if ghost.state == GhostState::Scatter && !snapshot.scatter_active {
            anomalies.push(format!("{} scattering outside a scatter period", ghost.id.name()));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(rand::random::<u64>);
    let seconds = cli.seconds.clamp(1, 3_600);
    vec![
        Scenario {
            name: "autopilot".to_string(),
            seed,
            seconds,
        },
        Scenario {
            name: "autopilot-reseeded".to_string(),
            seed: seed.wrapping_add(1),
            seconds,
        },
    ]
}

fn event_key(event: &GameEvent) -> &'static str {
    match event {
        GameEvent::GhostStateChanged { .. } => "ghost_state_changed",
        GameEvent::ScatterStarted => "scatter_started",
        GameEvent::ChaseResumed => "chase_resumed",
        GameEvent::FrightenedStarted => "frightened_started",
        GameEvent::FrightenedEnded => "frightened_ended",
        GameEvent::GhostReleased { .. } => "ghost_released",
        GameEvent::TunnelWrap { .. } => "tunnel_wrap",
        GameEvent::DotEaten { .. } => "dot_eaten",
        GameEvent::LevelCleared => "level_cleared",
    }
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u64, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

#[allow(clippy::too_many_arguments)]
fn build_run_summary(
    run_id: String,
    started_at: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    event_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_duration_ms: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_duration_ms = if scenario_count == 0 {
        0
    } else {
        total_duration_ms / scenario_count as u64
    };
    RunSummary {
        run_id,
        started_at,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        cleared_count: scenarios.iter().filter(|scenario| scenario.cleared).count(),
        average_duration_ms,
        event_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u64>,
    tick: Option<u64>,
    details: Value,
) {
    let now = Utc::now();
    let log_line = StructuredLogLine {
        timestamp_ms: now.timestamp_millis().max(0) as u64,
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
