use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span, trace};

use rowmatch_cli::logging::redact_value;
use rowmatch_cli::types::{AnalyzeOutcome, MatchOutcome, MatchReport, PriorityOutcome};
use rowmatch_core::{MatchSession, Parallelism, RunOptions, normalize, profile_columns};
use rowmatch_ingest::{CsvSink, default_profile_path, load_profile, read_csv_table, save_profile};
use rowmatch_model::{
    MatchSettings, MatchStatus, PriorityConfig, Pruning, ThresholdKind, WeightSide,
};

use crate::cli::{AnalyzeArgs, MatchArgs, PriorityAction, PriorityArgs, PruningArg, WeightSideArg};
use crate::progress::MatchProgressBar;

pub fn run_match(args: &MatchArgs) -> Result<MatchOutcome> {
    let span = info_span!(
        "match",
        incoming = %args.incoming.display(),
        reference = %args.reference.display()
    );
    let _guard = span.enter();

    let mut settings = load_settings(args.profile.as_deref())?;
    apply_overrides(&mut settings, args)?;
    let snapshot = settings.snapshot().context("invalid match settings")?;

    let incoming = read_csv_table(&args.incoming)?;
    let reference = read_csv_table(&args.reference)?;
    let mut session = MatchSession::new(&incoming, &reference, snapshot);

    let progress = MatchProgressBar::new(
        session.incoming().len(),
        !args.no_progress && io::stderr().is_terminal(),
    );
    let options = RunOptions::default()
        .with_parallelism(parallelism(args.jobs))
        .with_progress(&progress);
    let run = session.run(&options).map(|_| ());
    progress.finish();
    run?;
    trace_unresolved_rows(&session);

    let mut output = None;
    if !args.apply.is_empty() || args.output.is_some() {
        session.apply_to_columns(&args.apply)?;
        if let Some(path) = &args.output {
            let mut sink = CsvSink::create(path)?;
            session
                .export(&mut sink)
                .with_context(|| format!("export matches: {}", path.display()))?;
            output = Some(path.clone());
        }
    }
    if let Some(path) = &args.report {
        write_report(path, args, &session)?;
    }

    Ok(MatchOutcome {
        incoming: args.incoming.clone(),
        reference: args.reference.clone(),
        snapshot: session.snapshot().clone(),
        weights: session.weights().clone(),
        optimize_threshold: session.optimize_threshold(),
        description: session.results_description(),
        issues: session.issues().to_vec(),
        output,
        report: args.report.clone(),
    })
}

pub fn run_analyze(args: &AnalyzeArgs) -> Result<AnalyzeOutcome> {
    let table = read_csv_table(&args.file)?;
    let dataset = normalize(&table);
    let columns: Vec<String> = if args.columns.is_empty() {
        dataset.columns().to_vec()
    } else {
        args.columns.clone()
    };
    let missing = columns
        .iter()
        .filter(|column| !dataset.has_column(column))
        .cloned()
        .collect();
    let profiles = profile_columns(&dataset, &columns);
    info!(
        file = %args.file.display(),
        rows = dataset.len(),
        columns = profiles.len(),
        "profiled columns"
    );
    Ok(AnalyzeOutcome {
        file: args.file.clone(),
        rows: dataset.len(),
        profiles,
        missing,
    })
}

pub fn run_priority(args: &PriorityArgs) -> Result<PriorityOutcome> {
    let path = match &args.profile {
        Some(path) => path.clone(),
        None => default_profile_path()
            .ok_or_else(|| anyhow!("cannot determine the profile location, pass --profile"))?,
    };
    let mut settings = load_profile(&path)?;
    let saved = match &args.action {
        PriorityAction::Show => false,
        PriorityAction::Swap {
            position_a,
            position_b,
            column,
        } => {
            settings.swap_priority(*position_a, *position_b, column.as_deref())?;
            true
        }
        PriorityAction::Reset {
            column: Some(column),
        } => {
            settings.priorities.reset(Some(column.as_str()));
            true
        }
        PriorityAction::Reset { column: None } => {
            settings.priorities = PriorityConfig::default();
            true
        }
    };
    if saved {
        save_profile(&path, &settings)?;
    }
    Ok(PriorityOutcome {
        profile: path,
        priorities: settings.priorities,
        saved,
    })
}

fn load_settings(profile: Option<&Path>) -> Result<MatchSettings> {
    match profile.map(Path::to_path_buf).or_else(default_profile_path) {
        Some(path) => load_profile(&path),
        None => Ok(MatchSettings::default()),
    }
}

/// Layer command-line flags over the loaded profile for this run only.
fn apply_overrides(settings: &mut MatchSettings, args: &MatchArgs) -> Result<()> {
    if !args.columns.is_empty() {
        settings.columns = args
            .columns
            .iter()
            .map(|column| column.trim().to_string())
            .filter(|column| !column.is_empty())
            .collect();
    }
    if args.recommended {
        settings.apply_recommended();
    }
    let thresholds = &args.thresholds;
    for (kind, value) in [
        (ThresholdKind::Fuzzy, thresholds.fuzzy),
        (ThresholdKind::PartialFuzzy, thresholds.partial),
        (ThresholdKind::TokenSet, thresholds.token_set),
        (ThresholdKind::Total, thresholds.total),
        (ThresholdKind::Optimize, thresholds.optimize),
    ] {
        if let Some(value) = value {
            settings.set_threshold(kind, value)?;
        }
    }
    if let Some(pruning) = args.pruning {
        settings.pruning = match pruning {
            PruningArg::Threshold => Pruning::Threshold,
            PruningArg::Auto => Pruning::Auto,
            PruningArg::Disabled => Pruning::Disabled,
        };
    }
    if let Some(side) = args.weights {
        settings.weight_side = match side {
            WeightSideArg::Incoming => WeightSide::Incoming,
            WeightSideArg::Reference => WeightSide::Reference,
        };
    }
    for swap in &args.swaps {
        settings
            .swap_priority(swap.position_a, swap.position_b, swap.column.as_deref())
            .with_context(|| format!("swap {swap}"))?;
    }
    Ok(())
}

fn parallelism(jobs: Option<usize>) -> Parallelism {
    match jobs {
        None | Some(0) => Parallelism::Auto,
        Some(1) => Parallelism::Sequential,
        Some(count) => Parallelism::Threads(count),
    }
}

fn trace_unresolved_rows(session: &MatchSession) {
    let Some(results) = session.results() else {
        return;
    };
    let incoming = session.incoming();
    for row in results
        .iter()
        .filter(|row| row.status != MatchStatus::Matched)
    {
        let key = session
            .snapshot()
            .columns()
            .iter()
            .filter_map(|column| incoming.get(row.incoming_row, column))
            .collect::<Vec<_>>()
            .join(" | ");
        trace!(
            row = incoming.display_row(row.incoming_row),
            status = %row.status,
            candidates = row.candidates.len(),
            value = redact_value(&key),
            "row not auto-matched"
        );
    }
}

fn write_report(path: &Path, args: &MatchArgs, session: &MatchSession) -> Result<()> {
    let rows = session
        .results()
        .ok_or_else(|| anyhow!("no match results to report"))?;
    let report = MatchReport {
        incoming: &args.incoming,
        reference: &args.reference,
        settings: session.snapshot(),
        weights: session.weights(),
        optimize_threshold: session.optimize_threshold(),
        description: session.results_description(),
        issues: session.issues(),
        rows,
    };
    let file = File::create(path).with_context(|| format!("create report: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report)
        .with_context(|| format!("write report: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush report: {}", path.display()))?;
    info!(path = %path.display(), "wrote match report");
    Ok(())
}
