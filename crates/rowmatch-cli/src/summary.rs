use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use rowmatch_cli::types::{AnalyzeOutcome, MatchOutcome, PriorityOutcome};
use rowmatch_model::{MatchStatus, PriorityConfig, ThresholdKind};

/// Largest number of row numbers listed per cell before eliding.
const MAX_LISTED_ROWS: usize = 8;

pub fn print_match_summary(outcome: &MatchOutcome) {
    println!("Incoming: {}", outcome.incoming.display());
    println!("Reference: {}", outcome.reference.display());
    if let Some(path) = &outcome.output {
        println!("Output: {}", path.display());
    }
    if let Some(path) = &outcome.report {
        println!("Report: {}", path.display());
    }

    let snapshot = &outcome.snapshot;
    let mut weights = Table::new();
    weights.set_header(vec![
        header_cell("Column"),
        header_cell("Weight"),
        header_cell("Priority"),
    ]);
    apply_table_style(&mut weights);
    align_column(&mut weights, 1, CellAlignment::Right);
    for (column, weight) in outcome.weights.iter() {
        weights.add_row(vec![
            Cell::new(column)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            weight_cell(weight),
            Cell::new(snapshot.priority_for(column)),
        ]);
    }
    println!("{weights}");
    println!(
        "{} {:.2}  {} {:.2}  {} {:.2}  {} {:.2}  optimize (effective) {:.4}",
        ThresholdKind::Fuzzy,
        snapshot.strategy_thresholds().fuzzy_simple,
        ThresholdKind::PartialFuzzy,
        snapshot.strategy_thresholds().fuzzy_partial,
        ThresholdKind::TokenSet,
        snapshot.strategy_thresholds().token_set,
        ThresholdKind::Total,
        snapshot.total_threshold(),
        outcome.optimize_threshold,
    );

    let description = outcome.description;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Outcome"), header_cell("Rows")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (status, count) in [
        (MatchStatus::Matched, description.passed),
        (MatchStatus::Review, description.needs_review),
        (MatchStatus::Ambiguous, description.ambiguous),
        (MatchStatus::Unmatched, description.unmatched),
    ] {
        table.add_row(vec![
            status_cell(status),
            count_cell(count, status_color(status)),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(description.total_rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if !outcome.issues.is_empty() {
        eprintln!("Warnings:");
        for issue in &outcome.issues {
            eprintln!("- {issue}");
        }
    }
}

pub fn print_analysis(outcome: &AnalyzeOutcome) {
    println!("File: {} ({} rows)", outcome.file.display(), outcome.rows);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Distinct"),
        header_cell("Uniqueness"),
        header_cell("Blank rows"),
        header_cell("Duplicate groups"),
        header_cell("Largest group"),
        header_cell("Smallest group"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for profile in &outcome.profiles {
        let duplicates = if profile.duplicate_groups.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(
                profile
                    .duplicate_groups
                    .iter()
                    .map(|rows| list_rows(rows))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };
        table.add_row(vec![
            Cell::new(&profile.column)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(profile.distinct),
            weight_cell(profile.uniqueness),
            if profile.blank_rows.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(list_rows(&profile.blank_rows)).fg(Color::Yellow)
            },
            duplicates,
            group_cell(profile.largest_group.as_ref()),
            group_cell(profile.smallest_group.as_ref()),
        ]);
    }
    println!("{table}");
    if !outcome.missing.is_empty() {
        eprintln!("Columns not found: {}", outcome.missing.join(", "));
    }
}

pub fn print_priorities(outcome: &PriorityOutcome) {
    println!("Profile: {}", outcome.profile.display());
    if outcome.saved {
        println!("Saved.");
    }
    println!("{}", priority_table(&outcome.priorities));
}

fn priority_table(priorities: &PriorityConfig) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Scope"),
        header_cell("1"),
        header_cell("2"),
        header_cell("3"),
        header_cell("4"),
    ]);
    apply_table_style(&mut table);
    let mut row = vec![
        Cell::new("default")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
    ];
    row.extend(priorities.default.iter().map(Cell::new));
    table.add_row(row);
    for (column, list) in &priorities.overrides {
        let mut row = vec![Cell::new(column).fg(Color::Blue)];
        row.extend(list.iter().map(Cell::new));
        table.add_row(row);
    }
    table
}

fn list_rows(rows: &[usize]) -> String {
    let mut listed: Vec<String> = rows
        .iter()
        .take(MAX_LISTED_ROWS)
        .map(ToString::to_string)
        .collect();
    if rows.len() > MAX_LISTED_ROWS {
        listed.push(format!("+{} more", rows.len() - MAX_LISTED_ROWS));
    }
    listed.join(", ")
}

fn group_cell(group: Option<&(String, usize)>) -> Cell {
    match group {
        Some((value, count)) => Cell::new(format!("{value} ({count})")),
        None => dim_cell("-"),
    }
}

fn weight_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.4}"))
}

fn status_cell(status: MatchStatus) -> Cell {
    Cell::new(status.label()).fg(status_color(status))
}

fn status_color(status: MatchStatus) -> Color {
    match status {
        MatchStatus::Matched => Color::Green,
        MatchStatus::Review => Color::Yellow,
        MatchStatus::Ambiguous => Color::Magenta,
        MatchStatus::Unmatched => Color::Red,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(60);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
