use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use snafu::ResultExt;

use crate::{
    continuity::{Continuity, ContinuityVerdict},
    error::{IoWriteSnafu, PlumblineError},
};

const BANNER_WIDTH: usize = 50;

fn state_text(state: &Continuity) -> &'static str {
    match state {
        Continuity::Continuous { .. } => "CONTINUOUS",
        Continuity::Discontinuous => "DISCONTINUOUS",
    }
}

fn distance_text(state: &Continuity) -> String {
    match state {
        Continuity::Continuous { distance } => format!("{:.2}", distance),
        Continuity::Discontinuous => "-".to_string(),
    }
}

/// Renders the verdict list as the plain-text continuity table handed to
/// site engineers. One row per verdict, in the matcher's deterministic
/// order.
pub fn render_table(verdicts: &[ContinuityVerdict]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(BANNER_WIDTH));
    let _ = writeln!(out, "NORMALIZED CONTINUITY ANALYSIS");
    let _ = writeln!(out, "{}", "=".repeat(BANNER_WIDTH));

    let levels: Vec<String> = verdicts
        .iter()
        .map(|v| format!("{} -> {}", v.lower, v.upper))
        .collect();
    let level_width = levels
        .iter()
        .map(String::len)
        .chain(["Levels".len()])
        .max()
        .unwrap_or(0);
    let label_width = verdicts
        .iter()
        .map(|v| v.label.len())
        .chain(["Element".len()])
        .max()
        .unwrap_or(0);

    let _ = writeln!(
        out,
        "{:<level_width$}  {:<label_width$}  {:<13}  {}",
        "Levels", "Element", "State", "Distance"
    );
    for (verdict, level) in verdicts.iter().zip(&levels) {
        let _ = writeln!(
            out,
            "{:<level_width$}  {:<label_width$}  {:<13}  {}",
            level,
            verdict.label,
            state_text(&verdict.state),
            distance_text(&verdict.state)
        );
    }

    if verdicts.is_empty() {
        let _ = writeln!(out, "(no adjacent sheet pairs with data)");
    }

    out
}

/// One row per verdict: `lower,upper,element,state,distance`, distance
/// blank when discontinuous.
pub fn write_csv<W: Write>(writer: &mut W, verdicts: &[ContinuityVerdict]) -> std::io::Result<()> {
    writeln!(writer, "lower,upper,element,state,distance")?;
    for verdict in verdicts {
        let distance = match verdict.state {
            Continuity::Continuous { distance } => format!("{:.2}", distance),
            Continuity::Discontinuous => String::new(),
        };
        writeln!(
            writer,
            "{},{},{},{},{}",
            verdict.lower,
            verdict.upper,
            verdict.label,
            state_text(&verdict.state),
            distance
        )?;
    }
    Ok(())
}

pub fn write_json<W: Write>(
    writer: &mut W,
    verdicts: &[ContinuityVerdict],
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(writer, verdicts)
}

/// Writes any rendered report to disk with a stage-tagged IO error.
pub fn save_report(path: &Path, contents: &str) -> Result<(), PlumblineError> {
    std::fs::write(path, contents).context(IoWriteSnafu {
        path: path.to_string_lossy().to_string(),
    })
}
