use anyhow::Result;

use crate::application::{StatusReport, StatusReporter, StatusScope};
use crate::runtime::Runtime;

use super::config::Config;

const YES: &str = "✔";
const NO: &str = "✖";

/// Show declared dependencies (or the whole global pool) and their link status
#[tracing::instrument(skip(runtime, config))]
pub fn status<R: Runtime>(runtime: R, global: bool, config: Config) -> Result<()> {
    let ctx = config.context(&runtime)?;
    let scope = if global {
        StatusScope::AllGlobal
    } else {
        StatusScope::DeclaredOnly
    };
    let report = StatusReporter::new(&runtime, &ctx).report(scope)?;

    println!();
    print!("{}", render_table(&report, scope));
    println!("{}\n", render_counts(&report));
    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value { YES } else { NO }
}

pub(crate) fn render_table(report: &StatusReport, scope: StatusScope) -> String {
    let mut header = vec!["Package"];
    if scope == StatusScope::AllGlobal {
        header.push("Link Path");
    }
    header.extend(["Symbolic", "Linked"]);

    let mut rows: Vec<Vec<String>> = vec![header.iter().map(|h| h.to_string()).collect()];
    for row in &report.rows {
        let mut cells = vec![row.name.clone()];
        if scope == StatusScope::AllGlobal {
            cells.push(
                row.real_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "n/a".to_string()),
            );
        }
        cells.push(flag(row.is_symbolic_link).to_string());
        cells.push(if row.is_missing {
            "missing".to_string()
        } else {
            flag(row.is_linked).to_string()
        });
        rows.push(cells);
    }

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|r| r[col].chars().count())
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub(crate) fn render_counts(report: &StatusReport) -> String {
    let counts = report.counts;
    let mut line = format!(
        "installed: {}   linked: {}",
        counts.installed, counts.linked
    );
    if counts.missing > 0 {
        line.push_str(&format!("   missing: {}", counts.missing));
    }
    line
}
