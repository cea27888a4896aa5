//! # Report Module
//!
//! Questo modulo definisce i record di risultato esposti ai consumer e la
//! loro aggregazione e formattazione.
//!
//! ## Responsabilità:
//! - Definisce `SizeReport`, il record per-item (dimensioni oppure errore)
//! - Definisce `TotalReport`, la riga sintetica di totale
//! - Implementa `compute_total_sizes`, l'aggregatore puro dei totali
//! - Formattazione human-readable delle dimensioni e delle righe CLI
//!
//! ## Regole di aggregazione:
//! - Solo i record senza errore contribuiscono alle somme
//! - Un record con errore non conta come zero: è escluso del tutto
//! - `gzipped_size`/`brotlied_size` compaiono nel totale solo se almeno
//!   un record vi ha contribuito
//!
//! I record serializzano in camelCase e omettono i campi assenti, così
//! l'output JSON contiene solo le dimensioni effettivamente stimate.

use crate::error::NormalizedError;
use console::style;
use serde::{Deserialize, Serialize};

/// Estimated sizes of one input item, or its normalized failure.
/// Exactly one of `minified_size` and `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeReport {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minified_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gzipped_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brotlied_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<NormalizedError>,
}

impl SizeReport {
    /// Create a report carrying a normalized error
    pub fn failed(file: String, error: NormalizedError) -> Self {
        Self {
            file,
            original_size: None,
            minified_size: None,
            gzipped_size: None,
            brotlied_size: None,
            error: Some(error),
        }
    }
}

/// Synthetic aggregate row summing all successful reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalReport {
    pub total: bool,
    pub original_size: u64,
    pub minified_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gzipped_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brotlied_size: Option<u64>,
}

/// Fold a report list into one total row.
///
/// Synchronous and pure; error-bearing reports contribute nothing. The
/// compressed totals are omitted entirely when no report carried the
/// corresponding size.
pub fn compute_total_sizes(reports: &[SizeReport]) -> TotalReport {
    let mut original_size = 0;
    let mut minified_size = 0;
    let mut gzipped_size = 0;
    let mut brotlied_size = 0;

    for report in reports {
        if report.error.is_some() {
            continue;
        }
        original_size += report.original_size.unwrap_or(0);
        minified_size += report.minified_size.unwrap_or(0);
        gzipped_size += report.gzipped_size.unwrap_or(0);
        brotlied_size += report.brotlied_size.unwrap_or(0);
    }

    TotalReport {
        total: true,
        original_size,
        minified_size,
        gzipped_size: (gzipped_size > 0).then_some(gzipped_size),
        brotlied_size: (brotlied_size > 0).then_some(brotlied_size),
    }
}

/// Which size columns the CLI prints
#[derive(Debug, Clone, Copy)]
pub struct ColumnSelection {
    pub original: bool,
    pub minified: bool,
    pub gzipped: bool,
    pub brotlied: bool,
}

impl Default for ColumnSelection {
    fn default() -> Self {
        Self {
            original: true,
            minified: true,
            gzipped: true,
            brotlied: true,
        }
    }
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

fn selected_sizes(report: &SizeReport, columns: &ColumnSelection) -> Vec<u64> {
    let mut sizes = Vec::new();
    if columns.original {
        sizes.push(report.original_size.unwrap_or(0));
    }
    if columns.minified {
        sizes.push(report.minified_size.unwrap_or(0));
    }
    if columns.gzipped {
        if let Some(size) = report.gzipped_size {
            sizes.push(size);
        }
    }
    if columns.brotlied {
        if let Some(size) = report.brotlied_size {
            sizes.push(size);
        }
    }
    sizes
}

fn render_error(file: &str, error: &NormalizedError) -> String {
    let mut prefix = file.to_string();
    if let Some(line) = error.line {
        prefix.push_str(&format!("({}", line));
        if let Some(column) = error.column {
            prefix.push_str(&format!(",{}", column));
        }
        prefix.push(')');
    }

    // Stylesheet errors come with a line but no column and carry an ASCII
    // arrow under the offending text; colourize those continuation lines
    let message = if error.line.is_some() && error.column.is_none() {
        error
            .message
            .lines()
            .enumerate()
            .map(|(index, line)| {
                if index > 1 {
                    style(line).red().to_string()
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        error.message.clone()
    };

    format!("{} {}", style(format!("{}:", prefix)).magenta(), message)
}

/// Render one report as a CLI line
pub fn render_report(report: &SizeReport, columns: &ColumnSelection, raw_sizes: bool) -> String {
    if let Some(ref error) = report.error {
        return render_error(&report.file, error);
    }

    let sizes = selected_sizes(report, columns)
        .into_iter()
        .map(|size| {
            if raw_sizes {
                size.to_string()
            } else {
                format_size(size)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}: {}", report.file, sizes)
}

/// Render the total row as a CLI line
pub fn render_total(total: &TotalReport, columns: &ColumnSelection, raw_sizes: bool) -> String {
    let report = SizeReport {
        file: "total".to_string(),
        original_size: Some(total.original_size),
        minified_size: Some(total.minified_size),
        gzipped_size: total.gzipped_size,
        brotlied_size: total.brotlied_size,
        error: None,
    };
    render_report(&report, columns, raw_sizes)
}
