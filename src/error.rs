//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore dell'applicazione e la
//! normalizzazione degli errori grezzi restituiti dai tool esterni.
//!
//! ## Responsabilità:
//! - Definisce `SizeError` per le condizioni fatali a livello di batch
//! - Definisce `RawError`, la forma eterogenea degli errori dei tool
//! - Definisce `NormalizedError`, il contratto uniforme esposto ai consumer
//! - Implementa `normalize_error`, la catena ordinata di classificazione
//!
//! ## Categorie di errori:
//! - `InputMissing`: nessun input fornito (pattern, stream o sorgenti)
//! - `Validation`: opzioni non valide rilevate prima dell'avvio
//!
//! Tutti gli altri fallimenti (glob, lettura file, stream, minificazione,
//! compressione) non sono fatali: vengono catturati al confine del
//! componente che li osserva e trasportati come `NormalizedError` nel
//! report del singolo item, senza interrompere il batch.
//!
//! ## Catena di normalizzazione:
//! Ogni minificatore e compressore riporta i fallimenti con una forma
//! diversa. `normalize_error` prova, nell'ordine, cinque pattern noti e
//! ricade su `{message}` quando nessuno corrisponde. L'ordine della catena
//! è significativo: riordinarla cambierebbe la classificazione dei
//! messaggi ambigui.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Fatal errors aborting a whole batch call before any result is produced
#[derive(thiserror::Error, Debug)]
pub enum SizeError {
    #[error("Input files, streams or sources missing.")]
    InputMissing,

    #[error("Invalid options: {0}")]
    Validation(String),
}

/// Raw failure shape collected at the boundary of an external tool.
///
/// The message keeps the tool's original wording. Line and column are set
/// only when the tool exposes a structured location; the column is kept
/// 0-indexed here and converted to 1-indexed during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawError {
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl RawError {
    /// Create a raw error carrying only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a raw error with a structured location (0-indexed column)
    pub fn located(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for RawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<std::io::Error> for RawError {
    fn from(error: std::io::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Uniform error record carried by a failed item's report.
///
/// `reason` is a short classification of the failure cause, never longer
/// than `message`. `line` and `column` are 1-indexed; absent fields mean
/// the origin tool did not supply location information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl NormalizedError {
    fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
            line: None,
            column: None,
        }
    }
}

static LOCATION_MARKER: OnceLock<Regex> = OnceLock::new();
static TRAILING_LOCATION: OnceLock<Regex> = OnceLock::new();
static STYLESHEET_LINE: OnceLock<Regex> = OnceLock::new();
static BRACKETED_PREFIX: OnceLock<Regex> = OnceLock::new();

fn location_marker() -> &'static Regex {
    LOCATION_MARKER.get_or_init(|| {
        Regex::new(r"([^\s:]+):(\d+):(\d+):\s*").expect("location marker regex is valid")
    })
}

fn trailing_location() -> &'static Regex {
    TRAILING_LOCATION
        .get_or_init(|| Regex::new(r"\s*\((\d+):(\d+)\)").expect("trailing location regex is valid"))
}

fn stylesheet_line() -> &'static Regex {
    STYLESHEET_LINE.get_or_init(|| {
        Regex::new(r"Parse error on line (\d+)").expect("stylesheet line regex is valid")
    })
}

fn bracketed_prefix() -> &'static Regex {
    BRACKETED_PREFIX
        .get_or_init(|| Regex::new(r"^\s*\[[^\]]*\]\s*").expect("bracketed prefix regex is valid"))
}

/// Convert a raw tool error into the uniform error contract.
///
/// Pure and total; classification patterns are tried in order until one
/// matches, falling back to a message-only record:
///
/// 1. An explicit structured location (compiler-style fields)
/// 2. A `path:line:col: ` marker inside the message (esbuild-style)
/// 3. A trailing `(line:col)` marker (parser-style)
/// 4. A `Parse error on line N` phrase (stylesheet-style)
/// 5. A multi-line message containing `Caused by:`
pub fn normalize_error(raw: &RawError) -> NormalizedError {
    // 1. Structured location fields reported by the tool itself
    if raw.line.is_some() {
        return NormalizedError {
            message: raw.message.clone(),
            reason: Some(raw.message.clone()),
            line: raw.line,
            column: raw.column.map(|column| column + 1),
        };
    }

    let message = &raw.message;

    // 2. "path:line:col: " marker embedded in the message
    if let Some(captures) = location_marker().captures(message) {
        let matched = captures.get(0).expect("regex match has a full capture");
        let stripped = format!("{}{}", &message[..matched.start()], &message[matched.end()..]);
        return NormalizedError {
            reason: Some(stripped.clone()),
            message: stripped,
            line: captures[2].parse().ok(),
            column: captures[3].parse::<u32>().ok().map(|column| column + 1),
        };
    }

    // 3. Trailing "(line:col)" marker
    if let Some(captures) = trailing_location().captures(message) {
        let matched = captures.get(0).expect("regex match has a full capture");
        let stripped = format!("{}{}", &message[..matched.start()], &message[matched.end()..]);
        let reason = stripped.lines().next().unwrap_or_default().to_string();
        return NormalizedError {
            message: stripped,
            reason: Some(reason),
            line: captures[1].parse().ok(),
            column: captures[2].parse::<u32>().ok().map(|column| column + 1),
        };
    }

    // 4. "Parse error on line N" phrase
    if let Some(captures) = stylesheet_line().captures(message) {
        let matched = captures.get(0).expect("regex match has a full capture");
        let reason = "Stylesheet parsing error";
        let replaced = format!(
            "{}{}{}",
            &message[..matched.start()],
            reason,
            &message[matched.end()..]
        );
        return NormalizedError {
            message: replaced,
            reason: Some(reason.to_string()),
            line: captures[1].parse().ok(),
            column: None,
        };
    }

    // 5. Multi-line message with a "Caused by:" section
    if message.contains("Caused by:") {
        let reason = message
            .lines()
            .take(2)
            .map(|line| bracketed_prefix().replace(line, "").trim().to_string())
            .find(|line| !line.is_empty());
        return NormalizedError {
            message: message.clone(),
            reason,
            line: None,
            column: None,
        };
    }

    NormalizedError::message_only(message.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_location_is_copied_through() {
        let raw = RawError::located("Unexpected end of input", 3, 7);
        let error = normalize_error(&raw);
        assert_eq!(error.message, "Unexpected end of input");
        assert_eq!(error.reason.as_deref(), Some("Unexpected end of input"));
        assert_eq!(error.line, Some(3));
        assert_eq!(error.column, Some(8));
    }

    #[test]
    fn test_location_marker_is_stripped() {
        let raw = RawError::new("<stdin>:1:9: Expected identifier");
        let error = normalize_error(&raw);
        assert_eq!(error.message, "Expected identifier");
        assert_eq!(error.reason.as_deref(), Some("Expected identifier"));
        assert_eq!(error.line, Some(1));
        assert_eq!(error.column, Some(10));
    }

    #[test]
    fn test_trailing_location_is_stripped() {
        let raw = RawError::new("Unexpected token (1:9)\n> 1 | function () {}");
        let error = normalize_error(&raw);
        assert_eq!(error.message, "Unexpected token\n> 1 | function () {}");
        assert_eq!(error.reason.as_deref(), Some("Unexpected token"));
        assert_eq!(error.line, Some(1));
        assert_eq!(error.column, Some(10));
    }

    #[test]
    fn test_stylesheet_phrase_is_replaced() {
        let raw = RawError::new("Parse error on line 2:\n.button padding\n-------^");
        let error = normalize_error(&raw);
        assert_eq!(
            error.message,
            "Stylesheet parsing error:\n.button padding\n-------^"
        );
        assert_eq!(error.reason.as_deref(), Some("Stylesheet parsing error"));
        assert_eq!(error.line, Some(2));
        assert_eq!(error.column, None);
    }

    #[test]
    fn test_caused_by_extracts_reason() {
        let raw = RawError::new("  [Error] Syntax not supported\nCaused by: bad token");
        let error = normalize_error(&raw);
        assert_eq!(error.message, raw.message);
        assert_eq!(error.reason.as_deref(), Some("Syntax not supported"));
        assert_eq!(error.line, None);
        assert_eq!(error.column, None);
    }

    #[test]
    fn test_unrecognized_shape_keeps_message() {
        let raw = RawError::new("something went wrong");
        let error = normalize_error(&raw);
        assert_eq!(error.message, "something went wrong");
        assert_eq!(error.reason, None);
        assert_eq!(error.line, None);
        assert_eq!(error.column, None);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = RawError::new("Unexpected token (4:2)");
        assert_eq!(normalize_error(&raw), normalize_error(&raw));
    }

    #[test]
    fn test_reason_never_exceeds_message() {
        let samples = [
            RawError::located("short", 1, 0),
            RawError::new("<stdin>:2:4: tail"),
            RawError::new("first line (1:1)\nsecond line"),
            RawError::new("Parse error on line 9"),
            RawError::new("[x] head\nCaused by: tail"),
            RawError::new("plain"),
        ];
        for raw in samples {
            let error = normalize_error(&raw);
            if let Some(reason) = error.reason {
                assert!(reason.len() <= error.message.len());
            }
        }
    }
}
