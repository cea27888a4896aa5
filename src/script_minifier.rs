//! # Script Minification Module
//!
//! This module minifies JavaScript sources with one of the interchangeable
//! backends:
//!
//! - **oxc** (default): runs in process through the oxc parser, minifier
//!   and code generator
//! - **esbuild**: drives the `esbuild` executable found on the system
//! - **terser**: drives the `terser` executable found on the system
//!
//! External backends are resolved once per batch: the [`BackendHandle`]
//! locates the executable before the first dispatch and keeps it for the
//! remaining items, releasing it when the batch state is dropped. A missing
//! executable or an unknown backend identifier is a per-item error, never a
//! batch abort.
//!
//! Backends that escape non-ASCII characters into `\uXXXX` sequences would
//! inflate the measured size; the escaping is reversed after minification.

use crate::config::SourceTypeHint;
use crate::error::RawError;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_diagnostics::OxcDiagnostic;
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::sync::OnceLock;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Closed set of script minifier backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptBackendKind {
    Oxc,
    Esbuild,
    Terser,
}

impl ScriptBackendKind {
    /// Executable name for backends driven as external tools
    fn binary(&self) -> &'static str {
        match self {
            Self::Oxc => "oxc",
            Self::Esbuild => "esbuild",
            Self::Terser => "terser",
        }
    }
}

impl FromStr for ScriptBackendKind {
    type Err = RawError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "oxc" => Ok(Self::Oxc),
            "esbuild" => Ok(Self::Esbuild),
            "terser" => Ok(Self::Terser),
            other => Err(RawError::new(format!(
                "Unsupported minifier: \"{}\".",
                other
            ))),
        }
    }
}

enum ResolvedBackend {
    Oxc,
    External {
        kind: ScriptBackendKind,
        program: PathBuf,
    },
}

/// Per-batch handle owning the state of the selected script backend.
///
/// Resolution happens lazily before the first script dispatch and at most
/// once; dropping the handle releases the backend, which also covers a
/// lazily consumed batch abandoned early.
pub struct BackendHandle {
    minifier: String,
    resolved: Option<ResolvedBackend>,
}

impl BackendHandle {
    pub fn new(minifier: &str) -> Self {
        Self {
            minifier: minifier.to_string(),
            resolved: None,
        }
    }

    fn resolve(&self) -> Result<ResolvedBackend, RawError> {
        let kind = self.minifier.parse::<ScriptBackendKind>()?;
        match kind {
            ScriptBackendKind::Oxc => Ok(ResolvedBackend::Oxc),
            ScriptBackendKind::Esbuild | ScriptBackendKind::Terser => {
                let program = which::which(kind.binary()).map_err(|_| {
                    RawError::new(format!(
                        "The {} executable was not found in PATH.",
                        kind.binary()
                    ))
                })?;
                debug!("Resolved {} backend: {}", kind.binary(), program.display());
                Ok(ResolvedBackend::External { kind, program })
            }
        }
    }

    /// Minify one script source with the backend this handle was created for
    pub async fn minify(
        &mut self,
        source: &str,
        source_type: Option<SourceTypeHint>,
    ) -> Result<String, RawError> {
        if self.resolved.is_none() {
            self.resolved = Some(self.resolve()?);
        }
        let resolved = match self.resolved.as_ref() {
            Some(resolved) => resolved,
            None => return Err(RawError::new("Minifier backend not started.")),
        };

        let minified = match resolved {
            ResolvedBackend::Oxc => minify_with_oxc(source, source_type)?,
            ResolvedBackend::External { kind, program } => {
                run_external(*kind, program, source, source_type).await?
            }
        };
        Ok(replace_escaped_unicode(&minified))
    }
}

impl Drop for BackendHandle {
    fn drop(&mut self) {
        if self.resolved.take().is_some() {
            debug!("Released {} backend", self.minifier);
        }
    }
}

fn minify_with_oxc(source: &str, hint: Option<SourceTypeHint>) -> Result<String, RawError> {
    let source_type = match hint {
        Some(SourceTypeHint::Module) => SourceType::mjs(),
        Some(SourceTypeHint::Script) => SourceType::cjs(),
        None => SourceType::unambiguous(),
    };

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if let Some(diagnostic) = parsed.errors.first() {
        return Err(diagnostic_error(diagnostic, source));
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions::default()).build(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            ..CodegenOptions::default()
        })
        .with_symbol_table(minified.symbol_table)
        .build(&program)
        .code;
    Ok(code)
}

fn diagnostic_error(diagnostic: &OxcDiagnostic, source: &str) -> RawError {
    let message = diagnostic.message.to_string();
    match diagnostic.labels.as_ref().and_then(|labels| labels.first()) {
        Some(label) => {
            let (line, column) = offset_to_location(source, label.offset());
            RawError::located(message, line, column)
        }
        None => RawError::new(message),
    }
}

async fn run_external(
    kind: ScriptBackendKind,
    program: &Path,
    source: &str,
    source_type: Option<SourceTypeHint>,
) -> Result<String, RawError> {
    let mut args: Vec<&str> = match kind {
        ScriptBackendKind::Esbuild => vec!["--minify", "--loader=js"],
        ScriptBackendKind::Terser => vec!["--compress", "--mangle"],
        ScriptBackendKind::Oxc => Vec::new(),
    };
    if kind == ScriptBackendKind::Terser && source_type == Some(SourceTypeHint::Module) {
        args.push("--module");
    }

    debug!("Running {} {}", program.display(), args.join(" "));
    let mut child = Command::new(program)
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|error| {
            RawError::new(format!("Failed to start {}: {}", program.display(), error))
        })?;

    // The write runs as its own task so a source larger than the pipe
    // buffer cannot deadlock against a tool that streams output early
    let stdin = child.stdin.take();
    let payload = source.as_bytes().to_vec();
    let writer = tokio::spawn(async move {
        if let Some(mut stdin) = stdin {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
        }
        Ok::<(), std::io::Error>(())
    });

    let output = child.wait_with_output().await.map_err(RawError::from)?;
    if !output.status.success() {
        return Err(RawError::new(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    match writer.await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => return Err(RawError::from(error)),
        Err(error) => return Err(RawError::new(error.to_string())),
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Translate a byte offset into a 1-indexed line and a 0-indexed column
fn offset_to_location(source: &str, offset: usize) -> (u32, u32) {
    let mut boundary = offset.min(source.len());
    while boundary > 0 && !source.is_char_boundary(boundary) {
        boundary -= 1;
    }
    let before = &source[..boundary];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map(|index| index + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() as u32;
    (line, column)
}

static ESCAPED_UNICODE: OnceLock<Regex> = OnceLock::new();

fn escaped_unicode() -> &'static Regex {
    ESCAPED_UNICODE.get_or_init(|| {
        Regex::new(r"\\u([0-9a-fA-F]{4})").expect("escaped unicode regex is valid")
    })
}

/// Turn `\uXXXX` escape sequences back into their characters, keeping the
/// sequence verbatim when it does not map to a valid character
fn replace_escaped_unicode(source: &str) -> String {
    escaped_unicode()
        .replace_all(source, |captures: &regex::Captures| {
            u32::from_str_radix(&captures[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| captures[0].to_string())
        })
        .into_owned()
}
