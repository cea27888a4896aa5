//! # Input Resolution Module
//!
//! Questo modulo unifica le tre modalità di input in un'unica sequenza
//! ordinata di item grezzi.
//!
//! ## Responsabilità:
//! - Espansione dei pattern glob nell'ordine in cui sono forniti
//! - Lettura completa dei file risolti (dimensione = byte su disco)
//! - Drenaggio degli stream asincroni fino al completamento
//! - Wrapping sincrono delle sorgenti in memoria
//! - Etichettatura degli item: percorso risolto, `stream<N>`, `source<N>`
//!
//! ## Ordinamento:
//! Tutti i pattern vengono risolti prima degli stream, gli stream prima
//! delle sorgenti. Dentro un singolo pattern l'ordine di enumerazione del
//! filesystem è preservato.
//!
//! ## Gestione errori:
//! - Pattern senza corrispondenze: un item con errore "File not found.",
//!   etichettato con il testo originale del pattern
//! - Espansione fallita: un item con l'errore grezzo, stessa etichetta
//! - Lettura file o stream fallita: un item con l'errore grezzo
//! - Nessun input in assoluto: `SizeError::InputMissing`, l'unica
//!   condizione fatale per l'intero batch

use crate::error::{RawError, SizeError};
use std::collections::VecDeque;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Readable text stream accepted as one input item
pub type InputStream = Box<dyn AsyncRead + Send + Unpin>;

/// One unit of input after resolution, before it is loaded
pub enum PendingInput {
    /// A concrete file path produced by pattern expansion
    File { file: String },
    /// A resolution failure already known before loading
    Failed { file: String, error: RawError },
    /// An open byte stream, consumed exactly once
    Stream { file: String, stream: InputStream },
    /// An in-memory source string
    Source { file: String, source: String },
}

impl PendingInput {
    /// The label this item will carry through the pipeline
    pub fn file(&self) -> &str {
        match self {
            Self::File { file }
            | Self::Failed { file, .. }
            | Self::Stream { file, .. }
            | Self::Source { file, .. } => file,
        }
    }
}

/// The unified item shape handed to the minification dispatcher.
/// Exactly one of `source` and `error` is set.
#[derive(Debug, Clone)]
pub struct RawInput {
    pub file: String,
    pub source: Option<String>,
    pub size: Option<u64>,
    pub error: Option<RawError>,
}

impl RawInput {
    fn loaded(file: String, source: String, size: u64) -> Self {
        Self {
            file,
            source: Some(source),
            size: Some(size),
            error: None,
        }
    }

    fn failed(file: String, error: RawError) -> Self {
        Self {
            file,
            source: None,
            size: None,
            error: Some(error),
        }
    }
}

/// Expand one glob pattern into pending items.
///
/// Zero matches yield a single "File not found." item labeled with the
/// original pattern text; an unreadable match yields an item carrying the
/// enumeration error.
fn expand_pattern(pattern: &str) -> Vec<PendingInput> {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(error) => {
            return vec![PendingInput::Failed {
                file: pattern.to_string(),
                error: RawError::new(error.to_string()),
            }]
        }
    };

    let mut items = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => items.push(PendingInput::File {
                file: path.display().to_string(),
            }),
            Err(error) => items.push(PendingInput::Failed {
                file: pattern.to_string(),
                error: RawError::new(error.to_string()),
            }),
        }
    }

    if items.is_empty() {
        items.push(PendingInput::Failed {
            file: pattern.to_string(),
            error: RawError::new("File not found."),
        });
    }
    items
}

/// Resolve all caller-supplied inputs into one ordered queue.
///
/// Fails with [`SizeError::InputMissing`] when patterns, streams and
/// sources are all empty; every other failure is carried per-item.
pub fn prepare_input(
    files: &[String],
    streams: Vec<InputStream>,
    sources: &[String],
) -> Result<VecDeque<PendingInput>, SizeError> {
    let mut pending = VecDeque::new();

    for pattern in files {
        let items = expand_pattern(pattern);
        debug!("Pattern {} resolved to {} item(s)", pattern, items.len());
        pending.extend(items);
    }

    for (index, stream) in streams.into_iter().enumerate() {
        pending.push_back(PendingInput::Stream {
            file: format!("stream{}", index + 1),
            stream,
        });
    }

    for (index, source) in sources.iter().enumerate() {
        pending.push_back(PendingInput::Source {
            file: format!("source{}", index + 1),
            source: source.clone(),
        });
    }

    if pending.is_empty() {
        return Err(SizeError::InputMissing);
    }

    debug!("Prepared {} input item(s)", pending.len());
    Ok(pending)
}

/// Load one pending item into the unified shape, performing the file read
/// or stream drain it still needs. Never fails; failures become the item's
/// error.
pub async fn load_input(pending: PendingInput) -> RawInput {
    match pending {
        PendingInput::File { file } => match tokio::fs::read(&file).await {
            Ok(bytes) => {
                let size = bytes.len() as u64;
                let source = String::from_utf8_lossy(&bytes).into_owned();
                RawInput::loaded(file, source, size)
            }
            Err(error) => RawInput::failed(file, RawError::from(error)),
        },
        PendingInput::Failed { file, error } => RawInput::failed(file, error),
        PendingInput::Stream { file, mut stream } => {
            let mut bytes = Vec::new();
            match stream.read_to_end(&mut bytes).await {
                Ok(_) => {
                    let source = String::from_utf8_lossy(&bytes).into_owned();
                    let size = source.len() as u64;
                    RawInput::loaded(file, source, size)
                }
                Err(error) => RawInput::failed(file, RawError::from(error)),
            }
        }
        PendingInput::Source { file, source } => {
            let size = source.len() as u64;
            RawInput::loaded(file, source, size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_missing_input_is_fatal() {
        let result = prepare_input(&[], Vec::new(), &[]);
        assert!(matches!(result, Err(SizeError::InputMissing)));
    }

    #[test]
    fn test_sources_are_labeled_by_ordinal() {
        let sources = vec!["var a = 1".to_string(), "var b = 2".to_string()];
        let pending = prepare_input(&[], Vec::new(), &sources).unwrap();
        let labels: Vec<_> = pending.iter().map(|item| item.file().to_string()).collect();
        assert_eq!(labels, vec!["source1", "source2"]);
    }

    #[test]
    fn test_patterns_come_before_streams_and_sources() {
        let temp_dir = TempDir::new().unwrap();
        let script = temp_dir.path().join("a.js");
        std::fs::write(&script, "var a = 1").unwrap();

        let pattern = script.display().to_string();
        let streams: Vec<InputStream> = vec![Box::new(tokio_test::io::Builder::new().build())];
        let sources = vec!["var b = 2".to_string()];
        let pending = prepare_input(&[pattern.clone()], streams, &sources).unwrap();

        let labels: Vec<_> = pending.iter().map(|item| item.file().to_string()).collect();
        assert_eq!(labels, vec![pattern, "stream1".to_string(), "source1".to_string()]);
    }

    #[test]
    fn test_unmatched_pattern_reports_file_not_found() {
        let pending = prepare_input(&["missing/*.js".to_string()], Vec::new(), &[]).unwrap();
        assert_eq!(pending.len(), 1);
        match &pending[0] {
            PendingInput::Failed { file, error } => {
                assert_eq!(file, "missing/*.js");
                assert_eq!(error.message, "File not found.");
            }
            _ => panic!("expected a failed item"),
        }
    }

    #[test]
    fn test_invalid_pattern_reports_raw_error() {
        let pending = prepare_input(&["lib/***.js".to_string()], Vec::new(), &[]).unwrap();
        assert_eq!(pending.len(), 1);
        match &pending[0] {
            PendingInput::Failed { file, error } => {
                assert_eq!(file, "lib/***.js");
                assert_ne!(error.message, "File not found.");
            }
            _ => panic!("expected a failed item"),
        }
    }

    #[tokio::test]
    async fn test_file_is_loaded_with_byte_size() {
        let temp_dir = TempDir::new().unwrap();
        let script = temp_dir.path().join("index.js");
        std::fs::write(&script, "var answer = 42").unwrap();

        let pattern = temp_dir.path().join("*.js").display().to_string();
        let mut pending = prepare_input(&[pattern], Vec::new(), &[]).unwrap();
        let input = load_input(pending.pop_front().unwrap()).await;

        assert_eq!(input.file, script.display().to_string());
        assert_eq!(input.source.as_deref(), Some("var answer = 42"));
        assert_eq!(input.size, Some(15));
        assert!(input.error.is_none());
    }

    #[tokio::test]
    async fn test_unreadable_file_reports_error() {
        let pending = PendingInput::File {
            file: "lib/missing.js".to_string(),
        };
        let input = load_input(pending).await;
        assert_eq!(input.file, "lib/missing.js");
        assert!(input.source.is_none());
        assert!(input.error.is_some());
    }

    #[tokio::test]
    async fn test_stream_is_drained_in_order() {
        let mock = tokio_test::io::Builder::new()
            .read(b"function test () ")
            .read(b"{ console.log(\"OK\") }")
            .build();
        let input = load_input(PendingInput::Stream {
            file: "stream1".to_string(),
            stream: Box::new(mock),
        })
        .await;
        assert_eq!(
            input.source.as_deref(),
            Some("function test () { console.log(\"OK\") }")
        );
        assert_eq!(input.size, Some(39));
        assert!(input.error.is_none());
    }

    #[tokio::test]
    async fn test_stream_error_is_reported() {
        let mock = tokio_test::io::Builder::new()
            .read_error(std::io::Error::new(ErrorKind::Other, "Nothing to read."))
            .build();
        let input = load_input(PendingInput::Stream {
            file: "stream1".to_string(),
            stream: Box::new(mock),
        })
        .await;
        assert!(input.source.is_none());
        let error = input.error.unwrap();
        assert!(error.message.contains("Nothing to read."));
    }
}
