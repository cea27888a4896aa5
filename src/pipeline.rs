//! # Pipeline Orchestration Module
//!
//! Questo è il modulo principale che orchestra la stima delle dimensioni.
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: Controlla le opzioni del batch
//! 2. **Risoluzione input**: Pattern → stream → sorgenti, in ordine
//! 3. **Per ogni item**: Caricamento → minificazione → compressione
//! 4. **Emissione**: Un `SizeReport` per item, nell'ordine di risoluzione
//!
//! ## Modalità di consumo:
//! - `estimate_sizes`: materializza tutti i report in un `Vec`
//! - `generate_sizes`: sequenza lazy (`Stream`), un report alla volta,
//!   al ritmo del consumer; fermarsi dopo un prefisso non calcola il resto
//!
//! Entrambe le modalità condividono lo stesso generatore: la pipeline non
//! è duplicata.
//!
//! ## Gestione concorrenza:
//! - Gli item sono processati strettamente in sequenza, uno alla volta:
//!   l'item i+1 non inizia finché il risultato dell'item i non è completo
//! - Dentro un singolo item i due canali di compressione corrono in
//!   parallelo (sono funzioni pure dello stesso buffer)
//!
//! ## Ciclo di vita del backend:
//! Il handle del backend di minificazione è posseduto dallo stato del
//! batch: viene avviato pigramente prima del primo dispatch di uno script
//! e rilasciato quando lo stato viene droppato, anche se la sequenza lazy
//! viene abbandonata in anticipo.
//!
//! ## Gestione errori:
//! - Errori per singoli item non bloccano il batch
//! - L'unica condizione fatale è l'assenza totale di input

use crate::compression::estimate_compressed_sizes;
use crate::config::Options;
use crate::error::{normalize_error, SizeError};
use crate::input::{self, InputStream, PendingInput, RawInput};
use crate::minifier::minify_by_type;
use crate::report::SizeReport;
use crate::script_minifier::BackendHandle;
use futures::stream::{self, Stream};
use futures::StreamExt;
use std::collections::VecDeque;
use tracing::debug;

/// One size estimation batch: inputs plus configuration
#[derive(Default)]
pub struct SizeRequest {
    /// File paths, possibly containing glob wildcards
    pub files: Vec<String>,
    /// Open readable streams, consumed exactly once each
    pub streams: Vec<InputStream>,
    /// In-memory source strings
    pub sources: Vec<String>,
    /// Batch configuration
    pub options: Options,
}

struct PipelineState {
    pending: VecDeque<PendingInput>,
    backend: BackendHandle,
    options: Options,
}

async fn estimate_item(
    input: RawInput,
    options: &Options,
    backend: &mut BackendHandle,
) -> SizeReport {
    let RawInput {
        file,
        source,
        size,
        error,
    } = input;

    if let Some(error) = error {
        return SizeReport::failed(file, normalize_error(&error));
    }
    let source = source.unwrap_or_default();

    let buffer = match minify_by_type(
        &file,
        options.language.as_deref(),
        &source,
        options.source_type,
        backend,
    )
    .await
    {
        Ok(buffer) => buffer,
        Err(error) => return SizeReport::failed(file, normalize_error(&error)),
    };
    let minified_size = buffer.len() as u64;

    let compressed =
        match estimate_compressed_sizes(&buffer, &options.gzip, &options.brotli).await {
            Ok(compressed) => compressed,
            Err(error) => return SizeReport::failed(file, normalize_error(&error)),
        };

    SizeReport {
        file,
        original_size: size,
        minified_size: Some(minified_size),
        gzipped_size: compressed.gzipped_size,
        brotlied_size: compressed.brotlied_size,
        error: None,
    }
}

/// Produce the size reports lazily, one item at a time.
///
/// The returned stream yields reports in input-resolution order; a report
/// is only computed when the consumer asks for it, so stopping after any
/// prefix leaves the remaining items untouched.
pub fn generate_sizes(
    request: SizeRequest,
) -> Result<impl Stream<Item = SizeReport>, SizeError> {
    let SizeRequest {
        files,
        streams,
        sources,
        options,
    } = request;

    options
        .validate()
        .map_err(|error| SizeError::Validation(error.to_string()))?;

    let pending = input::prepare_input(&files, streams, &sources)?;
    let backend = BackendHandle::new(&options.minifier);
    let state = PipelineState {
        pending,
        backend,
        options,
    };

    Ok(stream::unfold(state, |mut state| async move {
        let next = state.pending.pop_front()?;
        debug!("Processing {}", next.file());
        let input = input::load_input(next).await;
        let report = estimate_item(input, &state.options, &mut state.backend).await;
        Some((report, state))
    }))
}

/// Produce all size reports eagerly, fully materialized
pub async fn estimate_sizes(request: SizeRequest) -> Result<Vec<SizeReport>, SizeError> {
    let reports = generate_sizes(request)?;
    Ok(reports.collect().await)
}
