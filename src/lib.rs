//! # Minified Size Estimator
//!
//! Libreria per stimare quanto pesano script, fogli di stile e pagine
//! HTML dopo minificazione e compressione.
//!
//! ## Architettura del sistema:
//!
//! ```text
//! SizeRequest (file/stream/sorgenti + Options)
//!     ↓
//! pipeline (risoluzione input → minificazione → compressione)
//!     ↓
//! SizeReport (original/minified/gzipped/brotlied oppure errore)
//! ```
//!
//! ## Moduli principali:
//! - `pipeline`: Orchestrazione del batch, consumo eager e lazy
//! - `input`: Espansione dei pattern e caricamento di file/stream/sorgenti
//! - `minifier`: Classificazione del contenuto e dispatch della minificazione
//! - `script_minifier`: Backend JavaScript (oxc integrato, esbuild/terser esterni)
//! - `stylesheet_minifier`: Minificazione CSS
//! - `page_minifier`: Minificazione HTML
//! - `compression`: Stima delle dimensioni gzip e brotli
//! - `report`: Modelli di output, totali e rendering testuale
//! - `error`: Normalizzazione degli errori in forma strutturata
//! - `config`: Opzioni del batch e loro validazione

pub mod compression;
pub mod config;
pub mod error;
pub mod input;
pub mod minifier;
pub mod page_minifier;
pub mod pipeline;
pub mod report;
pub mod script_minifier;
pub mod stylesheet_minifier;

pub use config::{
    BrotliEstimate, BrotliOptions, GzipEstimate, GzipOptions, Options, SourceTypeHint,
};
pub use error::{normalize_error, NormalizedError, RawError, SizeError};
pub use input::InputStream;
pub use pipeline::{estimate_sizes, generate_sizes, SizeRequest};
pub use report::{compute_total_sizes, ColumnSelection, SizeReport, TotalReport};
