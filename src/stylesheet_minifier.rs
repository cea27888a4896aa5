//! # Stylesheet Minification Module
//!
//! Questo modulo minifica i fogli di stile delegando a `lightningcss`.
//!
//! ## Responsabilità:
//! - Parsing del CSS con recovery disabilitato (input malformato = errore)
//! - Ottimizzazione e stampa minificata del foglio di stile
//! - Conversione degli errori del parser nella forma grezza uniforme,
//!   preservando la posizione strutturata (riga/colonna) quando presente
//!
//! Il parser riporta le righe 0-indicizzate e le colonne 1-indicizzate;
//! qui vengono riportate alla convenzione interna (riga 1-indicizzata,
//! colonna grezza 0-indicizzata) prima della normalizzazione.

use crate::error::RawError;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

/// Minify a stylesheet source, returning the minified text
pub fn minify_stylesheet(source: &str) -> Result<String, RawError> {
    let mut stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|error| located_error(error.kind.to_string(), &error.loc))?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|error| located_error(error.kind.to_string(), &error.loc))?;

    let output = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|error| located_error(error.kind.to_string(), &error.loc))?;

    Ok(output.code)
}

fn located_error(
    message: String,
    location: &Option<lightningcss::error::ErrorLocation>,
) -> RawError {
    match location {
        Some(location) => RawError::located(
            message,
            location.line + 1,
            location.column.saturating_sub(1),
        ),
        None => RawError::new(message),
    }
}
