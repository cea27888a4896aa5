//! # Web Page Minification Module
//!
//! Questo modulo minifica le pagine HTML delegando a `minify-html`.
//!
//! ## Responsabilità:
//! - Minificazione con whitespace collassato, commenti rimossi e CSS
//!   inline minificato
//! - Conversione dell'output binario in testo UTF-8
//!
//! `minify-html` è tollerante con il markup malformato: gli errori di
//! parsing non esistono su questo percorso, quindi un input degenerato
//! emerge come output vuoto (promosso a errore dal dispatcher).

use crate::error::RawError;
use minify_html::{minify, Cfg};

/// Minify a web page source, returning the minified text
pub fn minify_page(source: &str) -> Result<String, RawError> {
    let cfg = Cfg {
        minify_css: true,
        keep_comments: false,
        ..Cfg::default()
    };
    let minified = minify(source.as_bytes(), &cfg);
    String::from_utf8(minified).map_err(|error| RawError::new(error.to_string()))
}
