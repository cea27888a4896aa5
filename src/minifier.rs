//! # Minification Dispatch Module
//!
//! Questo modulo seleziona il minificatore appropriato per ogni item e ne
//! delimita gli errori.
//!
//! ## Selezione del tipo di contenuto:
//! - Estensione `.css` (case-insensitive) oppure `language == "css"` →
//!   foglio di stile
//! - Estensione `.htm`/`.html` (case-insensitive) oppure
//!   `language == "html"` → pagina web
//! - Altrimenti → script (fallback)
//!
//! Estensione e override sono trigger indipendenti con semantica OR:
//! ciascuna condizione da sola seleziona il tipo.
//!
//! ## Garanzie:
//! - Nessuna eccezione dei delegate supera questo confine: ogni fallimento
//!   torna come valore `RawError`
//! - Un output minificato di zero byte viene promosso a errore, perché un
//!   input non banale che minifica a vuoto indica una trasformazione
//!   fallita, non contenuto legittimo

use crate::config::SourceTypeHint;
use crate::error::RawError;
use crate::page_minifier::minify_page;
use crate::script_minifier::BackendHandle;
use crate::stylesheet_minifier::minify_stylesheet;
use tracing::debug;

/// Structural category governing which minifier is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Script,
    Stylesheet,
    Page,
}

/// Decide the content type from the item label and the language override
pub fn detect_content_type(file: &str, language: Option<&str>) -> ContentType {
    let normalized = file.to_lowercase();
    if normalized.ends_with(".css") || language == Some("css") {
        ContentType::Stylesheet
    } else if normalized.ends_with(".html") || normalized.ends_with(".htm") || language == Some("html")
    {
        ContentType::Page
    } else {
        ContentType::Script
    }
}

/// Minify one item's source, returning the minified bytes.
///
/// Never panics and never propagates a raw delegate failure; the caller
/// receives either a non-empty buffer or a classifiable [`RawError`].
pub async fn minify_by_type(
    file: &str,
    language: Option<&str>,
    source: &str,
    source_type: Option<SourceTypeHint>,
    backend: &mut BackendHandle,
) -> Result<Vec<u8>, RawError> {
    let content_type = detect_content_type(file, language);
    debug!("Minifying {} as {:?}", file, content_type);

    let minified = match content_type {
        ContentType::Stylesheet => minify_stylesheet(source)?,
        ContentType::Page => minify_page(source)?,
        ContentType::Script => backend.minify(source, source_type).await?,
    };

    let buffer = minified.into_bytes();
    if buffer.is_empty() {
        return Err(RawError::new("Unknown minification error"));
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_stylesheets_by_extension_or_override() {
        assert_eq!(detect_content_type("style.css", None), ContentType::Stylesheet);
        assert_eq!(detect_content_type("STYLE.CSS", None), ContentType::Stylesheet);
        assert_eq!(
            detect_content_type("source1", Some("css")),
            ContentType::Stylesheet
        );
        // Either trigger alone selects the type
        assert_eq!(
            detect_content_type("style.css", Some("html")),
            ContentType::Stylesheet
        );
    }

    #[test]
    fn test_detects_pages_by_extension_or_override() {
        assert_eq!(detect_content_type("index.html", None), ContentType::Page);
        assert_eq!(detect_content_type("index.HTM", None), ContentType::Page);
        assert_eq!(detect_content_type("source1", Some("html")), ContentType::Page);
    }

    #[test]
    fn test_falls_back_to_script() {
        assert_eq!(detect_content_type("index.js", None), ContentType::Script);
        assert_eq!(detect_content_type("stream1", None), ContentType::Script);
        assert_eq!(detect_content_type("stream1", Some("js")), ContentType::Script);
    }

    #[tokio::test]
    async fn test_empty_output_is_promoted_to_an_error() {
        let mut backend = BackendHandle::new("oxc");
        let error = minify_by_type("source1", Some("css"), "", None, &mut backend)
            .await
            .unwrap_err();
        assert_eq!(error.message, "Unknown minification error");
    }

    #[tokio::test]
    async fn test_dispatches_scripts_to_the_backend() {
        let mut backend = BackendHandle::new("oxc");
        let buffer = minify_by_type(
            "source1",
            None,
            "function test () { console.log(\"OK\") }",
            None,
            &mut backend,
        )
        .await
        .unwrap();
        assert!(!buffer.is_empty());
    }
}
