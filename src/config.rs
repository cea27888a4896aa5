//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione della stima delle
//! dimensioni.
//!
//! ## Responsabilità:
//! - Definisce la struct `Options` con tutti i parametri di un batch
//! - Fornisce validazione dei parametri prima dell'avvio
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `language`: override del linguaggio di input ("js", "css", "html")
//! - `minifier`: backend JavaScript ("oxc", "esbuild", "terser", default: "oxc")
//! - `source_type`: classificazione forzata dei sorgenti JS (module/script)
//! - `gzip`: stima gzip (on/off oppure opzioni esplicite del compressore)
//! - `brotli`: stima brotli (on/off oppure opzioni esplicite del compressore)
//!
//! ## Validazione:
//! - Controlla che `language` sia uno fra "js", "css" e "html"
//! - Controlla che `minifier` non sia vuoto
//!
//! Un identificatore di minificatore sconosciuto non è un errore di
//! validazione: deve emergere come errore per-item, senza interrompere il
//! batch.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Forced classification of JavaScript sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTypeHint {
    Module,
    Script,
}

impl FromStr for SourceTypeHint {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "module" => Ok(Self::Module),
            "script" => Ok(Self::Script),
            other => Err(format!("Invalid source type: \"{}\".", other)),
        }
    }
}

/// Options passed through to the gzip compressor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GzipOptions {
    /// Compression level (0-9)
    pub level: u32,
}

impl Default for GzipOptions {
    fn default() -> Self {
        // Maximum compression ratio mirrors what bundler size checks assume
        Self { level: 9 }
    }
}

/// Options merged over the brotli compressor defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrotliOptions {
    /// Compression quality (0-11, None keeps the engine default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<i32>,
    /// Window size as a power of two (10-24, None keeps the engine default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<i32>,
}

/// Gzip estimation channel setting: a plain on/off switch or explicit
/// compressor options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GzipEstimate {
    Enabled(bool),
    Options(GzipOptions),
}

impl Default for GzipEstimate {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl GzipEstimate {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Enabled(false))
    }

    /// The effective compressor options when the channel is enabled
    pub fn effective_options(&self) -> GzipOptions {
        match self {
            Self::Options(options) => options.clone(),
            Self::Enabled(_) => GzipOptions::default(),
        }
    }
}

/// Brotli estimation channel setting, same shape as [`GzipEstimate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BrotliEstimate {
    Enabled(bool),
    Options(BrotliOptions),
}

impl Default for BrotliEstimate {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl BrotliEstimate {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Enabled(false))
    }

    pub fn effective_options(&self) -> BrotliOptions {
        match self {
            Self::Options(options) => options.clone(),
            Self::Enabled(_) => BrotliOptions::default(),
        }
    }
}

/// Configuration for one size estimation batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Options {
    /// Input language override ("js", "css" or "html")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// JavaScript minifier backend identifier
    pub minifier: String,
    /// Forced JavaScript source classification (None = unambiguous)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceTypeHint>,
    /// Gzipped size estimation channel
    #[serde(default)]
    pub gzip: GzipEstimate,
    /// Brotlied size estimation channel
    #[serde(default)]
    pub brotli: BrotliEstimate,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            language: None,
            minifier: "oxc".to_string(),
            source_type: None,
            gzip: GzipEstimate::default(),
            brotli: BrotliEstimate::default(),
        }
    }
}

impl Options {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(ref language) = self.language {
            if !matches!(language.as_str(), "js" | "css" | "html") {
                return Err(anyhow::anyhow!(
                    "Language must be one of \"js\", \"css\" or \"html\""
                ));
            }
        }

        if self.minifier.is_empty() {
            return Err(anyhow::anyhow!("Minifier identifier must not be empty"));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let options: Options = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_options_default() {
        let options = Options::default();
        assert_eq!(options.minifier, "oxc");
        assert_eq!(options.language, None);
        assert_eq!(options.source_type, None);
        assert!(options.gzip.is_enabled());
        assert!(options.brotli.is_enabled());
    }

    #[test]
    fn test_options_validation() {
        let mut options = Options::default();
        assert!(options.validate().is_ok());

        options.language = Some("css".to_string());
        assert!(options.validate().is_ok());

        options.language = Some("python".to_string());
        assert!(options.validate().is_err());

        options.language = None;
        options.minifier = String::new();
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_channel_settings() {
        assert!(GzipEstimate::Enabled(true).is_enabled());
        assert!(!GzipEstimate::Enabled(false).is_enabled());
        assert!(GzipEstimate::Options(GzipOptions { level: 6 }).is_enabled());
        assert_eq!(
            GzipEstimate::Options(GzipOptions { level: 6 }).effective_options(),
            GzipOptions { level: 6 }
        );
        assert_eq!(
            GzipEstimate::Enabled(true).effective_options(),
            GzipOptions { level: 9 }
        );

        let custom = BrotliEstimate::Options(BrotliOptions {
            quality: Some(5),
            window: None,
        });
        assert!(custom.is_enabled());
        assert_eq!(custom.effective_options().quality, Some(5));
        assert_eq!(
            BrotliEstimate::Enabled(true).effective_options(),
            BrotliOptions::default()
        );
    }

    #[test]
    fn test_source_type_parsing() {
        assert_eq!("module".parse(), Ok(SourceTypeHint::Module));
        assert_eq!("script".parse(), Ok(SourceTypeHint::Script));
        assert!("dummy".parse::<SourceTypeHint>().is_err());
    }

    #[tokio::test]
    async fn test_options_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let options_path = temp_dir.path().join("options.json");

        let original_options = Options {
            language: Some("css".to_string()),
            minifier: "esbuild".to_string(),
            source_type: Some(SourceTypeHint::Module),
            gzip: GzipEstimate::Options(GzipOptions { level: 6 }),
            brotli: BrotliEstimate::Enabled(false),
        };

        // Save options
        original_options.save_to_file(&options_path).await.unwrap();

        // Load options
        let loaded_options = Options::from_file(&options_path).await.unwrap();

        assert_eq!(loaded_options.language.as_deref(), Some("css"));
        assert_eq!(loaded_options.minifier, "esbuild");
        assert_eq!(loaded_options.source_type, Some(SourceTypeHint::Module));
        assert_eq!(
            loaded_options.gzip,
            GzipEstimate::Options(GzipOptions { level: 6 })
        );
        assert!(!loaded_options.brotli.is_enabled());
    }
}
