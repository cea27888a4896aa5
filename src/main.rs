//! # Minified Size - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione delle opzioni e avvio della pipeline
//! - Rendering dei risultati (testo colorato oppure JSON)
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (pattern, language, minifier, flag di colonna)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Senza pattern, legge la sorgente da stdin quando invocato con `--`
//! 4. Consuma la pipeline in modo lazy e stampa una riga per risultato
//! 5. Con più di un risultato, aggiunge la riga dei totali
//!
//! ## Esempio di utilizzo:
//! ```bash
//! minified-size "dist/**/*.js" --minifier esbuild --verbose
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser};
use futures::StreamExt;

use minified_size::report::{render_report, render_total, ColumnSelection};
use minified_size::{
    compute_total_sizes, estimate_sizes, generate_sizes, BrotliEstimate, GzipEstimate, Options,
    SizeRequest, SourceTypeHint,
};

#[derive(Parser)]
#[command(name = "minified-size")]
#[command(about = "Estimate minified and compressed sizes of scripts, stylesheets and pages")]
struct Args {
    /// File paths or glob patterns ("-- " alone reads from stdin)
    files: Vec<String>,

    /// Input language override (js, css or html)
    #[arg(short, long)]
    language: Option<String>,

    /// JavaScript minifier backend (oxc, esbuild or terser)
    #[arg(short = 'i', long, default_value = "oxc")]
    minifier: String,

    /// Force JavaScript source classification (module or script)
    #[arg(short, long)]
    source_type: Option<SourceTypeHint>,

    /// Print results as a JSON array instead of text
    #[arg(short, long)]
    json: bool,

    /// Print sizes in bytes without unit formatting
    #[arg(short, long)]
    raw_sizes: bool,

    /// Hide the original size column
    #[arg(short = 'o', long = "no-original-size")]
    no_original_size: bool,

    /// Hide the minified size column
    #[arg(short = 'm', long = "no-minified-size")]
    no_minified_size: bool,

    /// Skip gzip estimation and hide its column
    #[arg(short = 'g', long = "no-gzipped-size")]
    no_gzipped_size: bool,

    /// Skip brotli estimation and hide its column
    #[arg(short = 'b', long = "no-brotlied-size")]
    no_brotlied_size: bool,

    /// Do not print the total row
    #[arg(short = 't', long = "no-total")]
    no_total: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Options {
        Options {
            language: self.language.clone(),
            minifier: self.minifier.clone(),
            source_type: self.source_type,
            gzip: GzipEstimate::Enabled(!self.no_gzipped_size),
            brotli: BrotliEstimate::Enabled(!self.no_brotlied_size),
        }
    }

    fn columns(&self) -> ColumnSelection {
        ColumnSelection {
            original: !self.no_original_size,
            minified: !self.no_minified_size,
            gzipped: !self.no_gzipped_size,
            brotlied: !self.no_brotlied_size,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut request = SizeRequest {
        files: args.files.clone(),
        options: args.options(),
        ..SizeRequest::default()
    };

    if request.files.is_empty() {
        // A bare "--" means the source arrives on stdin
        if std::env::args_os().any(|arg| arg == "--") {
            request.streams = vec![Box::new(tokio::io::stdin())];
        } else {
            Args::command().print_help()?;
            return Ok(());
        }
    }

    if args.json {
        print_json(request, args.no_total).await
    } else {
        print_text(request, &args).await
    }
}

async fn print_json(request: SizeRequest, no_total: bool) -> Result<()> {
    let results = estimate_sizes(request).await?;
    println!("{}", render_json(&results, no_total)?);
    Ok(())
}

fn render_json(results: &[minified_size::SizeReport], no_total: bool) -> Result<String> {
    let mut rows: Vec<serde_json::Value> = results
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()?;
    if results.len() > 1 && !no_total {
        rows.push(serde_json::to_value(compute_total_sizes(results))?);
    }

    Ok(serde_json::to_string_pretty(&rows)?)
}

async fn print_text(request: SizeRequest, args: &Args) -> Result<()> {
    let columns = args.columns();
    let mut reports = Box::pin(generate_sizes(request)?);

    let mut seen = Vec::new();
    while let Some(report) = reports.next().await {
        println!("{}", render_report(&report, &columns, args.raw_sizes));
        seen.push(report);
    }

    if seen.len() > 1 && !args.no_total {
        let total = compute_total_sizes(&seen);
        println!("{}", render_total(&total, &columns, args.raw_sizes));
    }

    Ok(())
}
