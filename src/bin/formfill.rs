//! CLI binary for formfill.
//!
//! A thin shim over the library crate that drives all six pipeline stages
//! headlessly: flags map to stage inputs, the controller does the rest.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use formfill::gateway::FormApi;
use formfill::stages::export::ExportStage;
use formfill::stages::extraction::{ExtractionStage, ExtractionState};
use formfill::stages::intake::IntakeStage;
use formfill::stages::mapping::FieldMappingStage;
use formfill::stages::review::ReviewStage;
use formfill::stages::selection::FormSelectionStage;
use formfill::{
    DocumentHandle, DocumentType, ExportOutcome, FieldKey, GatewayConfig, HttpGateway,
    PipelineController, Stage,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI definition ───────────────────────────────────────────────────────────

/// Fill a PDF or online form from scanned identity documents.
#[derive(Parser, Debug)]
#[command(name = "formfill", version, about, long_about = None)]
struct Cli {
    /// Identity document scan(s): PDF, JPG or PNG. Repeatable.
    #[arg(long = "doc", value_name = "PATH")]
    docs: Vec<PathBuf>,

    /// Type of the scanned documents: aadhaar, pan, passport,
    /// driving-license, voter-id, or other.
    #[arg(long = "doc-type", value_name = "TYPE")]
    doc_type: Option<DocumentType>,

    /// Fill this sample form from the server catalog (see --list-forms).
    #[arg(long, value_name = "ID", conflicts_with_all = ["form_pdf", "form_url"])]
    sample_form: Option<String>,

    /// Upload this PDF and fill it.
    #[arg(long, value_name = "PATH", conflicts_with = "form_url")]
    form_pdf: Option<PathBuf>,

    /// Auto-fill the online form at this address (never submitted).
    #[arg(long, value_name = "URL")]
    form_url: Option<String>,

    /// Override or supply a field, e.g. --set name="A Sharma". Repeatable.
    /// Keys: name, fatherName, dateOfBirth, gender, address, city, state,
    /// pincode, phone, email, idNumber.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(FieldKey, String)>,

    /// Base URL of the form service API.
    #[arg(long, env = "FORMFILL_API_BASE", default_value = "http://localhost:8000/api")]
    api_base: String,

    /// List the sample-form catalog and exit.
    #[arg(long)]
    list_forms: bool,
}

fn parse_override(s: &str) -> std::result::Result<(FieldKey, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    let key = FieldKey::from_wire(key.trim()).ok_or_else(|| {
        let known: Vec<&str> = FieldKey::ALL.iter().map(|k| k.wire_name()).collect();
        format!("unknown field '{}' (expected one of: {})", key, known.join(", "))
    })?;
    Ok((key, value.to_string()))
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn banner(stage: Stage) {
    println!("\n{} {}", cyan("◆"), bold(stage.title()));
}

fn print_record(pipeline: &PipelineController) {
    let record = pipeline.session().record();
    for key in FieldKey::ALL {
        match record.provided(key) {
            Some(value) => println!("  {:<16} {}", key.label(), value),
            None => println!("  {:<16} {}", key.label(), dim("not provided")),
        }
    }
}

// ── Main ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = GatewayConfig::builder()
        .base_url(cli.api_base.clone())
        .build()
        .context("invalid gateway configuration")?;
    let api = HttpGateway::new(config).context("failed to build HTTP gateway")?;

    if cli.list_forms {
        return list_forms(&api).await;
    }

    if cli.docs.is_empty() {
        bail!("at least one --doc is required (or use --list-forms)");
    }
    let doc_type = cli
        .doc_type
        .ok_or_else(|| anyhow!("--doc-type is required"))?;

    let mut pipeline = PipelineController::new();

    // ── 1. Intake ────────────────────────────────────────────────────────
    banner(Stage::Intake);
    let mut intake = IntakeStage::new();
    for path in &cli.docs {
        let handle = DocumentHandle::from_path(path)
            .with_context(|| format!("cannot read document {}", path.display()))?;
        println!(
            "  {} {} {}",
            green("+"),
            handle.file_name,
            dim(&format!("({} bytes)", handle.byte_size))
        );
        intake.add_document(handle);
    }
    intake.set_document_type(doc_type);
    pipeline.advance(intake.finish()?)?;

    // ── 2. Extraction ────────────────────────────────────────────────────
    banner(Stage::Extraction);
    let mut extraction = ExtractionStage::new();
    let ticket = pipeline.begin_remote()?;
    let bar = spinner("Extracting data from your documents…");
    let result = api.extract(pipeline.session().documents(), doc_type).await;
    bar.finish_and_clear();
    if pipeline.settle_remote(&ticket) {
        extraction.resolve(result);
    }
    if let ExtractionState::Failed { message } = extraction.state() {
        println!("  {} {}", red("✗"), message);
        bail!("extraction failed; re-run to retry the identical request");
    }
    let output = extraction
        .finish()
        .ok_or_else(|| anyhow!("extraction did not settle"))?;
    pipeline.advance(output)?;
    println!(
        "  {} extracted {} of {} fields",
        green("✓"),
        pipeline.session().record().provided_count(),
        FieldKey::ALL.len()
    );

    // ── 3. Form selection ────────────────────────────────────────────────
    banner(Stage::FormSelection);
    let mut selection = FormSelectionStage::new();
    if let Some(id) = &cli.sample_form {
        let ticket = pipeline.begin_remote()?;
        let bar = spinner("Fetching the sample-form catalog…");
        let catalog = api.list_sample_forms().await;
        bar.finish_and_clear();
        if !pipeline.settle_remote(&ticket) {
            bail!("catalog response abandoned");
        }
        let form = catalog?
            .into_iter()
            .find(|f| f.id == *id)
            .ok_or_else(|| anyhow!("no sample form with id '{id}' (try --list-forms)"))?;
        println!("  {} {}", green("✓"), form.name);
        selection.choose_sample(form);
    } else if let Some(pdf) = &cli.form_pdf {
        let ticket = pipeline.begin_remote()?;
        let bar = spinner("Uploading your form…");
        let uploaded = api.upload_form(pdf).await;
        bar.finish_and_clear();
        if !pipeline.settle_remote(&ticket) {
            bail!("upload response abandoned");
        }
        let form_path = uploaded?;
        let name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "form.pdf".to_string());
        println!("  {} uploaded {name}", green("✓"));
        selection.attach_upload(name, form_path);
    } else if let Some(url) = &cli.form_url {
        selection.set_url(url)?;
        println!("  {} online form at {url}", green("✓"));
    } else {
        bail!("choose a form: --sample-form, --form-pdf, or --form-url");
    }
    pipeline.advance(selection.finish()?)?;

    // ── 4. Field mapping ─────────────────────────────────────────────────
    banner(Stage::FieldMapping);
    let mut mapping = FieldMappingStage::new(pipeline.session().record());
    for (key, value) in &cli.overrides {
        println!("  {} {} = {}", yellow("~"), key.wire_name(), value);
        mapping.set_field(*key, value.clone());
    }
    pipeline.advance(mapping.finish())?;

    // ── 5. Review ────────────────────────────────────────────────────────
    banner(Stage::Review);
    let review = ReviewStage::new(pipeline.session().record());
    println!("  {} field(s) ready\n", bold(&review.ready_count().to_string()));
    print_record(&pipeline);
    pipeline.advance(review.finish())?;

    // ── 6. Export ────────────────────────────────────────────────────────
    banner(Stage::Export);
    let descriptor = pipeline
        .session()
        .descriptor()
        .cloned()
        .ok_or_else(|| anyhow!("no form selected"))?;
    let mut export = ExportStage::new();
    let ticket = pipeline.begin_remote()?;
    let bar = spinner(if descriptor.is_url() {
        "Opening a browser and filling the form…"
    } else {
        "Generating your filled PDF…"
    });
    let outcome = export
        .run(&api, &descriptor, pipeline.session().record())
        .await;
    bar.finish_and_clear();
    if !pipeline.settle_remote(&ticket) {
        bail!("export response abandoned");
    }

    match outcome {
        Ok(ExportOutcome::PdfReady { download_url }) => {
            println!("  {} your filled form is ready", green("✓"));
            println!("  {} {download_url}", bold("download:"));
        }
        Ok(ExportOutcome::UrlFilled(report)) => {
            println!(
                "  {} filled {}/{} fields",
                green("✓"),
                report.filled_count,
                report.total_fields
            );
            if !report.failed_fields.is_empty() {
                println!(
                    "  {} could not fill: {}",
                    yellow("!"),
                    report.failed_fields.join(", ")
                );
            }
            println!("  {}", dim(&report.message));
            println!(
                "  {}",
                dim("the browser stays open for review; submit the form manually")
            );
        }
        Err(e) => {
            println!("  {} {}", red("✗"), e);
            bail!("export failed");
        }
    }

    Ok(())
}

async fn list_forms(api: &HttpGateway) -> Result<()> {
    let bar = spinner("Fetching the sample-form catalog…");
    let forms = api.list_sample_forms().await;
    bar.finish_and_clear();

    let forms = forms.context("could not list sample forms")?;
    if forms.is_empty() {
        println!("{}", dim("no sample forms registered on the server"));
        return Ok(());
    }
    println!("{}", bold("Available sample forms:"));
    for form in forms {
        println!("  {:<28} {} {}", form.id, form.name, dim(&form.kind));
    }
    Ok(())
}
