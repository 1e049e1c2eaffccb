//! CLI entrypoint for annotate.
//!
//! Serves a form to a human operator and collects their answers as
//! predictions for a signature.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use annotate_core::{
    FormContext, FormRenderer, InputValues, Question, QuestionState, Signature, TypeValidator,
};
use annotate_runtime::http::render_document;
use annotate_runtime::{AnnotationServer, HttpServer, HumanAnswerer, Predictor, ServerConfig};

#[derive(Parser, Debug)]
#[command(name = "annotate", version, about = "Answer signatures by hand through a web form")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a signature file and print its fields
    Check {
        /// Signature file (.yaml, .yml or .json)
        signature: PathBuf,
    },

    /// Print the HTML form a question would show
    Preview {
        /// Signature file (.yaml, .yml or .json)
        signature: PathBuf,

        /// Input values as a JSON object
        #[arg(long, default_value = "{}")]
        inputs: String,
    },

    /// Serve the form and ask one question per input record
    Run {
        /// Signature file (.yaml, .yml or .json)
        signature: PathBuf,

        /// JSON Lines file, one object of input values per line
        #[arg(long)]
        inputs: PathBuf,

        /// Append annotations here as JSON Lines (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Server config file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Interface to bind
        #[arg(long, env = "ANNOTATE_HOST")]
        host: Option<String>,

        /// Port to listen on
        #[arg(long, env = "ANNOTATE_PORT")]
        port: Option<u16>,
    },
}

/// One answered question, as written to the output.
#[derive(Debug, Serialize)]
struct AnnotationRecord {
    signature: String,
    inputs: InputValues,
    outputs: serde_json::Value,
    annotated_at: DateTime<Utc>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Check { signature } => check(&signature),
        Command::Preview { signature, inputs } => preview(&signature, &inputs),
        Command::Run {
            signature,
            inputs,
            output,
            config,
            host,
            port,
        } => {
            let mut server_config = match config {
                Some(path) => ServerConfig::from_yaml_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => ServerConfig::default(),
            };
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            run(&signature, &inputs, output.as_deref(), &server_config)
        }
    }
}

fn load_signature(path: &Path) -> Result<Signature> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let signature = if is_json {
        Signature::from_json_file(path)
    } else {
        Signature::from_yaml_file(path)
    };
    signature.with_context(|| format!("loading signature {}", path.display()))
}

fn parse_inputs(json: &str) -> Result<InputValues> {
    match serde_json::from_str::<serde_json::Value>(json).context("parsing inputs")? {
        serde_json::Value::Object(map) => Ok(InputValues::from(map)),
        other => bail!("inputs must be a JSON object, got {}", other),
    }
}

fn check(path: &Path) -> Result<()> {
    let signature = load_signature(path)?;

    println!("Signature: {}", signature.name);
    if let Some(instructions) = &signature.instructions {
        println!("  {}", instructions);
    }
    println!("Inputs:");
    for field in &signature.inputs {
        println!("  - {} ({})", field.name, field.field_type.title());
    }
    println!("Outputs:");
    for field in &signature.outputs {
        println!("  - {} ({})", field.name, field.field_type.title());
    }
    Ok(())
}

fn preview(path: &Path, inputs: &str) -> Result<()> {
    let signature = Arc::new(load_signature(path)?);
    let question = Question::new(signature, parse_inputs(inputs)?)?;

    let ctx = FormContext::new(FormRenderer::default(), Arc::new(TypeValidator));
    let page = QuestionState::awaiting(question).render(&ctx);
    print!("{}", render_document(&page));
    Ok(())
}

fn run(
    signature_path: &Path,
    inputs_path: &Path,
    output_path: Option<&Path>,
    config: &ServerConfig,
) -> Result<()> {
    let signature = Arc::new(load_signature(signature_path)?);

    let reader = BufReader::new(
        File::open(inputs_path).with_context(|| format!("opening {}", inputs_path.display()))?,
    );
    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    let form = FormContext::new(
        FormRenderer::new(config.page_title.clone(), "/"),
        Arc::new(TypeValidator),
    );
    let server = Arc::new(AnnotationServer::new(form));
    let handle = HttpServer::start(config, Arc::clone(&server))?;
    eprintln!("Annotation page: {}", handle.url());

    let answerer = HumanAnswerer::new(Arc::clone(&signature), server);
    let mut answered = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("reading inputs")?;
        if line.trim().is_empty() {
            continue;
        }

        let inputs = match parse_inputs(&line) {
            Ok(inputs) => inputs,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping unreadable input record");
                continue;
            }
        };

        let prediction = match answerer.predict(inputs.clone()) {
            Ok(prediction) => prediction,
            Err(e) => {
                warn!(line = index + 1, error = %e, "Skipping incomplete input record");
                continue;
            }
        };

        let record = AnnotationRecord {
            signature: answerer.signature().name.clone(),
            inputs,
            outputs: prediction.to_json(),
            annotated_at: Utc::now(),
        };
        serde_json::to_writer(&mut output, &record)?;
        writeln!(output)?;
        output.flush()?;
        answered += 1;
    }

    info!(answered, "All input records processed");
    handle.stop()?;
    Ok(())
}
