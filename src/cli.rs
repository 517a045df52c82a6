//! Minimal CLI: load a schema, then clarify or check it against each input document.
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde::Serialize;

use schema_clarify::{check, clarify, Clarification, Schema, Value};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// narrow a JSON-encoded schema by observed data or by a more specific schema
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// clarify the schema by every input document and print the narrowed schemas
    Clarify(ClarifyOut),
    /// only report whether each input document could clarify the schema
    Check(CheckOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// schema document (JSON) to narrow
    #[arg(long, short)]
    schema: PathBuf,

    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// read every input document as a schema instead of raw data
    #[arg(long, default_value_t = false)]
    as_schema: bool,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct ClarifyOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json report (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// One input document, labelled by where it came from.
struct Document {
    source: String,
    candidate: Candidate,
}

enum Candidate {
    Value(Value),
    Schema(Schema),
}

#[derive(Serialize)]
struct CheckReport {
    source: String,
    violations: Vec<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_schema(&self) -> anyhow::Result<Schema> {
        let source = std::fs::read_to_string(&self.schema)
            .with_context(|| format!("failed to read schema file {}", self.schema.display()))?;
        crate::path_de::from_str_with_path(&source)
            .with_context(|| format!("failed to parse schema file {}", self.schema.display()))
    }

    fn load_documents(&self) -> anyhow::Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            if self.ndjson {
                let lines = source.lines().enumerate().filter(|(_, line)| !line.trim().is_empty());
                for (index, line) in lines {
                    let label = format!("{source_path_str}:{}", index + 1);
                    let json_value = serde_json::from_str::<serde_json::Value>(line)
                        .with_context(|| format!("failed to parse JSON line ({label})"))?;
                    documents.push(self.document(label, json_value)?);
                }
            } else {
                let json_value = serde_json::from_str::<serde_json::Value>(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                documents.push(self.document(source_path_str, json_value)?);
            }
        }
        tracing::debug!(count = documents.len(), "documents loaded");
        Ok(documents)
    }

    fn document(&self, source: String, json_value: serde_json::Value) -> anyhow::Result<Document> {
        let json_value = match self.json_pointer.as_deref() {
            None => json_value,
            Some(pointer) => json_value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} selects nothing in {source}"))?,
        };
        let candidate = if self.as_schema {
            let schema = crate::path_de::from_value_with_path(json_value)
                .with_context(|| format!("failed to read {source} as a schema"))?;
            Candidate::Schema(schema)
        } else {
            Candidate::Value(Value::from(json_value))
        };
        Ok(Document { source, candidate })
    }
}

impl Candidate {
    fn as_clarification(&self) -> Clarification<'_> {
        match self {
            Candidate::Value(v) => Clarification::Value(v),
            Candidate::Schema(s) => Clarification::Schema(s),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Clarify(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }

                let schema = target.input_settings.load_schema()?;
                let documents = target.input_settings.load_documents()?;
                let results = documents
                    .par_iter()
                    .map(|doc| (doc, clarify(&schema, doc.candidate.as_clarification())))
                    .collect::<Vec<_>>();

                let mut narrowed = Vec::with_capacity(results.len());
                let mut failed = 0usize;
                for (doc, result) in results {
                    match result {
                        Ok(schema) => {
                            eprintln!("{} {}", "✓".green(), doc.source);
                            narrowed.push(schema);
                        }
                        Err(error) => {
                            eprintln!("{} {}: {}", "✗".red(), doc.source, error.to_string().red());
                            failed += 1;
                        }
                    }
                }

                let schema_src = match narrowed.as_slice() {
                    [single] if failed == 0 => serde_json::to_string_pretty(single)?,
                    many => serde_json::to_string_pretty(many)?,
                };
                write_output(target.out.as_deref(), &schema_src)?;
                if failed > 0 {
                    bail!("{failed} of {} documents could not clarify the schema", documents.len());
                }
                Ok(())
            }
            Command::Check(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }

                let schema = target.input_settings.load_schema()?;
                let documents = target.input_settings.load_documents()?;
                let reports = documents
                    .par_iter()
                    .map(|doc| {
                        let violations = match check(&schema, doc.candidate.as_clarification()) {
                            Ok(()) => Vec::new(),
                            Err(violations) => violations.iter().map(ToString::to_string).collect(),
                        };
                        CheckReport { source: doc.source.clone(), violations }
                    })
                    .collect::<Vec<_>>();

                for report in &reports {
                    if report.violations.is_empty() {
                        eprintln!("{} {}", "✓".green(), report.source);
                    } else {
                        eprintln!("{} {}", "✗".red(), report.source);
                        for violation in &report.violations {
                            eprintln!("    {}", violation.yellow());
                        }
                    }
                }
                write_output(target.out.as_deref(), &serde_json::to_string_pretty(&reports)?)?;
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, src: &str) -> anyhow::Result<()> {
    let Some(out) = out else {
        println!("{src}");
        return Ok(())
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

// ---- Tests ---- //
