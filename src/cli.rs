//! Command-line interface.
//!
//! `main` parses a [`Cli`] and hands it to [`run`]; everything else lives
//! here so commands can be driven from tests with an in-memory writer.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use crate::bundle::{selector::parse_key_values, Bundle, LabelMatch, Selector};
use crate::config::Config;
use crate::document::render::{render_documents, render_value, OutputFormat};
use crate::document::{accessor, Validator};
use crate::file::loader::{load_bundle_dyn, resolve_sources};

/// BundleQuill - query and validate bundles of YAML manifests
#[derive(Debug, Parser)]
#[command(name = "bundlequill")]
#[command(version)]
#[command(about = "Query, validate and extract data from bundles of YAML manifests", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/bundlequill/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every document matching the selector
    List {
        #[command(flatten)]
        selector: SelectorArgs,
        /// Manifest files or directories ('-' or none for stdin)
        paths: Vec<PathBuf>,
    },
    /// Print exactly one matching document, or a value inside it
    Get {
        #[command(flatten)]
        selector: SelectorArgs,
        /// Pick the Nth (0-based) match instead of requiring exactly one
        #[arg(long)]
        index: Option<usize>,
        /// Key path inside the document, e.g. spec.template.spec.containers[0].image
        #[arg(short, long)]
        path: Option<String>,
        /// Output format: yaml or json
        #[arg(short, long, value_parser = parse_output_format)]
        output: Option<OutputFormat>,
        /// Manifest files or directories ('-' or none for stdin)
        paths: Vec<PathBuf>,
    },
    /// Check every document for required fields and duplicate identities
    Validate {
        /// Report every violation instead of stopping at the first
        #[arg(long)]
        collect: bool,
        /// Manifest files or directories ('-' or none for stdin)
        paths: Vec<PathBuf>,
    },
}

/// Selector criteria shared by the query commands.
#[derive(Debug, Args, Default)]
pub struct SelectorArgs {
    /// API version, `group/version` or `version` for the core group
    #[arg(long, conflicts_with = "group")]
    pub api_version: Option<String>,
    /// API group (empty string for the core group)
    #[arg(long)]
    pub group: Option<String>,
    #[arg(short, long)]
    pub kind: Option<String>,
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(long)]
    pub namespace: Option<String>,
    /// Label criteria, key=value[,key=value...]; may be repeated
    #[arg(short, long = "labels")]
    pub labels: Vec<String>,
    /// Annotation criteria, key=value[,key=value...]; may be repeated
    #[arg(short, long = "annotations")]
    pub annotations: Vec<String>,
    /// Require labels/annotations to match exactly instead of as a subset
    #[arg(long)]
    pub exact: bool,
}

impl SelectorArgs {
    /// Builds a selector; `default_mode` applies unless `--exact` is given.
    pub fn to_selector(&self, default_mode: LabelMatch) -> Result<Selector> {
        let mut selector = Selector::new();
        if let Some(api_version) = &self.api_version {
            let (group, version) = api_version
                .rsplit_once('/')
                .unwrap_or(("", api_version.as_str()));
            selector = selector.group(group).version(version);
        }
        if let Some(group) = &self.group {
            selector = selector.group(group.as_str());
        }
        if let Some(kind) = &self.kind {
            selector = selector.kind(kind.as_str());
        }
        if let Some(name) = &self.name {
            selector = selector.name(name.as_str());
        }
        if let Some(namespace) = &self.namespace {
            selector = selector.namespace(namespace.as_str());
        }
        for labels in &self.labels {
            selector = selector.labels(parse_key_values(labels)?);
        }
        for annotations in &self.annotations {
            selector = selector.annotations(parse_key_values(annotations)?);
        }
        let mode = if self.exact {
            LabelMatch::Exact
        } else {
            default_mode
        };
        Ok(selector.label_match(mode))
    }
}

fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: anyhow::Error| e.to_string())
}

/// Loads the configuration named on the command line, or the default one.
pub fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Runs a parsed command, loading configuration first.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = load_config(&cli)?;
    run_with_config(cli.command, &config, out)
}

/// Runs a command against explicit configuration.
pub fn run_with_config(command: Command, config: &Config, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::List { selector, paths } => {
            let bundle = load(&paths, config)?;
            let selector = selector.to_selector(config.label_match)?;
            debug!(%selector, "listing documents");
            list(&bundle, &selector, out)
        }
        Command::Get {
            selector,
            index,
            path,
            output,
            paths,
        } => {
            let bundle = load(&paths, config)?;
            let mut selector = selector.to_selector(config.label_match)?;
            if let Some(index) = index {
                selector = selector.index(index);
            }
            debug!(%selector, "selecting document");
            get(
                &bundle,
                &selector,
                path.as_deref(),
                output.unwrap_or(config.output),
                out,
            )
        }
        Command::Validate { collect, paths } => {
            let bundle = load(&paths, config)?;
            validate(&bundle, config, collect || !config.fail_fast, out)
        }
    }
}

fn load(paths: &[PathBuf], config: &Config) -> Result<Bundle> {
    let sources = resolve_sources(paths, config.include_gzip)?;
    let bundle = load_bundle_dyn(&sources)?;
    info!(documents = bundle.len(), sources = sources.len(), "loaded bundle");
    Ok(bundle)
}

/// Writes one line per matching document: `apiVersion kind namespace/name`.
pub fn list(bundle: &Bundle, selector: &Selector, out: &mut dyn Write) -> Result<()> {
    for doc in bundle.filter(selector) {
        let location = if doc.namespace().is_empty() {
            doc.name().to_string()
        } else {
            format!("{}/{}", doc.namespace(), doc.name())
        };
        writeln!(out, "{}\t{}\t{}", doc.api_version(), doc.kind(), location)?;
    }
    Ok(())
}

/// Writes the selected document, or the value at `path` inside it.
pub fn get(
    bundle: &Bundle,
    selector: &Selector,
    path: Option<&str>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let doc = bundle.select(selector)?;
    let rendered = match path {
        Some(path) => render_value(accessor::get_path(doc, path)?, format)?,
        None => render_documents([doc], format)?,
    };
    out.write_all(rendered.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}

/// Validates every document and rejects duplicate identities.
///
/// With `collect`, all violations are written before failing; otherwise
/// the first one fails the command.
pub fn validate(bundle: &Bundle, config: &Config, collect: bool, out: &mut dyn Write) -> Result<()> {
    let schema = config.schema()?;
    let validator = Validator::new(&schema);

    let mut problems = Vec::new();
    if collect {
        problems.extend(validator.validate_all(bundle).iter().map(ToString::to_string));
    } else {
        validator.validate_bundle(bundle)?;
    }
    for id in bundle.duplicates() {
        problems.push(format!("duplicate document {}", id));
    }

    for problem in &problems {
        warn!("{}", problem);
        writeln!(out, "error: {}", problem)?;
    }
    if !problems.is_empty() {
        bail!("{} problem(s) found in {} document(s)", problems.len(), bundle.len());
    }

    info!(documents = bundle.len(), "bundle is valid");
    writeln!(out, "{} document(s) valid", bundle.len())?;
    Ok(())
}
