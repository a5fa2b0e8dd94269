//! Rendering data trees back to text.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::manifest::Document;
use super::value::Value;

/// Text format for rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            other => anyhow::bail!("Unknown output format '{}', expected yaml or json", other),
        }
    }
}

/// Renders a single value.
///
/// Scalars in YAML output are written bare, without the `---` header.
pub fn render_value(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to render YAML"),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Renders documents as a YAML stream or a JSON array.
pub fn render_documents<'a>(
    docs: impl IntoIterator<Item = &'a Document>,
    format: OutputFormat,
) -> Result<String> {
    let docs: Vec<&Document> = docs.into_iter().collect();
    match format {
        OutputFormat::Yaml => {
            let mut out = String::new();
            for doc in docs {
                out.push_str("---\n");
                out.push_str(&render_value(doc.data(), OutputFormat::Yaml)?);
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let data: Vec<&Value> = docs.iter().map(|doc| doc.data()).collect();
            let mut out = serde_json::to_string_pretty(&data).context("Failed to render JSON")?;
            out.push('\n');
            Ok(out)
        }
    }
}
