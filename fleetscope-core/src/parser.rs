//! Boundary to the pattern-template parser.
//!
//! The parser turns one command's raw text into field maps. It is an
//! external component; [`ExternalCommandParser`] drives it as a child
//! process and tests substitute their own [`CommandResultParser`].

use crate::error::{FleetError, Result};
use crate::models::FieldMap;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// File extension of template files
pub const TEMPLATE_EXTENSION: &str = "textfsm";

/// Converts raw command output into field maps.
///
/// # Object Safety
/// This trait is object-safe, allowing `Arc<dyn CommandResultParser>`.
#[async_trait]
pub trait CommandResultParser: Send + Sync {
    /// Parses `raw_text` with the template named `template_id`.
    ///
    /// An empty list is a successful parse with no rows.
    ///
    /// # Errors
    /// Returns `FleetError::Parse` if the template rejects the text.
    async fn parse(&self, template_id: &str, raw_text: &str) -> Result<Vec<FieldMap>>;
}

/// Runs a parser program once per command.
///
/// The program is invoked as `<program> [args..] <template_dir>/<id>.textfsm`
/// with the raw text on stdin, and must print a JSON array of objects.
#[derive(Debug, Clone)]
pub struct ExternalCommandParser {
    program: PathBuf,
    args: Vec<String>,
    template_dir: PathBuf,
}

impl ExternalCommandParser {
    pub fn new(program: impl Into<PathBuf>, template_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            template_dir: template_dir.into(),
        }
    }

    /// Arguments placed before the template path
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Path of the template file for `template_id`
    pub fn template_path(&self, template_id: &str) -> PathBuf {
        self.template_dir
            .join(format!("{}.{}", template_id, TEMPLATE_EXTENSION))
    }

    async fn run(&self, template: &Path, template_id: &str, raw_text: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(template)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                FleetError::parse_failed(
                    template_id,
                    format!("failed to start {}: {}", self.program.display(), e),
                )
            })?;

        // Feed stdin while stdout drains so a streaming parser cannot stall
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(raw_text.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| {
            FleetError::parse_failed(template_id, format!("parser did not finish: {}", e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FleetError::parse_failed(
                template_id,
                format!("parser exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        // A parser may finish without reading all of its input
        match fed {
            Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => Err(FleetError::parse_failed(
                template_id,
                format!("failed to send output: {}", e),
            )),
            _ => Ok(output.stdout),
        }
    }
}

#[async_trait]
impl CommandResultParser for ExternalCommandParser {
    async fn parse(&self, template_id: &str, raw_text: &str) -> Result<Vec<FieldMap>> {
        let template = self.template_path(template_id);
        if !tokio::fs::try_exists(&template).await.unwrap_or(false) {
            return Err(FleetError::parse_failed(
                template_id,
                format!("template {} not found", template.display()),
            ));
        }

        let stdout = self.run(&template, template_id, raw_text).await?;
        field_maps_from_json(template_id, &stdout)
    }
}

/// Decodes parser output: a JSON array of flat objects.
///
/// Strings are kept as is, numbers and booleans are rendered as text,
/// arrays are joined with `,` and null becomes empty text.
///
/// # Errors
/// Returns `FleetError::Parse` for anything else.
pub fn field_maps_from_json(template_id: &str, bytes: &[u8]) -> Result<Vec<FieldMap>> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        FleetError::parse_failed(template_id, format!("parser output is not JSON: {}", e))
    })?;

    let Value::Array(rows) = value else {
        return Err(FleetError::parse_failed(
            template_id,
            "parser output is not a JSON array",
        ));
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(fields) => fields
                .into_iter()
                .map(|(name, value)| {
                    field_text(&value)
                        .map(|text| (name.clone(), text))
                        .ok_or_else(|| {
                            FleetError::parse_failed(
                                template_id,
                                format!("row {} field {} is not flat", index, name),
                            )
                        })
                })
                .collect::<Result<FieldMap>>(),
            _ => Err(FleetError::parse_failed(
                template_id,
                format!("row {} is not an object", index),
            )),
        })
        .collect()
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(_) | Value::Object(_) => None,
                other => field_text(other),
            })
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(",")),
        Value::Object(_) => None,
    }
}
