//! Tool trait definition and argument access.

use async_trait::async_trait;
use rag_core::ToolSchema;
use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::provenance::Provenance;

/// Arguments passed to a tool for execution.
///
/// JSON `null` values are treated the same as absent parameters.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// Parameters as key-value pairs.
    pub params: Map<String, Value>,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: Map<String, Value>) -> Self {
        Self { params }
    }

    /// Bind a raw argument value, which must be a JSON object.
    pub fn from_value(value: &Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(map) => Ok(Self::new(map.clone())),
            Value::Null => Ok(Self::default()),
            other => Err(ToolError::MalformedArguments(format!(
                "expected an object, got {}",
                other
            ))),
        }
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.params.get(key).filter(|v| !v.is_null())
    }

    /// Reject any parameter not in `allowed`.
    pub fn ensure_known(&self, allowed: &[&str]) -> Result<(), ToolError> {
        match self.params.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(unknown) => Err(ToolError::UnexpectedParameter(unknown.clone())),
            None => Ok(()),
        }
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.present(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get an optional string parameter.
    pub fn get_string_opt(&self, key: &str) -> Result<Option<String>, ToolError> {
        match self.present(key) {
            Some(v) => {
                let s = v.as_str().ok_or_else(|| ToolError::InvalidParameter {
                    name: key.to_string(),
                    reason: "expected string".to_string(),
                })?;
                Ok(Some(s.to_string()))
            }
            None => Ok(None),
        }
    }

    /// Get an optional non-negative integer parameter.
    pub fn get_u32_opt(&self, key: &str) -> Result<Option<u32>, ToolError> {
        match self.present(key) {
            Some(v) => {
                let n = v
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| ToolError::InvalidParameter {
                        name: key.to_string(),
                        reason: "expected non-negative integer".to_string(),
                    })?;
                Ok(Some(n))
            }
            None => Ok(None),
        }
    }
}

/// Result of one tool execution.
///
/// `sources` is `Some` for tools that track provenance, even when the list
/// is empty, so that recording it replaces whatever came before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// Text shown to the model.
    pub content: String,
    /// Sources behind the content, if the tool tracks any.
    pub sources: Option<Vec<Provenance>>,
}

impl ToolOutput {
    /// Plain text output from a tool without provenance.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sources: None,
        }
    }

    /// Output carrying the sources it was built from.
    pub fn cited(content: impl Into<String>, sources: Vec<Provenance>) -> Self {
        Self {
            content: content.into(),
            sources: Some(sources),
        }
    }
}

/// A named, schema-described capability the model may invoke.
///
/// Tools render every outcome they can explain as text. `Err` is reserved
/// for invocations that cannot be bound at all (missing or mistyped
/// arguments), which fail the whole tool round.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declarative schema shown to the model. Its name is the dispatch key.
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<String, ToolError>;

    /// Execute without recording provenance on the tool.
    ///
    /// The caller decides when, and whether, the returned sources are
    /// recorded. Tools that track provenance override this and make
    /// [`execute`](Tool::execute) record the sources itself.
    async fn run(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::text(self.execute(args).await?))
    }

    /// Provenance tracking, for tools that produce citable sources.
    fn provenance(&self) -> Option<&dyn ProvenanceSource> {
        None
    }
}

/// Capability of tools that remember where their last result came from.
#[async_trait]
pub trait ProvenanceSource: Send + Sync {
    /// Sources behind the most recent execution.
    async fn latest(&self) -> Vec<Provenance>;

    /// Replace the recorded sources.
    async fn record(&self, sources: Vec<Provenance>);

    /// Forget the most recent sources.
    async fn clear(&self);
}
