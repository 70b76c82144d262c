//! Fixed catalog of built-in tools.
//!
//! Each variant carries its schema and a default handler. The defaults
//! return placeholder payloads of a fixed shape; they exercise the calling
//! contract and compute nothing real. Missing parameters fall back to named
//! defaults and never fail.

use crate::definition::ToolDefinition;
use crate::schema::{ParameterSchema, ParameterSpec};
use crate::trait_::Parameters;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Signature of a built-in default handler
pub type DefaultHandler = fn(&Parameters) -> Value;

/// Built-in tool identities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinTool {
    /// Real-time web search
    WebSearch,
    /// Sandboxed code execution
    CodeInterpreter,
    /// Repository file search
    FileSearch,
    /// Text-to-image generation
    ImageGeneration,
}

impl BuiltinTool {
    /// Every catalog entry
    pub const ALL: [BuiltinTool; 4] = [
        Self::WebSearch,
        Self::CodeInterpreter,
        Self::FileSearch,
        Self::ImageGeneration,
    ];

    /// Registry identity
    #[must_use]
    pub const fn identity(self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::CodeInterpreter => "code_interpreter",
            Self::FileSearch => "file_search",
            Self::ImageGeneration => "image_generation",
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        // The catalog has always exposed the identity as the name.
        self.identity()
    }

    /// One-line description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::WebSearch => "Search the web for real-time information",
            Self::CodeInterpreter => "Execute code in a sandbox environment",
            Self::FileSearch => "Search for files in a repository",
            Self::ImageGeneration => "Generate images from text descriptions",
        }
    }

    /// Declared parameters
    #[must_use]
    pub fn parameters(self) -> ParameterSchema {
        match self {
            Self::WebSearch => ParameterSchema::new()
                .with_param("query", ParameterSpec::string("The search query")),
            Self::CodeInterpreter => ParameterSchema::new()
                .with_param("code", ParameterSpec::string("The code to execute"))
                .with_param(
                    "language",
                    ParameterSpec::string("The programming language")
                        .with_allowed(["python", "javascript", "bash"]),
                ),
            Self::FileSearch => ParameterSchema::new()
                .with_param("query", ParameterSpec::string("The search query"))
                .with_param("path", ParameterSpec::string("The path to search in")),
            Self::ImageGeneration => ParameterSchema::new()
                .with_param(
                    "prompt",
                    ParameterSpec::string("The text prompt to generate an image from"),
                )
                .with_param(
                    "size",
                    ParameterSpec::string("The size of the image")
                        .with_allowed(["256x256", "512x512", "1024x1024"]),
                ),
        }
    }

    /// Default handler for this entry
    #[must_use]
    pub fn default_handler(self) -> DefaultHandler {
        match self {
            Self::WebSearch => default_web_search,
            Self::CodeInterpreter => default_code_interpreter,
            Self::FileSearch => default_file_search,
            Self::ImageGeneration => default_image_generation,
        }
    }

    /// Fresh definition with no custom handler bound
    #[must_use]
    pub fn definition(self) -> ToolDefinition {
        ToolDefinition::new(self.identity(), self.display_name(), self.description())
            .with_parameters(self.parameters())
    }

    /// Look up by exact identity
    #[must_use]
    pub fn from_identity(identity: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.identity() == identity)
    }

    /// Look up by identity ignoring ASCII case and surrounding whitespace,
    /// so `WEB_SEARCH` and ` web_search ` both resolve
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|tool| tool.identity().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for BuiltinTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identity())
    }
}

/// Read a parameter as text, substituting `default` when absent or null
fn text_param(params: &Parameters, key: &str, default: &str) -> String {
    match params.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn default_web_search(params: &Parameters) -> Value {
    let query = text_param(params, "query", "");
    json!({
        "results": [
            {
                "title": format!("Result for {}", query),
                "url": format!("https://example.com/search?q={}", query),
            }
        ],
        "message": format!("This is a placeholder result for: {}", query),
    })
}

fn default_code_interpreter(params: &Parameters) -> Value {
    let language = text_param(params, "language", "python");
    json!({
        "result": format!("Placeholder result for {} code execution", language),
        "output": "This is where the code output would appear",
    })
}

fn default_file_search(params: &Parameters) -> Value {
    let query = text_param(params, "query", "");
    let path = text_param(params, "path", ".");
    json!({
        "files": [
            format!("{}/example-file-1.txt", path),
            format!("{}/example-file-2.txt", path),
        ],
        "message": format!("This is a placeholder result for file search: {}", query),
    })
}

fn default_image_generation(params: &Parameters) -> Value {
    let prompt = text_param(params, "prompt", "");
    json!({
        "image_url": "https://example.com/placeholder-image.png",
        "message": format!(
            "This is a placeholder for image generation with prompt: {}",
            prompt
        ),
    })
}
