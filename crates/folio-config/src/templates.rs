use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// Indicates that the requested configuration format is not supported.
  /// Contains the name of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that a fresh
/// `folio init` explains itself.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# folio configuration file
# Every field is optional; commented values show the defaults.

# Site title, used when the profile has no name
title = "Portfolio"

# Footer text shown on every page
footer_text = "Generated with folio"

# JSON or TOML export with the profile and project records
data_file = "site.json"

# Output directory for the generated site
output_dir = "build"

# Directory with template overrides (see `folio export`)
# template_dir = "templates"

# Syntax highlight fenced code blocks
highlight_code = true

# Highlighting theme, e.g. "InspiredGitHub", "Nord", "Dracula"
# highlight_theme = "InspiredGitHub"

# Account allowed to edit content
# admin_email = "me@example.com"

[diagrams]
# Render ```mermaid blocks as diagrams
enable = true

# Kroki server used to render diagrams
kroki_url = "https://kroki.io"

# Per-diagram timeout in seconds
timeout_secs = 10

# Object store that uploaded images are served from.
# Stored paths resolve to {public_url}/{bucket}/{path}.
# [storage]
# public_url = "https://example.supabase.co/storage/v1/object/public"
# bucket = "portfolio"
"#;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "title": "Portfolio",
  "footer_text": "Generated with folio",
  "data_file": "site.json",
  "output_dir": "build",
  "highlight_code": true,
  "diagrams": {
    "enable": true,
    "kroki_url": "https://kroki.io",
    "timeout_secs": 10
  },
  "storage": {
    "public_url": "https://example.supabase.co/storage/v1/object/public",
    "bucket": "portfolio"
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
