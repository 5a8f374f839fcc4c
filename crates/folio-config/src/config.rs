use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};

use crate::{diagrams::DiagramsConfig, error::ConfigError, storage::StorageConfig};

/// Configuration for the folio site generator.
///
/// [`Config`] holds everything that controls a site build: where the content
/// export lives, where output goes, template overrides, highlighting and
/// diagram rendering. Fields are typically loaded from a TOML or JSON config
/// file and adjusted with `--config KEY=VALUE` overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Site title, used when the profile has no name.
  pub title: String,

  /// Text shown in the page footer.
  pub footer_text: String,

  /// JSON or TOML export holding the profile and project records.
  pub data_file: Option<PathBuf>,

  /// Output directory for the generated site.
  pub output_dir: PathBuf,

  /// Directory with template overrides. Files missing there fall back to the
  /// embedded templates.
  pub template_dir: Option<PathBuf>,

  /// Whether to syntax highlight fenced code blocks.
  pub highlight_code: bool,

  /// Highlighting theme name. The highlighter's default is used when unset.
  pub highlight_theme: Option<String>,

  /// Diagram rendering options.
  pub diagrams: DiagramsConfig,

  /// Object store the uploaded images live in.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub storage: Option<StorageConfig>,

  /// Email address of the account allowed to edit content.
  pub admin_email: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      title:           "Portfolio".to_string(),
      footer_text:     "Generated with folio".to_string(),
      data_file:       None,
      output_dir:      PathBuf::from("build"),
      template_dir:    None,
      highlight_code:  true,
      highlight_theme: None,
      diagrams:        DiagramsConfig::default(),
      storage:         None,
      admin_email:     None,
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
      ConfigError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    let parse_error = |format: &'static str, message: String| {
      ConfigError::Parse {
        path: path.to_path_buf(),
        format,
        message,
      }
    };

    match path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase)
      .as_deref()
    {
      Some("json") => {
        serde_json::from_str(&content).map_err(|e| parse_error("JSON", e.to_string()))
      },
      Some("toml") => {
        toml::from_str(&content).map_err(|e| parse_error("TOML", e.to_string()))
      },
      _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    }
  }

  /// Load configuration from the given files, or a discovered one, then apply
  /// `KEY=VALUE` overrides.
  ///
  /// Files are merged in order, later files taking precedence. With no files
  /// given, [`Config::find_config_file`] is consulted and the defaults are
  /// used if nothing is found.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          first.display(),
          e
        ))
      })?;

      for config_path in rest {
        let additional_config = Self::from_file(config_path).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load config from {}: {}",
            config_path.display(),
            e
          ))
        })?;
        merged_config.merge(additional_config);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// Nested fields use dotted keys, e.g. `diagrams.enable=false` or
  /// `storage.bucket=media`.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str
        .split_once('=')
        .ok_or_else(|| ConfigError::OverrideFormat(override_str.clone()))?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override. Empty values clear optional fields.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value does not parse.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "title" => self.title = value.to_string(),
      "footer_text" => self.footer_text = value.to_string(),
      "data_file" => self.data_file = optional(value).map(PathBuf::from),
      "output_dir" => self.output_dir = PathBuf::from(value),
      "template_dir" => self.template_dir = optional(value).map(PathBuf::from),
      "highlight_code" => self.highlight_code = parse_bool(key, value)?,
      "highlight_theme" => self.highlight_theme = optional(value).map(str::to_string),
      "admin_email" => self.admin_email = optional(value).map(str::to_string),
      "diagrams.enable" => self.diagrams.enable = parse_bool(key, value)?,
      "diagrams.kroki_url" => self.diagrams.kroki_url = value.to_string(),
      "diagrams.timeout_secs" => {
        self.diagrams.timeout_secs = value
          .parse()
          .map_err(|_| invalid_value(key, value, "a positive integer"))?;
      },
      "storage.public_url" => {
        self.storage.get_or_insert_with(StorageConfig::default).public_url =
          value.to_string();
      },
      "storage.bucket" => {
        self.storage.get_or_insert_with(StorageConfig::default).bucket =
          value.to_string();
      },
      _ => {
        return Err(ConfigError::UnknownKey(key.to_string()));
      },
    }
    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - Plain fields (String, bool, nested tables): Other's value always
  ///   replaces
  pub fn merge(&mut self, other: Self) {
    self.title = other.title;
    self.footer_text = other.footer_text;
    self.output_dir = other.output_dir;
    self.highlight_code = other.highlight_code;
    self.diagrams = other.diagrams;

    if other.data_file.is_some() {
      self.data_file = other.data_file;
    }
    if other.template_dir.is_some() {
      self.template_dir = other.template_dir;
    }
    if other.highlight_theme.is_some() {
      self.highlight_theme = other.highlight_theme;
    }
    if other.storage.is_some() {
      self.storage = other.storage;
    }
    if other.admin_email.is_some() {
      self.admin_email = other.admin_email;
    }
  }

  /// Get the path to a template override by name, if a template directory is
  /// configured. This method does not check if the returned path exists.
  #[must_use]
  pub fn get_template_file(&self, name: &str) -> Option<PathBuf> {
    self.template_dir.as_ref().map(|dir| dir.join(name))
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let config_filenames = [
          "folio.toml",
          "folio.json",
          ".folio.toml",
          ".folio.json",
          ".config/folio.toml",
          ".config/folio.json",
        ];

        let current_dir = std::env::current_dir().ok()?;
        for filename in &config_filenames {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home).join("folio");
          for filename in &["config.toml", "config.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Validate the paths a site build reads from.
  ///
  /// # Errors
  ///
  /// Returns an error if no data file is configured, or if a configured path
  /// does not exist or has the wrong kind.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    match self.data_file {
      None => errors.push("No data file configured (set `data_file`)".to_string()),
      Some(ref data_file) if !data_file.exists() => {
        errors.push(format!(
          "Data file does not exist: {}",
          data_file.display()
        ));
      },
      Some(ref data_file) if !data_file.is_file() => {
        errors.push(format!(
          "Data file path is not a file: {}",
          data_file.display()
        ));
      },
      Some(_) => {},
    }

    if let Some(ref template_dir) = self.template_dir {
      if !template_dir.exists() {
        errors.push(format!(
          "Template directory does not exist: {}",
          template_dir.display()
        ));
      } else if !template_dir.is_dir() {
        errors.push(format!(
          "Template directory path is not a directory: {}",
          template_dir.display()
        ));
      }
    }

    if !errors.is_empty() {
      return Err(ConfigError::InvalidPaths(errors));
    }

    Ok(())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the template cannot be retrieved or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Export embedded templates to a directory for customization. Existing
  /// files are kept unless `force` is set.
  ///
  /// # Errors
  ///
  /// Returns an error if the output directory cannot be created or a template
  /// cannot be written.
  pub fn export_templates(
    output_dir: &Path,
    force: bool,
  ) -> Result<(), ConfigError> {
    fs::create_dir_all(output_dir).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to create template directory: {}: {}",
        output_dir.display(),
        e
      ))
    })?;

    for (filename, content) in folio_templates::all_templates() {
      let file_path = output_dir.join(filename);

      if file_path.exists() && !force {
        log::warn!(
          "File {} already exists. Use --force to overwrite.",
          file_path.display()
        );
        continue;
      }

      fs::write(&file_path, content).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to write template file: {}: {}",
          file_path.display(),
          e
        ))
      })?;
      log::info!("Exported template: {}", file_path.display());
    }

    Ok(())
  }
}

fn optional(value: &str) -> Option<&str> {
  (!value.is_empty()).then_some(value)
}

fn invalid_value(key: &str, value: &str, expected: &'static str) -> ConfigError {
  ConfigError::InvalidValue {
    key: key.to_string(),
    value: value.to_string(),
    expected,
  }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(invalid_value(key, value, "a boolean: true/false, yes/no or 1/0"))
    },
  }
}

#[cfg(test)]
mod tests {
  #![allow(
    clippy::useless_vec,
    clippy::unwrap_used,
    clippy::field_reassign_with_default,
    reason = "Fine in tests"
  )]

  use super::*;

  #[test]
  fn test_config_merge_option_fields() {
    let mut base = Config::default();
    base.data_file = Some(PathBuf::from("base.json"));
    base.template_dir = None;

    let mut override_config = Config::default();
    override_config.data_file = None;
    override_config.template_dir = Some(PathBuf::from("override-templates"));

    base.merge(override_config);

    assert_eq!(base.data_file, Some(PathBuf::from("base.json")));
    assert_eq!(
      base.template_dir,
      Some(PathBuf::from("override-templates"))
    );
  }

  #[test]
  fn test_config_merge_plain_fields() {
    let mut base = Config::default();
    base.highlight_code = false;
    base.diagrams.enable = true;

    let mut override_config = Config::default();
    override_config.highlight_code = true;
    override_config.diagrams.enable = false;
    override_config.title = "Jiin".to_string();

    base.merge(override_config);

    assert!(base.highlight_code);
    assert!(!base.diagrams.enable);
    assert_eq!(base.title, "Jiin");
  }

  #[test]
  fn test_apply_overrides_boolean() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec![
        "diagrams.enable=false".to_string(),
        "highlight_code=no".to_string(),
      ])
      .unwrap();

    assert!(!config.diagrams.enable);
    assert!(!config.highlight_code);
  }

  #[test]
  fn test_apply_overrides_string() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec![
        "title=My Portfolio".to_string(),
        "footer_text = Custom Footer".to_string(),
      ])
      .unwrap();

    assert_eq!(config.title, "My Portfolio");
    assert_eq!(config.footer_text, "Custom Footer");
  }

  #[test]
  fn test_apply_overrides_path() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec![
        "output_dir=/tmp/output".to_string(),
        "data_file=/tmp/site.json".to_string(),
      ])
      .unwrap();

    assert_eq!(config.output_dir, PathBuf::from("/tmp/output"));
    assert_eq!(config.data_file, Some(PathBuf::from("/tmp/site.json")));
  }

  #[test]
  fn test_apply_override_empty_clears_option() {
    let mut config = Config::default();
    config.highlight_theme = Some("Nord".to_string());

    config.apply_override("highlight_theme", "").unwrap();

    assert_eq!(config.highlight_theme, None);
  }

  #[test]
  fn test_apply_overrides_numeric() {
    let mut config = Config::default();

    config
      .apply_overrides(&vec!["diagrams.timeout_secs=30".to_string()])
      .unwrap();

    assert_eq!(config.diagrams.timeout_secs, 30);
  }

  #[test]
  fn test_apply_override_creates_nested_config() {
    let mut config = Config::default();
    assert!(config.storage.is_none());

    config
      .apply_override("storage.public_url", "https://cdn.example.com")
      .unwrap();

    let storage = config.storage.unwrap();
    assert_eq!(storage.public_url, "https://cdn.example.com");
    assert_eq!(storage.bucket, "portfolio");
  }

  #[test]
  fn test_apply_overrides_invalid_format() {
    let mut config = Config::default();

    let result = config.apply_overrides(&vec!["no_equals_sign".to_string()]);

    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Expected KEY=VALUE")
    );
  }

  #[test]
  fn test_apply_overrides_unknown_key() {
    let mut config = Config::default();

    let result = config.apply_overrides(&vec!["unknown_key=value".to_string()]);

    assert!(
      result
        .unwrap_err()
        .to_string()
        .contains("Unknown configuration key")
    );
  }

  #[test]
  fn test_apply_overrides_invalid_boolean() {
    let mut config = Config::default();

    let result =
      config.apply_overrides(&vec!["diagrams.enable=maybe".to_string()]);

    assert!(result.unwrap_err().to_string().contains("Expected a boolean"));
  }

  #[test]
  fn test_apply_overrides_invalid_numeric() {
    let mut config = Config::default();

    let result =
      config.apply_overrides(&vec!["diagrams.timeout_secs=soon".to_string()]);

    assert!(result.unwrap_err().to_string().contains("Invalid value"));
  }

  #[test]
  fn test_from_file_toml_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("folio.toml");
    fs::write(
      &toml_path,
      "title = \"T\"\ndata_file = \"site.json\"\n\n[diagrams]\nenable = \
       false\n",
    )
    .unwrap();
    let config = Config::from_file(&toml_path).unwrap();
    assert_eq!(config.title, "T");
    assert_eq!(config.data_file, Some(PathBuf::from("site.json")));
    assert!(!config.diagrams.enable);
    assert_eq!(config.diagrams.timeout_secs, 10);

    let json_path = dir.path().join("folio.json");
    fs::write(&json_path, r#"{"storage": {"bucket": "media"}}"#).unwrap();
    let config = Config::from_file(&json_path).unwrap();
    assert_eq!(config.storage.unwrap().bucket, "media");
    assert_eq!(config.title, "Portfolio");
  }

  #[test]
  fn test_from_file_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("folio.yaml");
    fs::write(&path, "title: x").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Unsupported config file format"));
  }

  #[test]
  fn test_load_merges_files_then_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.toml");
    let second = dir.path().join("b.json");
    fs::write(&first, "title = \"First\"\nadmin_email = \"me@x.dev\"\n")
      .unwrap();
    fs::write(&second, r#"{"title": "Second"}"#).unwrap();

    let config = Config::load(&[first, second], &[
      "footer_text=bye".to_string(),
    ])
    .unwrap();

    assert_eq!(config.title, "Second");
    assert_eq!(config.admin_email.as_deref(), Some("me@x.dev"));
    assert_eq!(config.footer_text, "bye");
  }

  #[test]
  fn test_validate_paths_requires_data_file() {
    let config = Config::default();
    let err = config.validate_paths().unwrap_err();
    assert!(err.to_string().contains("No data file configured"));

    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("site.json");
    fs::write(&data, "{}").unwrap();
    let config = Config {
      data_file: Some(data),
      template_dir: Some(dir.path().join("missing")),
      ..Config::default()
    };
    let err = config.validate_paths().unwrap_err();
    assert!(err.to_string().contains("Template directory does not exist"));
  }

  #[test]
  fn test_export_templates_respects_force() {
    let dir = tempfile::tempdir().unwrap();
    let css = dir.path().join("default.css");
    fs::write(&css, "/* mine */").unwrap();

    Config::export_templates(dir.path(), false).unwrap();
    assert_eq!(fs::read_to_string(&css).unwrap(), "/* mine */");
    assert!(dir.path().join("index.html").exists());

    Config::export_templates(dir.path(), true).unwrap();
    assert_ne!(fs::read_to_string(&css).unwrap(), "/* mine */");
  }

  #[test]
  fn test_generate_default_config_parses_back() {
    let dir = tempfile::tempdir().unwrap();
    for format in ["toml", "json"] {
      let path = dir.path().join(format!("folio.{format}"));
      Config::generate_default_config(format, &path).unwrap();
      let config = Config::from_file(&path).unwrap();
      assert_eq!(config.output_dir, PathBuf::from("build"));
    }

    let err = Config::generate_default_config("yaml", &dir.path().join("x"))
      .unwrap_err();
    assert!(err.to_string().contains("Unsupported config format"));
  }
}
