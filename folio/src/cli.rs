use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for folio
#[derive(Parser, Debug)]
#[command(author, version, about = "folio: a static portfolio generator")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", global = true, action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the folio CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new folio configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "folio.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Export default templates to a directory for customization.
  Export {
    /// Output directory for template files.
    #[arg(short, long, default_value = "templates")]
    output_dir: PathBuf,

    /// Whether to overwrite existing files.
    #[arg(long)]
    force: bool,
  },

  /// Build the static site from a content export.
  Build {
    /// Content export (JSON or TOML) with the profile and projects.
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    /// Output directory for the generated site.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Directory with template overrides.
    #[arg(short, long)]
    template_dir: Option<PathBuf>,
  },

  /// Render one markdown file to an HTML fragment.
  Render {
    /// Markdown file to render.
    input: PathBuf,

    /// Use the compact card summary rules.
    #[arg(long)]
    card: bool,

    /// Write the fragment here instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },

  /// Print the table of contents of a markdown file as JSON.
  Toc {
    /// Markdown file to scan.
    input: PathBuf,
  },

  /// Print a Mermaid diagram with the default init directive applied.
  Directive {
    /// Diagram source file.
    input: PathBuf,
  },
}

impl Cli {
  /// Parse command line arguments.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// CLI values that override the loaded configuration, in `KEY=VALUE` form.
  ///
  /// Later entries win, so these are appended after `--config` overrides.
  #[must_use]
  pub fn command_overrides(&self) -> Vec<String> {
    let mut overrides = self.config_overrides.clone();
    if let Commands::Build {
      data_file,
      output_dir,
      template_dir,
    } = &self.command
    {
      let paths = [
        ("data_file", data_file),
        ("output_dir", output_dir),
        ("template_dir", template_dir),
      ];
      overrides.extend(paths.into_iter().filter_map(|(key, path)| {
        path
          .as_ref()
          .map(|path| format!("{key}={}", path.display()))
      }));
    }
    overrides
  }
}
