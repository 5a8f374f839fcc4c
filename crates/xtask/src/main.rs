use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;
use folio::cli::Cli;

const BIN_NAME: &str = "folio";

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the folio CLI
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,

    /// Only generate shell completions.
    #[arg(long, conflicts_with = "manpage_only")]
    completions_only: bool,

    /// Only generate manpages.
    #[arg(long, conflicts_with = "completions_only")]
    manpage_only: bool,
  },
}

fn main() -> Result<()> {
  let xtask = Xtask::parse();

  match xtask.command {
    Commands::Dist {
      output_dir,
      completions_only,
      manpage_only,
    } => {
      if !manpage_only {
        generate_completions(&output_dir)?;
      }
      if !completions_only {
        generate_manpages(&output_dir)?;
      }
    },
  }

  Ok(())
}

/// Generate shell completions for every supported shell.
fn generate_completions(output_dir: &Path) -> Result<()> {
  let completions_dir = output_dir.join("completions");
  fs::create_dir_all(&completions_dir)?;
  let mut cmd = Cli::command();
  for shell in [
    Shell::Bash,
    Shell::Elvish,
    Shell::Fish,
    Shell::PowerShell,
    Shell::Zsh,
  ] {
    generate_to(shell, &mut cmd, BIN_NAME, &completions_dir)
      .with_context(|| format!("Failed to generate {shell} completions"))?;
  }
  println!(
    "Shell completions generated in {}",
    completions_dir.display()
  );
  Ok(())
}

/// Generate `folio.1` and one `folio-<subcommand>.1` page per subcommand.
fn generate_manpages(output_dir: &Path) -> Result<()> {
  let man_dir = output_dir.join("man");
  fs::create_dir_all(&man_dir)?;

  let cmd = Cli::command();
  write_manpage(&man_dir, BIN_NAME, cmd.clone())?;
  for sub in cmd.get_subcommands() {
    let name = format!("{BIN_NAME}-{}", sub.get_name());
    write_manpage(&man_dir, &name, sub.clone())?;
  }

  println!("Manpages generated in {}", man_dir.display());
  Ok(())
}

fn write_manpage(man_dir: &Path, name: &str, cmd: Command) -> Result<()> {
  let file_path = man_dir.join(format!("{name}.1"));
  let mut file = fs::File::create(&file_path).with_context(|| {
    format!("Failed to create manpage file at {}", file_path.display())
  })?;
  Man::new(cmd)
    .render(&mut file)
    .with_context(|| format!("Failed to render manpage for {name}"))
}
