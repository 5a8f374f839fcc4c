use std::{
  fs,
  io::{self, Write},
};

use color_eyre::eyre::{Context, Result, bail};
use folio::{
  cli::{Cli, Commands},
  fragment,
  site,
};
use folio_config::Config;
use log::{LevelFilter, info};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => {
      // Check if file already exists and that we're not forcing overwrite
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }

      if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
      {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
        info!("Created directory: {}", parent.display());
      }

      Config::generate_default_config(format, output).wrap_err_with(|| {
        format!(
          "Failed to generate configuration file: {}",
          output.display()
        )
      })?;

      info!(
        "Configuration file created successfully. Edit it to point at your \
         content export."
      );
      return Ok(());
    },

    Commands::Export { output_dir, force } => {
      Config::export_templates(output_dir, *force).wrap_err_with(|| {
        format!("Failed to export templates to {}", output_dir.display())
      })?;
      return Ok(());
    },

    Commands::Toc { input } => return print(&fragment::toc(input)?),

    Commands::Directive { input } => return print(&fragment::directive(input)?),

    Commands::Build { .. } | Commands::Render { .. } => {},
  }

  let config = Config::load(&cli.config_files, &cli.command_overrides())?;

  match &cli.command {
    Commands::Render {
      input,
      card,
      output,
    } => {
      let html = fragment::render(&config, input, *card)?;
      match output {
        Some(path) => {
          fs::write(path, html)
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
          info!("Fragment written to {}", path.display());
        },
        None => print(&html)?,
      }
    },
    _ => {
      let pages = site::build(&config)?;
      info!("Wrote {} page(s)", pages.len());
    },
  }

  Ok(())
}

fn print(text: &str) -> Result<()> {
  let mut stdout = io::stdout().lock();
  writeln!(stdout, "{text}").wrap_err("Failed to write to standard output")
}
