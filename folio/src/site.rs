//! Static site generation.
//!
//! Every page is rendered from a [`ContentStore`]: the index with the profile
//! and one card per project, then one page per project. Code and diagram
//! blocks are rendered concurrently on a Tokio runtime.
use std::{
  fs,
  path::{Path, PathBuf},
  time::Duration,
};

use color_eyre::eyre::{Context, Result, bail};
use folio_config::Config;
use folio_content::{
  ContentStore,
  ImageUrlResolver,
  MemoryStore,
  PublicUrlResolver,
  SiteData,
  is_safe_slug,
};
use folio_html::{CardView, ProfileView, render_index, render_project};
use folio_markdown::{
  CodeHighlighter,
  DiagramRenderer,
  DocumentRenderer,
  DocumentView,
  MarkdownOptions,
  MarkdownProcessor,
  RenderMode,
};
use folio_templates as templates;
use log::{debug, info};
use tokio::runtime::Runtime;

/// Stored image paths are used as they are when no storage is configured.
struct StoredPath;

impl ImageUrlResolver for StoredPath {
  fn resolve(&self, path: &str) -> String {
    path.to_string()
  }
}

/// Build the whole site described by `config`.
///
/// Returns the paths of the written pages.
///
/// # Errors
///
/// Returns an error if the configured paths are invalid, the content export
/// cannot be loaded, or a page cannot be rendered or written.
pub fn build(config: &Config) -> Result<Vec<PathBuf>> {
  config.validate_paths()?;

  let Some(data_file) = &config.data_file else {
    bail!("No data file configured. Set `data_file` or pass --data-file.");
  };
  let data = SiteData::from_file(data_file).wrap_err_with(|| {
    format!("Failed to load content from {}", data_file.display())
  })?;
  info!(
    "Loaded {} project(s) from {}",
    data.projects.len(),
    data_file.display()
  );
  let store = MemoryStore::from(data);

  let renderer = renderer_for(config);
  let resolver = resolver_for(config);
  let pages =
    runtime()?.block_on(write_site(config, &store, &renderer, resolver.as_ref()))?;

  info!(
    "Site generated successfully in {}",
    config.output_dir.display()
  );
  Ok(pages)
}

/// The runtime document rendering runs on.
///
/// # Errors
///
/// Returns an error if the runtime cannot be started.
pub fn runtime() -> Result<Runtime> {
  tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .wrap_err("Failed to start the render runtime")
}

/// The document renderer matching the highlighting and diagram settings.
#[must_use]
pub fn renderer_for(config: &Config) -> DocumentRenderer {
  let processor = MarkdownProcessor::new(MarkdownOptions {
    diagrams: config.diagrams.enable,
    ..MarkdownOptions::default()
  });

  let highlighter = if config.highlight_code {
    CodeHighlighter::new(config.highlight_theme.as_deref())
  } else {
    CodeHighlighter::disabled()
  };

  let diagrams = if config.diagrams.enable {
    DiagramRenderer::kroki(
      &config.diagrams.kroki_url,
      Duration::from_secs(config.diagrams.timeout_secs),
    )
  } else {
    DiagramRenderer::unavailable("Diagram rendering is disabled")
  };

  DocumentRenderer::new(processor, highlighter, diagrams)
}

/// Image URL resolution for the configured storage, if any.
#[must_use]
pub fn resolver_for(config: &Config) -> Box<dyn ImageUrlResolver> {
  match &config.storage {
    Some(storage) => Box::new(PublicUrlResolver::from(storage)),
    None => Box::new(StoredPath),
  }
}

/// Render every page from `store` into `config.output_dir`, along with the
/// stylesheet and script assets.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// Returns an error if the store cannot be read, a project slug would write
/// outside the output directory, or a page cannot be rendered or written.
pub async fn write_site(
  config: &Config,
  store: &dyn ContentStore,
  renderer: &DocumentRenderer,
  resolver: &dyn ImageUrlResolver,
) -> Result<Vec<PathBuf>> {
  let output_dir = &config.output_dir;
  fs::create_dir_all(output_dir).wrap_err_with(|| {
    format!("Failed to create output directory: {}", output_dir.display())
  })?;

  let profile = store.profile().wrap_err("Failed to read the profile")?;
  let projects = store.projects().wrap_err("Failed to read projects")?;
  let unsafe_slug = projects.iter().find(|project| !is_safe_slug(&project.slug));
  if let Some(project) = unsafe_slug {
    bail!(
      "Project '{}' has an invalid slug '{}'. Slugs must be a single path segment.",
      project.title,
      project.slug
    );
  }

  let profile_view = match &profile {
    Some(profile) => {
      Some(ProfileView::new(
        profile,
        &config.title,
        render_fragment(renderer, profile.summary.as_deref()).await,
        render_fragment(renderer, profile.skills.as_deref()).await,
      ))
    },
    None => None,
  };

  let card_processor = MarkdownProcessor::new(MarkdownOptions {
    mode: RenderMode::Card,
    ..MarkdownOptions::default()
  });
  let cards: Vec<_> = projects
    .iter()
    .map(|project| {
      let summary = non_blank(project.summary.as_deref())
        .map(|summary| card_processor.render(summary).fallback_html());
      CardView::new(project, summary, resolver)
    })
    .collect();

  let mut pages = Vec::with_capacity(projects.len() + 1);
  let index_html = render_index(config, profile_view.as_ref(), &cards)?;
  pages.push(write_page(&output_dir.join("index.html"), &index_html)?);

  for project in &projects {
    debug!("Rendering project page: {}", project.slug);
    let view = DocumentView::new();
    let document = renderer.render(&view, &project.full_body()).await;
    let summary_html = render_fragment(renderer, project.summary.as_deref()).await;

    let html = render_project(
      config,
      project,
      &document,
      summary_html.as_deref(),
      resolver,
    )?;
    let path = output_dir
      .join("projects")
      .join(&project.slug)
      .join("index.html");
    pages.push(write_page(&path, &html)?);
  }

  write_assets(config)?;
  Ok(pages)
}

/// Full rendering of an optional markdown field. Blank fields render to
/// nothing.
async fn render_fragment(
  renderer: &DocumentRenderer,
  markdown: Option<&str>,
) -> Option<String> {
  let markdown = non_blank(markdown)?;
  let view = DocumentView::new();
  Some(renderer.render(&view, markdown).await.html)
}

fn non_blank(text: Option<&str>) -> Option<&str> {
  text.filter(|text| !text.trim().is_empty())
}

fn write_page(path: &Path, html: &str) -> Result<PathBuf> {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
  }
  fs::write(path, html)
    .wrap_err_with(|| format!("Failed to write page: {}", path.display()))?;
  debug!("Wrote {}", path.display());
  Ok(path.to_path_buf())
}

/// Copy the stylesheet and script, preferring overrides from the template
/// directory.
fn write_assets(config: &Config) -> Result<()> {
  let assets_dir = config.output_dir.join("assets");
  fs::create_dir_all(&assets_dir).wrap_err_with(|| {
    format!("Failed to create assets directory: {}", assets_dir.display())
  })?;

  for (name, fallback) in [
    ("default.css", templates::DEFAULT_CSS),
    ("main.js", templates::MAIN_JS),
  ] {
    let content = folio_html::template::get_template_content(config, name, fallback)?;
    let path = assets_dir.join(name);
    fs::write(&path, content)
      .wrap_err_with(|| format!("Failed to write asset: {}", path.display()))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use folio_content::{Profile, Project};

  use super::*;

  fn config(output_dir: &Path) -> Config {
    let mut config = Config {
      output_dir: output_dir.to_path_buf(),
      ..Config::default()
    };
    config.diagrams.enable = false;
    config.highlight_code = false;
    config
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn writes_index_projects_and_assets() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let store = MemoryStore::from(SiteData {
      profile:  Some(Profile {
        full_name: Some("Jiin".into()),
        summary: Some("Backend **engineer**".into()),
        ..Profile::default()
      }),
      projects: vec![Project {
        id: "1".into(),
        slug: "pipeline".into(),
        title: "Pipeline".into(),
        summary: Some("Cut merges from **4h** to 5m\n\n![x](a.png)".into()),
        body_intro: Some("# Pipeline\n\n## Problem".into()),
        ..Project::default()
      }],
    });

    let pages = write_site(&config, &store, &renderer_for(&config), &StoredPath)
      .await
      .unwrap();
    assert_eq!(pages.len(), 2);

    let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(index.contains("<strong>engineer</strong>"));
    assert!(index.contains("projects/pipeline/index.html"));
    assert!(!index.contains("a.png"));

    let page =
      fs::read_to_string(dir.path().join("projects/pipeline/index.html")).unwrap();
    assert!(page.contains("toc-level-2\"><a href=\"#problem\">"));
    assert!(page.contains("<img"));
    assert!(dir.path().join("assets/default.css").is_file());
    assert!(dir.path().join("assets/main.js").is_file());
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn unsafe_slugs_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("out/site");
    let config = config(&output_dir);
    let store = MemoryStore::from(SiteData {
      profile:  None,
      projects: vec![Project {
        slug: "../../escaped".into(),
        title: "Escaped".into(),
        ..Project::default()
      }],
    });

    let err = write_site(&config, &store, &renderer_for(&config), &StoredPath)
      .await
      .unwrap_err();
    assert!(err.to_string().contains("invalid slug '../../escaped'"));
    assert!(!dir.path().join("out/escaped").exists());
    assert!(!output_dir.join("index.html").exists());
  }

  #[test]
  fn resolver_follows_storage_config() {
    let mut config = Config::default();
    assert_eq!(resolver_for(&config).resolve("projects/a.png"), "projects/a.png");

    config.storage = Some(folio_config::StorageConfig {
      public_url: "https://cdn.dev/".into(),
      bucket:     "media".into(),
    });
    assert_eq!(
      resolver_for(&config).resolve("projects/a.png"),
      "https://cdn.dev/media/projects/a.png"
    );
  }
}
