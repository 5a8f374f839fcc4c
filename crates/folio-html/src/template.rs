use std::fs;

use color_eyre::eyre::{Context, Result};
use folio_config::Config;
use folio_content::{ImageUrlResolver, Project};
use folio_markdown::{Lightbox, RenderedDocument};
use folio_templates as templates;
use html_escape::encode_quoted_attribute;
use tera::Tera;

use crate::{
  meta::generate_meta_tags,
  toc::generate_toc,
  view::{CardView, ProfileView, ProjectView},
};

/// Render the index page: the profile header followed by the project cards.
///
/// # Errors
///
/// Returns an error if a template override cannot be read or the template
/// fails to render.
pub fn render_index(
  config: &Config,
  profile: Option<&ProfileView>,
  cards: &[CardView],
) -> Result<String> {
  let mut tera = new_tera();
  let template = get_template_content(config, "index.html", templates::INDEX_TEMPLATE)?;
  tera
    .add_raw_template("index.html", &template)
    .wrap_err("Failed to parse index template")?;

  let page_title = profile.map_or_else(
    || config.title.clone(),
    |profile| profile.full_name.clone(),
  );

  let mut tera_context = tera::Context::new();
  tera_context.insert("page_title", &page_title);
  tera_context.insert("site_title", &config.title);
  tera_context.insert("footer_text", &config.footer_text);
  tera_context.insert("profile", &profile);
  tera_context.insert("cards", cards);
  tera_context.insert("lightbox_html", &Lightbox::new().render_html());
  tera_context.insert("root_prefix", "");

  tera
    .render("index.html", &tera_context)
    .wrap_err("Failed to render index page")
}

/// Render a project page around its rendered body.
///
/// `summary_html` is shown in the sidebar above the table of contents.
///
/// # Errors
///
/// Returns an error if a template override cannot be read or the template
/// fails to render.
pub fn render_project(
  config: &Config,
  project: &Project,
  document: &RenderedDocument,
  summary_html: Option<&str>,
  resolver: &dyn ImageUrlResolver,
) -> Result<String> {
  let mut tera = new_tera();
  let template =
    get_template_content(config, "project.html", templates::PROJECT_TEMPLATE)?;
  tera
    .add_raw_template("project.html", &template)
    .wrap_err("Failed to parse project template")?;

  let page_title = format!("{} - {}", project.title, config.title);
  let cover_url = project
    .cover_image_path
    .as_deref()
    .map(|path| resolver.resolve(path));

  let mut tera_context = tera::Context::new();
  tera_context.insert("page_title", &page_title);
  tera_context.insert("site_title", &config.title);
  tera_context.insert("footer_text", &config.footer_text);
  tera_context.insert("project", &ProjectView::from(project));
  tera_context.insert("meta_html", &generate_meta_tags(project, true));
  tera_context.insert("cover_url", &cover_url);
  tera_context.insert("body_html", &document.html);
  tera_context.insert("toc_html", &generate_toc(&document.toc));
  tera_context.insert("summary_html", &summary_html);
  tera_context.insert("lightbox_html", &Lightbox::new().render_html());
  tera_context.insert("root_prefix", "../../");

  tera
    .render("project.html", &tera_context)
    .wrap_err_with(|| format!("Failed to render project page: {}", project.slug))
}

/// Templates are registered under `.html` names, so values are escaped unless
/// marked `safe`. Attribute-safe escaping is used for text too, and leaves
/// slashes alone.
fn new_tera() -> Tera {
  let mut tera = Tera::default();
  tera.set_escape_fn(escape_value);
  tera
}

fn escape_value(value: &str) -> String {
  encode_quoted_attribute(value).into_owned()
}

/// Template content from the configured template directory, or the embedded
/// `fallback` when there is no override.
///
/// # Errors
///
/// Returns an error if an override exists but cannot be read.
pub fn get_template_content(
  config: &Config,
  template_name: &str,
  fallback: &str,
) -> Result<String> {
  if let Some(template_path) = config.get_template_file(template_name)
    && template_path.exists()
  {
    log::debug!("Using template override: {}", template_path.display());
    return fs::read_to_string(&template_path).wrap_err_with(|| {
      format!("Failed to read template file: {}", template_path.display())
    });
  }
  Ok(fallback.to_string())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use folio_content::{Profile, PublicUrlResolver};
  use folio_markdown::extract_toc;

  use super::*;

  fn resolver() -> PublicUrlResolver {
    PublicUrlResolver {
      public_url: "https://cdn.dev".into(),
      bucket:     "b".into(),
    }
  }

  #[test]
  fn index_lists_profile_and_cards() {
    let config = Config::default();
    let profile = ProfileView::new(
      &Profile {
        full_name: Some("Jiin <Lee>".into()),
        contact_email: Some("me@x.dev".into()),
        ..Profile::default()
      },
      &config.title,
      Some("<p>Hello</p>".into()),
      None,
    );
    let project = Project {
      slug: "pipeline".into(),
      title: "Pipeline".into(),
      ..Project::default()
    };
    let cards = [CardView::new(&project, None, &resolver())];

    let html = render_index(&config, Some(&profile), &cards).unwrap();
    assert!(html.contains("<title>Jiin &lt;Lee&gt;</title>"));
    assert!(html.contains("<p>Hello</p>"));
    assert!(html.contains(r#"href="mailto:me@x.dev""#));
    assert!(html.contains(r#"href="projects/pipeline/index.html""#));
    assert!(html.contains("class=\"lightbox"));
    assert!(!html.contains("Skills &amp; Experiences"));
  }

  #[test]
  fn script_follows_lightbox_defaults_and_keys() {
    let lightbox = Lightbox::new();
    let fallback = format!(
      r#"lightbox.dataset.lightboxTheme || "{}""#,
      lightbox.theme().as_str()
    );
    assert!(templates::MAIN_JS.contains(&fallback));
    assert!(templates::MAIN_JS.contains(r#"event.key === "t""#));
    assert!(templates::MAIN_JS.contains(r#"event.key === "Escape""#));
    assert!(templates::MAIN_JS.contains("template.diagram-source"));
  }

  #[test]
  fn index_without_profile_uses_site_title() {
    let html = render_index(&Config::default(), None, &[]).unwrap();
    assert!(html.contains("<title>Portfolio</title>"));
  }

  #[test]
  fn project_page_has_body_toc_and_cover() {
    let project = Project {
      slug: "pipeline".into(),
      title: "Pipeline".into(),
      cover_image_path: Some("projects/c.png".into()),
      ..Project::default()
    };
    let markdown = "# Pipeline\n## 문제 정의";
    let document = RenderedDocument {
      html:  "<h1 id=\"pipeline\">Pipeline</h1>".into(),
      toc:   extract_toc(markdown),
      title: Some("Pipeline".into()),
    };

    let html = render_project(
      &Config::default(),
      &project,
      &document,
      Some("<p>sum</p>"),
      &resolver(),
    )
    .unwrap();
    assert!(html.contains("<h1 id=\"pipeline\">Pipeline</h1>"));
    assert!(html.contains("toc-level-2\"><a href=\"#문제-정의\">"));
    assert!(html.contains(r#"data-lightbox-external="https://cdn.dev/b/projects/c.png""#));
    assert!(html.contains("<p>sum</p>"));
    assert!(html.contains("../../assets/default.css"));
    assert!(html.contains("class=\"heading-32_b\""));
  }

  #[test]
  fn template_dir_overrides_embedded_templates() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
      dir.path().join("index.html"),
      "{{ site_title }}:{{ cards | length }}",
    )
    .unwrap();
    let config = Config {
      title: "Mine".into(),
      template_dir: Some(dir.path().to_path_buf()),
      ..Config::default()
    };

    assert_eq!(render_index(&config, None, &[]).unwrap(), "Mine:0");
    // No override for the project page, so the embedded one is used.
    let content =
      get_template_content(&config, "project.html", templates::PROJECT_TEMPLATE)
        .unwrap();
    assert_eq!(content, templates::PROJECT_TEMPLATE);
  }
}
