//! Template-facing views of the content records.
//!
//! Markdown fields arrive already rendered; everything else is plain text
//! that the templates escape.
use folio_content::{ImageUrlResolver, Profile, Project};
use serde::Serialize;

use crate::meta::generate_meta_tags;

/// One line of the profile's contact list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
  pub kind: &'static str,
  pub text: String,
  pub href: Option<String>,
}

/// Profile header shown on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
  pub full_name:    String,
  pub title:        Option<String>,
  pub contacts:     Vec<Contact>,
  pub summary_html: Option<String>,
  pub skills_html:  Option<String>,
}

impl ProfileView {
  /// `fallback_name` is shown when the profile has no name.
  #[must_use]
  pub fn new(
    profile: &Profile,
    fallback_name: &str,
    summary_html: Option<String>,
    skills_html: Option<String>,
  ) -> Self {
    let contact = |kind, value: &Option<String>, href: fn(&str) -> Option<String>| {
      value
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .map(|text| {
          Contact {
            kind,
            text: text.to_string(),
            href: href(text),
          }
        })
    };

    let contacts = [
      contact("birth", &profile.contact_birth, |_| None),
      contact("phone", &profile.contact_phone, |phone| {
        Some(format!("tel:{}", phone.replace([' ', '-'], "")))
      }),
      contact("email", &profile.contact_email, |email| {
        Some(format!("mailto:{email}"))
      }),
      contact("github", &profile.contact_github, |github| {
        Some(absolute_url(github))
      }),
    ]
    .into_iter()
    .flatten()
    .collect();

    Self {
      full_name: profile
        .full_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback_name.to_string()),
      title: profile.title.clone(),
      contacts,
      summary_html,
      skills_html,
    }
  }
}

/// A project summary on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
  pub href:           String,
  pub title:          String,
  pub title_class:    String,
  pub subtitle:       Option<String>,
  pub subtitle_class: String,
  pub summary_html:   Option<String>,
  pub cover_url:      Option<String>,
  pub meta_html:      String,
}

impl CardView {
  /// `summary_html` is the card-mode rendering of the project summary.
  #[must_use]
  pub fn new(
    project: &Project,
    summary_html: Option<String>,
    resolver: &dyn ImageUrlResolver,
  ) -> Self {
    Self {
      href: project_href(&project.slug),
      title: project.title.clone(),
      title_class: class_or(project.title_typography.as_deref(), "heading-24_b"),
      subtitle: project.subtitle.clone(),
      subtitle_class: class_or(project.subtitle_typography.as_deref(), "title-16_sb"),
      summary_html,
      cover_url: project
        .cover_image_path
        .as_deref()
        .map(|path| resolver.resolve(path)),
      meta_html: generate_meta_tags(project, false),
    }
  }
}

/// Heading block of a project page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectView {
  pub title:          String,
  pub title_class:    String,
  pub subtitle:       Option<String>,
  pub subtitle_class: String,
  pub body_class:     String,
}

impl From<&Project> for ProjectView {
  fn from(project: &Project) -> Self {
    Self {
      title:          project.title.clone(),
      title_class:    class_or(project.title_typography.as_deref(), "heading-32_b"),
      subtitle:       project.subtitle.clone(),
      subtitle_class: class_or(
        project.subtitle_typography.as_deref(),
        "title-20_sb",
      ),
      body_class:     class_or(project.body_typography.as_deref(), "body-16_r"),
    }
  }
}

/// Site-relative link to a project page, from the index.
#[must_use]
pub fn project_href(slug: &str) -> String {
  format!("projects/{slug}/index.html")
}

fn class_or(class: Option<&str>, default: &str) -> String {
  class
    .filter(|class| !class.trim().is_empty())
    .unwrap_or(default)
    .to_string()
}

fn absolute_url(url: &str) -> String {
  if url.starts_with("http://") || url.starts_with("https://") {
    url.to_string()
  } else {
    format!("https://{url}")
  }
}

#[cfg(test)]
mod tests {
  use folio_content::PublicUrlResolver;

  use super::*;

  #[test]
  fn contacts_skip_blank_fields_and_link_where_useful() {
    let profile = Profile {
      contact_phone: Some("010-1234 5678".into()),
      contact_email: Some("me@x.dev".into()),
      contact_github: Some("github.com/me".into()),
      contact_birth: Some("  ".into()),
      ..Profile::default()
    };
    let view = ProfileView::new(&profile, "Portfolio", None, None);

    let kinds: Vec<_> = view.contacts.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, ["phone", "email", "github"]);
    assert_eq!(view.contacts[0].href.as_deref(), Some("tel:01012345678"));
    assert_eq!(view.contacts[1].href.as_deref(), Some("mailto:me@x.dev"));
    assert_eq!(
      view.contacts[2].href.as_deref(),
      Some("https://github.com/me")
    );
    assert_eq!(view.full_name, "Portfolio");
  }

  #[test]
  fn cards_default_typography_and_resolve_covers() {
    let project = Project {
      slug: "pipeline".into(),
      title: "Pipeline".into(),
      cover_image_path: Some("projects/a.png".into()),
      subtitle_typography: Some(String::new()),
      ..Project::default()
    };
    let resolver = PublicUrlResolver {
      public_url: "https://cdn.dev".into(),
      bucket:     "b".into(),
    };
    let card = CardView::new(&project, None, &resolver);

    assert_eq!(card.href, "projects/pipeline/index.html");
    assert_eq!(card.title_class, "heading-24_b");
    assert_eq!(card.subtitle_class, "title-16_sb");
    assert_eq!(
      card.cover_url.as_deref(),
      Some("https://cdn.dev/b/projects/a.png")
    );
  }

  #[test]
  fn project_view_keeps_chosen_typography() {
    let project = Project {
      title_typography: Some("heading-24_b".into()),
      ..Project::default()
    };
    let view = ProjectView::from(&project);
    assert_eq!(view.title_class, "heading-24_b");
    assert_eq!(view.subtitle_class, "title-20_sb");
    assert_eq!(view.body_class, "body-16_r");
  }
}
