use std::{fs, path::Path};

use folio_markdown::combine_sections;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// The site owner's profile. `summary` and `skills` are markdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
  pub id:             String,
  pub full_name:      Option<String>,
  pub title:          Option<String>,
  pub summary:        Option<String>,
  pub contact_birth:  Option<String>,
  pub contact_phone:  Option<String>,
  pub contact_email:  Option<String>,
  pub contact_github: Option<String>,
  pub skills:         Option<String>,
}

/// A portfolio project.
///
/// `summary` and the body fields are markdown. When any of the three body
/// sections is filled in, they take precedence over `body`; see
/// [`Project::full_body`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
  pub id:    String,
  pub slug:  String,
  pub title: String,

  pub subtitle:         Option<String>,
  pub period:           Option<String>,
  pub summary:          Option<String>,
  pub body:             Option<String>,
  pub body_intro:       Option<String>,
  pub body_main:        Option<String>,
  pub body_outro:       Option<String>,
  pub cover_image_path: Option<String>,
  pub impact:           Option<String>,
  pub link:             Option<String>,

  pub sort_order: Option<i64>,

  pub type_tags:       Option<Vec<String>>,
  pub tech_stack_tags: Option<Vec<String>>,
  pub theme_tags:      Option<Vec<String>>,
  pub role_tags:       Option<Vec<String>>,
  pub keywords:        Option<Vec<String>>,

  pub title_typography:    Option<String>,
  pub subtitle_typography: Option<String>,
  pub body_typography:     Option<String>,
}

impl Project {
  /// The markdown shown on the project page.
  ///
  /// The intro, main and outro sections joined by horizontal rules if any of
  /// them has content, otherwise `body`, otherwise an empty string.
  #[must_use]
  pub fn full_body(&self) -> String {
    let sections = [&self.body_intro, &self.body_main, &self.body_outro]
      .map(|section| section.as_deref().unwrap_or_default());

    if sections.iter().any(|section| !section.trim().is_empty()) {
      combine_sections(&sections)
    } else {
      self.body.clone().unwrap_or_default()
    }
  }
}

/// Whether `slug` can name a page directory under the output root.
///
/// Empty slugs, path separators and `.`/`..` components are rejected.
#[must_use]
pub fn is_safe_slug(slug: &str) -> bool {
  !slug.trim().is_empty()
    && !slug.contains(['/', '\\'])
    && !slug.contains("..")
    && slug != "."
}

/// A complete content export: the profile and every project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteData {
  pub profile:  Option<Profile>,
  pub projects: Vec<Project>,
}

impl SiteData {
  /// Load an export from a JSON or TOML file, chosen by extension.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or has an
  /// unsupported extension.
  pub fn from_file(path: &Path) -> Result<Self, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| {
      LoadError::Io {
        path: path.display().to_string(),
        source,
      }
    })?;

    match path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase)
      .as_deref()
    {
      Some("json") => Ok(serde_json::from_str(&content)?),
      Some("toml") => Ok(toml::from_str(&content)?),
      _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  fn project() -> Project {
    Project {
      id: "p1".into(),
      slug: "pipeline".into(),
      title: "Pipeline".into(),
      ..Project::default()
    }
  }

  #[test]
  fn slug_safety() {
    assert!(is_safe_slug("pipeline"));
    assert!(is_safe_slug("v1.2"));
    for slug in ["", "  ", ".", "..", "../escaped", "a/b", "a\\b", "C:\\x"] {
      assert!(!is_safe_slug(slug), "{slug}");
    }
  }

  #[test]
  fn full_body_prefers_sections() {
    let project = Project {
      body: Some("legacy".into()),
      body_intro: Some(" A ".into()),
      body_main: Some("   ".into()),
      body_outro: Some("C".into()),
      ..project()
    };
    assert_eq!(project.full_body(), "A\n\n---\n\nC");
  }

  #[test]
  fn full_body_falls_back_to_body() {
    let project = Project {
      body: Some("legacy".into()),
      body_intro: Some("  \n".into()),
      ..project()
    };
    assert_eq!(project.full_body(), "legacy");
    assert_eq!(super::Project::default().full_body(), "");
  }

  #[test]
  fn site_data_loads_json_with_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.json");
    fs::write(
      &path,
      r#"{"profile": {"id": "me", "full_name": "Jiin"},
          "projects": [{"id": "p1", "slug": "a", "title": "A", "sort_order": 2,
                        "tech_stack_tags": ["Rust"]}]}"#,
    )
    .unwrap();

    let data = SiteData::from_file(&path).unwrap();
    assert_eq!(data.profile.unwrap().full_name.as_deref(), Some("Jiin"));
    assert_eq!(data.projects[0].sort_order, Some(2));
    assert_eq!(data.projects[0].subtitle, None);
  }

  #[test]
  fn site_data_loads_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.toml");
    fs::write(
      &path,
      "[[projects]]\nid = \"p1\"\nslug = \"a\"\ntitle = \"A\"\nbody_main = \
       \"# Hi\"\n",
    )
    .unwrap();

    let data = SiteData::from_file(&path).unwrap();
    assert!(data.profile.is_none());
    assert_eq!(data.projects[0].full_body(), "# Hi");
  }

  #[test]
  fn site_data_rejects_unknown_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("site.csv");
    fs::write(&path, "").unwrap();
    assert!(matches!(
      SiteData::from_file(&path),
      Err(LoadError::UnsupportedFormat(_))
    ));
  }
}
