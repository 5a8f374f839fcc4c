#![allow(clippy::unwrap_used, reason = "Fine in tests")]
use std::fs;

use folio::site;
use folio_config::Config;

const SITE: &str = r#"{
  "profile": {
    "full_name": "Jiin Lee",
    "title": "Backend Engineer",
    "contact_email": "jiin@example.dev",
    "skills": "- Rust\n- PostgreSQL"
  },
  "projects": [
    {
      "id": "b",
      "slug": "search",
      "title": "Search",
      "sort_order": 2,
      "body": "# Search\n\n> ✅ Index by trigram"
    },
    {
      "id": "a",
      "slug": "pipeline",
      "title": "Pipeline",
      "sort_order": 1,
      "tech_stack_tags": ["Python"],
      "link": "https://github.com/jiin/pipeline",
      "body_intro": "# Pipeline",
      "body_main": "## Design\n\n```mermaid\ngraph TD; A-->B\n```",
      "body_outro": "## Result"
    }
  ]
}"#;

fn config(root: &std::path::Path) -> Config {
  let data_file = root.join("site.json");
  fs::write(&data_file, SITE).unwrap();
  Config::load(&[], &[
    format!("data_file={}", data_file.display()),
    format!("output_dir={}", root.join("public").display()),
    "diagrams.enable=false".to_string(),
    "highlight_code=false".to_string(),
  ])
  .unwrap()
}

#[test]
fn builds_every_page_in_sort_order() {
  let dir = tempfile::tempdir().unwrap();
  let config = config(dir.path());

  let pages = site::build(&config).unwrap();
  assert_eq!(pages.len(), 3);

  let public = dir.path().join("public");
  let index = fs::read_to_string(public.join("index.html")).unwrap();
  let pipeline = index.find("projects/pipeline/index.html").unwrap();
  let search = index.find("projects/search/index.html").unwrap();
  assert!(pipeline < search);
  assert!(index.contains("<li>Rust</li>"));
  assert!(index.contains("mailto:jiin@example.dev"));

  let page = fs::read_to_string(public.join("projects/pipeline/index.html")).unwrap();
  assert!(page.contains("<hr"));
  assert!(page.contains(r##"href="#design""##));
  assert!(page.contains(">github.com/jiin/pipeline</a>"));

  let search = fs::read_to_string(public.join("projects/search/index.html")).unwrap();
  assert!(search.contains("callout callout-result"));
}

#[test]
fn assets_can_be_overridden() {
  let dir = tempfile::tempdir().unwrap();
  let templates = dir.path().join("templates");
  fs::create_dir_all(&templates).unwrap();
  fs::write(templates.join("default.css"), "body { color: red; }").unwrap();

  let mut config = config(dir.path());
  config.template_dir = Some(templates);
  site::build(&config).unwrap();

  let assets = dir.path().join("public/assets");
  assert_eq!(
    fs::read_to_string(assets.join("default.css")).unwrap(),
    "body { color: red; }"
  );
  assert_eq!(
    fs::read_to_string(assets.join("main.js")).unwrap(),
    folio_templates::MAIN_JS
  );
}

#[test]
fn missing_data_file_fails_validation() {
  let dir = tempfile::tempdir().unwrap();
  let config = Config {
    output_dir: dir.path().to_path_buf(),
    ..Config::default()
  };
  let err = site::build(&config).unwrap_err();
  assert!(format!("{err:?}").contains("No data file configured"));
}
