use std::collections::HashMap;

pub const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
pub const PROJECT_TEMPLATE: &str = include_str!("../templates/project.html");

pub const DEFAULT_CSS: &str = include_str!("../templates/default.css");
pub const MAIN_JS: &str = include_str!("../templates/main.js");

#[must_use]
pub fn all_templates() -> HashMap<&'static str, &'static str> {
  let mut templates = HashMap::new();
  templates.insert("index.html", INDEX_TEMPLATE);
  templates.insert("project.html", PROJECT_TEMPLATE);
  templates.insert("default.css", DEFAULT_CSS);
  templates.insert("main.js", MAIN_JS);
  templates
}
