use std::fmt::Write;

use folio_content::Project;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Tag list classes, in display order.
const TAG_GROUPS: [&str; 3] = ["tag-type", "tag-tech", "tag-theme"];

/// Markup for a project's tags and facts: type, tech and theme tags, then
/// period, role, link and impact.
///
/// Cards are links themselves, so they pass `include_link = false` to avoid
/// nesting anchors.
#[must_use]
pub fn generate_meta_tags(project: &Project, include_link: bool) -> String {
  let mut html = String::from("<div class=\"meta-tags\">");

  let groups = [
    &project.type_tags,
    &project.tech_stack_tags,
    &project.theme_tags,
  ];
  if groups.iter().any(|tags| tags.as_ref().is_some_and(|t| !t.is_empty())) {
    html.push_str("<div class=\"tag-list\">");
    for (class, tags) in TAG_GROUPS.iter().zip(groups) {
      for tag in tags.iter().flatten() {
        // Writing to String is infallible
        let _ = write!(html, "<span class=\"tag {class}\">{}</span>", encode_text(tag));
      }
    }
    html.push_str("</div>");
  }

  let mut facts = String::new();
  if let Some(period) = &project.period {
    push_fact(&mut facts, "Period", &encode_text(period), false);
  }
  if let Some(roles) = project.role_tags.as_ref().filter(|roles| !roles.is_empty()) {
    push_fact(&mut facts, "Role", &encode_text(&roles.join(" / ")), false);
  }
  if include_link && let Some(link) = &project.link {
    let shown = link
      .strip_prefix("https://")
      .or_else(|| link.strip_prefix("http://"))
      .unwrap_or(link);
    let anchor = format!(
      "<a href=\"{href}\" title=\"{href}\" target=\"_blank\" \
       rel=\"noopener noreferrer\">{}</a>",
      encode_text(shown),
      href = encode_double_quoted_attribute(link),
    );
    push_fact(&mut facts, "Link", &anchor, true);
  }
  if let Some(impact) = &project.impact {
    let value = format!("<span class=\"meta-impact\">{}</span>", encode_text(impact));
    push_fact(&mut facts, "Impact", &value, true);
  }
  if !facts.is_empty() {
    let _ = write!(html, "<div class=\"meta-facts\">{facts}</div>");
  }

  html.push_str("</div>");
  html
}

fn push_fact(out: &mut String, label: &str, value_html: &str, wide: bool) {
  let class = if wide {
    "meta-fact meta-fact-wide"
  } else {
    "meta-fact"
  };
  let _ = write!(
    out,
    "<div class=\"{class}\"><span class=\"meta-label\">{label}</span><span \
     class=\"meta-value\">{value_html}</span></div>"
  );
}
