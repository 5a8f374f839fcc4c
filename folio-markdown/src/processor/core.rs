//! Core implementation of the Markdown processor.
//!
//! Rendering runs in three steps: comrak parses and renders the document,
//! kuchiki post-processes the HTML, and the block lists are collected along
//! the way. Raw HTML in the source is never passed through.
use comrak::{
  Arena,
  nodes::{AstNode, NodeHeading, NodeValue},
  options::Options,
  parse_document,
};
use kuchikikiki::NodeRef;
use log::trace;

use super::{
  process::process_safe,
  types::{
    AstTransformer,
    CardTransformer,
    MarkdownOptions,
    MarkdownProcessor,
    RenderMode,
  },
};
use crate::{
  callout::CalloutVariant,
  toc::extract_toc,
  types::{CodeBlock, DiagramBlock, MarkdownResult},
  utils::{SLOT_TAG, language_from_class, new_element, serialize_body, slugify},
};

/// Fence language routed to the diagram renderer.
const DIAGRAM_LANGUAGE: &str = "mermaid";

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  #[must_use]
  pub const fn new(options: MarkdownOptions) -> Self {
    Self { options }
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Render Markdown to HTML, collecting the table of contents, title and
  /// the code and diagram blocks left as slots.
  #[must_use]
  pub fn render(&self, markdown: &str) -> MarkdownResult {
    let toc = match self.options.mode {
      RenderMode::Document => extract_toc(markdown),
      RenderMode::Card => Vec::new(),
    };
    let (html, title) = self.convert_to_html(markdown);

    let mut blocks = Blocks::default();
    let html = kuchiki_postprocess_html(&html, |document| {
      match self.options.mode {
        RenderMode::Document => {
          blocks = self.apply_document_transformations(document);
        },
        RenderMode::Card => apply_card_transformations(document),
      }
    });
    trace!(
      "Rendered markdown with {} code and {} diagram blocks",
      blocks.code.len(),
      blocks.diagrams.len()
    );

    MarkdownResult {
      html,
      toc,
      title,
      code_blocks: blocks.code,
      diagrams: blocks.diagrams,
    }
  }

  /// Convert markdown to HTML using comrak, returning the first level 1
  /// heading's text alongside.
  fn convert_to_html(&self, content: &str) -> (String, Option<String>) {
    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, content, &options);

    let title = root.descendants().find_map(|node| {
      match &node.data.borrow().value {
        NodeValue::Heading(NodeHeading { level: 1, .. }) => {
          Some(extract_inline_text(node).trim().to_string())
        },
        _ => None,
      }
    });

    if self.options.mode == RenderMode::Card {
      CardTransformer.transform(root);
    }

    let mut html_output = String::new();
    comrak::format_html(root, &options, &mut html_output).unwrap_or_default();
    (html_output, title)
  }

  /// Build comrak options from `MarkdownOptions`.
  fn comrak_options(&self) -> Options<'static> {
    let mut options = Options::default();
    if self.options.gfm {
      options.extension.table = true;
      options.extension.footnotes = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    // Author HTML is dropped; every override happens on the DOM afterwards.
    options.render.r#unsafe = false;
    options.extension.header_ids = None;
    options
  }

  fn apply_document_transformations(&self, document: &NodeRef) -> Blocks {
    let blocks = self.extract_fenced_blocks(document);
    add_heading_ids(document);
    classify_blockquotes(document);
    wrap_images(document);
    mark_inline_code(document);
    blocks
  }

  /// Replace every `<pre><code>` with a slot and record its contents.
  fn extract_fenced_blocks(&self, document: &NodeRef) -> Blocks {
    let mut blocks = Blocks::default();
    let Ok(selection) = document.select("pre > code") else {
      return blocks;
    };

    for (index, code) in selection.collect::<Vec<_>>().into_iter().enumerate() {
      let language = code
        .attributes
        .borrow()
        .get("class")
        .and_then(language_from_class);
      let text = code.as_node().text_contents();
      let raw_text = text.strip_suffix('\n').unwrap_or(&text).to_string();

      let slot = if self.options.diagrams
        && language.as_deref() == Some(DIAGRAM_LANGUAGE)
      {
        let slot = format!("diagram-{index}");
        blocks.diagrams.push(DiagramBlock {
          slot: slot.clone(),
          raw_text,
        });
        slot
      } else {
        let slot = format!("code-{index}");
        blocks.code.push(CodeBlock {
          slot: slot.clone(),
          language,
          raw_text,
        });
        slot
      };

      let placeholder = new_element(SLOT_TAG, &[("data-slot", slot.as_str())]);
      match code.as_node().parent() {
        Some(pre) => {
          pre.insert_before(placeholder);
          pre.detach();
        },
        None => code.as_node().insert_before(placeholder),
      }
    }

    blocks
  }
}

#[derive(Debug, Default)]
struct Blocks {
  code:     Vec<CodeBlock>,
  diagrams: Vec<DiagramBlock>,
}

/// Give level 1 and 2 headings an `id` from their slugified text.
fn add_heading_ids(document: &NodeRef) {
  let Ok(headings) = document.select("h1, h2") else {
    return;
  };
  for heading in headings {
    let id = slugify(&heading.as_node().text_contents());
    if !id.is_empty() {
      heading.attributes.borrow_mut().insert("id", id);
    }
  }
}

fn classify_blockquotes(document: &NodeRef) {
  let Ok(quotes) = document.select("blockquote") else {
    return;
  };
  for quote in quotes {
    let variant = CalloutVariant::classify(&quote.as_node().text_contents());
    let mut attributes = quote.attributes.borrow_mut();
    attributes.insert("class", variant.class_name());
    attributes.insert("data-callout", variant.as_str().to_string());
  }
}

/// Wrap each image in a button that opens it in the lightbox.
fn wrap_images(document: &NodeRef) {
  let Ok(selection) = document.select("img") else {
    return;
  };
  for img in selection.collect::<Vec<_>>() {
    let (src, alt) = {
      let attributes = img.attributes.borrow();
      (
        attributes.get("src").unwrap_or_default().to_string(),
        attributes.get("alt").unwrap_or_default().to_string(),
      )
    };
    img
      .attributes
      .borrow_mut()
      .insert("loading", "lazy".to_string());

    let trigger = new_element("button", &[
      ("type", "button"),
      ("class", "lightbox-trigger"),
      ("data-lightbox-kind", "image"),
      ("data-lightbox-src", src.as_str()),
      ("data-lightbox-alt", alt.as_str()),
    ]);
    img.as_node().insert_before(trigger.clone());
    trigger.append(img.as_node().clone());
  }
}

fn mark_inline_code(document: &NodeRef) {
  let Ok(codes) = document.select("code") else {
    return;
  };
  for code in codes {
    let mut attributes = code.attributes.borrow_mut();
    let class = match attributes.get("class") {
      Some(existing) if !existing.is_empty() => format!("{existing} inline-code"),
      _ => "inline-code".to_string(),
    };
    attributes.insert("class", class);
  }
}

/// Flatten block elements into spans for card summaries.
fn apply_card_transformations(document: &NodeRef) {
  replace_tag(document, "h1, h2", "span", &[("class", "font-semibold")]);
  replace_tag(document, "p", "span", &[("class", "block")]);
  replace_tag(document, "blockquote", "span", &[("class", "block quote")]);

  let Ok(selection) = document.select("a") else {
    return;
  };
  for link in selection.collect::<Vec<_>>() {
    let href = link
      .attributes
      .borrow()
      .get("href")
      .unwrap_or_default()
      .to_string();
    let span = new_element("span", &[("class", "underline"), ("title", href.as_str())]);
    move_children(link.as_node(), &span);
    link.as_node().insert_before(span);
    link.as_node().detach();
  }
  mark_inline_code(document);
}

/// Replace every element matching `selector` with a `tag` element carrying
/// `attributes` and the original children.
fn replace_tag(
  document: &NodeRef,
  selector: &str,
  tag: &str,
  attributes: &[(&str, &str)],
) {
  let Ok(selection) = document.select(selector) else {
    return;
  };
  for element in selection.collect::<Vec<_>>() {
    let replacement = new_element(tag, attributes);
    move_children(element.as_node(), &replacement);
    element.as_node().insert_before(replacement);
    element.as_node().detach();
  }
}

fn move_children(from: &NodeRef, to: &NodeRef) {
  for child in from.children().collect::<Vec<_>>() {
    to.append(child);
  }
}

/// Extract all inline text from a heading node.
pub fn extract_inline_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      NodeValue::HtmlInline(_) | NodeValue::Image(..) => {},
      _ => text.push_str(&extract_inline_text(child)),
    }
  }
  text
}

/// Parse `html`, let `transform_fn` rewrite the DOM, and serialize the body
/// back out. A panic returns the input unchanged.
fn kuchiki_postprocess_html<F>(html: &str, transform_fn: F) -> String
where
  F: FnOnce(&NodeRef),
{
  process_safe(
    html,
    |html| {
      use tendril::TendrilSink;

      let document = kuchikikiki::parse_html().one(html);
      transform_fn(&document);
      serialize_body(&document)
    },
    html,
  )
}
