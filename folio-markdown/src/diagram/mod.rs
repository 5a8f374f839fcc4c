//! Mermaid diagram support: init directive preprocessing and asynchronous
//! rendering through a pluggable [`DiagramEngine`].
mod directive;
mod engine;
pub mod frontmatter;
#[cfg(feature = "kroki")] mod kroki;
mod renderer;

pub use directive::{DEFAULT_DIRECTIVE, preprocess};
pub use engine::{DiagramEngine, DiagramError};
#[cfg(feature = "kroki")]
pub use kroki::{DEFAULT_KROKI_URL, KrokiEngine};
pub use renderer::{DiagramOutput, DiagramRenderer, SVG_STYLE, normalize_svg};
