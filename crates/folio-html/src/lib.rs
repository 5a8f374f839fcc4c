//! Page composition for folio sites.
//!
//! Turns records and already rendered markdown into complete pages using the
//! embedded `tera` templates, or overrides from the configured template
//! directory.
pub mod meta;
pub mod template;
pub mod toc;
pub mod view;

pub use template::{render_index, render_project};
pub use view::{CardView, Contact, ProfileView, ProjectView};
