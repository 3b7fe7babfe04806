//! Template resolution, layout, and copying
//!
//! This module provides:
//! - The bundled default template set compiled into the binary
//! - The `template.yaml` layout describing directories and files
//! - Resolution of logical names (user override first, then bundled)
//! - Rendering and writing templates into a project

pub mod bundled;
pub mod copier;
pub mod layout;
pub mod resolver;

pub use bundled::BundledTemplates;
pub use copier::{copy_templates, write_file};
pub use layout::{
    Condition, LayoutFile, TemplateLayout, LAYOUT_TEMPLATE, MANIFEST_TOML_TEMPLATE,
    PROJECT_NAME_TOKEN, REQUIREMENTS_TEMPLATE, REQUIRED_TEMPLATES,
};
pub use resolver::{render_str, RenderContext, Template, TemplateResolver, TemplateSource};
