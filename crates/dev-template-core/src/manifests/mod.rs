//! Dependency manifest writers
//!
//! Both writers are pure: they take the install results and the current
//! file content and return the new content. Reading and writing the files is
//! left to the pipeline.

pub mod pyproject;
pub mod requirements;

pub use pyproject::write_manifest_toml;
pub use requirements::write_requirements;
