//! Writing rendered templates into a project

use super::resolver::{RenderContext, Template, TemplateResolver};
use crate::error::TemplateError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Render every template into `project_root`.
///
/// All templates are rendered before the first write so a bad user template
/// fails the stage without leaving half a project. Returns the written paths.
pub async fn copy_templates(
    resolver: &TemplateResolver,
    templates: &[Template],
    project_root: &Path,
    ctx: &RenderContext,
) -> Result<Vec<PathBuf>, TemplateError> {
    let mut rendered = Vec::with_capacity(templates.len());
    for template in templates {
        let content = resolver.render(&template.source, ctx)?;
        rendered.push((project_root.join(&template.destination), content));
    }

    let mut written = Vec::with_capacity(rendered.len());
    for (target, content) in rendered {
        write_file(&target, &content).await?;
        log::debug!("Wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}

/// Write one file, creating missing parent directories
pub async fn write_file(target: &Path, content: &str) -> Result<(), TemplateError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| TemplateError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(target, content)
        .await
        .map_err(|source| TemplateError::Write {
            path: target.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::templates::BundledTemplates;

    #[tokio::test]
    async fn test_copy_renders_names() {
        let dir = tempfile::tempdir().unwrap();
        let resolver =
            TemplateResolver::new(dir.path().join("templates"), BundledTemplates::python());
        let layout = resolver.load_layout().unwrap();
        let config = Config::defaults(dir.path());
        let templates = resolver.plan(&layout, &config, "demo").unwrap();

        let root = dir.path().join("demo");
        let written = copy_templates(&resolver, &templates, &root, &RenderContext::new("demo"))
            .await
            .unwrap();

        assert_eq!(written.len(), templates.len());
        assert!(root.join("src/demo/main.py").is_file());
        let test_main = std::fs::read_to_string(root.join("tests/test_main.py")).unwrap();
        assert!(test_main.contains("demo.main"));
        assert!(!test_main.contains("{{project_name}}"));
    }

    #[tokio::test]
    async fn test_missing_source_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let templates_dir = dir.path().join("templates");
        std::fs::create_dir_all(&templates_dir).unwrap();
        std::fs::write(templates_dir.join("README.md"), "# {{project_name}}\n").unwrap();

        let resolver = TemplateResolver::new(&templates_dir, BundledTemplates::empty());
        let templates = vec![Template {
            logical_name: "README.md".to_string(),
            source: resolver.resolve("README.md").unwrap(),
            destination: PathBuf::from("README.md"),
        }];
        // The source disappears between planning and copying
        std::fs::remove_file(templates_dir.join("README.md")).unwrap();

        let root = dir.path().join("demo");
        let err = copy_templates(&resolver, &templates, &root, &RenderContext::new("demo"))
            .await
            .unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
        assert!(!root.exists());
    }
}
