//! Template lookup (user override, then bundled default) and rendering

use super::bundled::BundledTemplates;
use super::layout::{TemplateLayout, LAYOUT_TEMPLATE, PROJECT_NAME_TOKEN};
use crate::config::Config;
use crate::error::TemplateError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Token replaced with one `import` line per package
pub const IMPORTS_TOKEN: &str = "{{imports}}";

/// Where a template's content comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// A file in the user's templates directory
    User(PathBuf),
    /// The compiled-in default for a logical name
    Bundled(String),
}

impl TemplateSource {
    pub fn is_user_override(&self) -> bool {
        matches!(self, TemplateSource::User(_))
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateSource::User(path) => write!(f, "{}", path.display()),
            TemplateSource::Bundled(name) => write!(f, "<bundled>/{}", name),
        }
    }
}

/// A resolved template ready to be rendered into a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub logical_name: String,
    pub source: TemplateSource,
    /// Destination relative to the project root
    pub destination: PathBuf,
}

/// Values substituted into templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub project_name: String,
    /// Module names to import in the entry point
    pub imports: Vec<String>,
}

impl RenderContext {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            imports: Vec::new(),
        }
    }

    pub fn with_imports<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports = modules.into_iter().map(Into::into).collect();
        self
    }

    /// The `{{imports}}` replacement: sorted, deduplicated import lines
    /// followed by two blank lines, or nothing when there are no imports
    fn imports_block(&self) -> String {
        let mut modules: Vec<&str> = self.imports.iter().map(String::as_str).collect();
        modules.sort_unstable();
        modules.dedup();
        if modules.is_empty() {
            return String::new();
        }
        let mut block: String = modules.iter().map(|m| format!("import {m}\n")).collect();
        block.push_str("\n\n");
        block
    }
}

/// Substitute every token in `content`. Pure: same input, same output.
pub fn render_str(content: &str, ctx: &RenderContext) -> String {
    content
        .replace(IMPORTS_TOKEN, &ctx.imports_block())
        .replace(PROJECT_NAME_TOKEN, &ctx.project_name)
}

/// Resolves logical template names, preferring user overrides
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    templates_dir: PathBuf,
    bundled: BundledTemplates,
}

impl TemplateResolver {
    pub fn new(templates_dir: impl Into<PathBuf>, bundled: BundledTemplates) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            bundled,
        }
    }

    /// Resolver over the configured templates dir with the Python defaults
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.templates_dir.clone(), BundledTemplates::python())
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Find the source for a logical name
    pub fn resolve(&self, logical_name: &str) -> Result<TemplateSource, TemplateError> {
        let user_path = self.templates_dir.join(logical_name);
        if user_path.is_file() {
            return Ok(TemplateSource::User(user_path));
        }
        if self.bundled.contains(logical_name) {
            return Ok(TemplateSource::Bundled(logical_name.to_string()));
        }
        Err(TemplateError::Missing {
            name: logical_name.to_string(),
            templates_dir: self.templates_dir.clone(),
        })
    }

    /// Raw content of a resolved template
    pub fn read(&self, source: &TemplateSource) -> Result<String, TemplateError> {
        match source {
            TemplateSource::User(path) => {
                std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
                    path: path.clone(),
                    source,
                })
            }
            TemplateSource::Bundled(name) => {
                self.bundled
                    .get(name)
                    .map(str::to_string)
                    .ok_or_else(|| TemplateError::Missing {
                        name: name.clone(),
                        templates_dir: self.templates_dir.clone(),
                    })
            }
        }
    }

    /// Render a resolved template. Never modifies the source.
    pub fn render(
        &self,
        source: &TemplateSource,
        ctx: &RenderContext,
    ) -> Result<String, TemplateError> {
        Ok(render_str(&self.read(source)?, ctx))
    }

    /// Load and validate the project layout
    pub fn load_layout(&self) -> Result<TemplateLayout, TemplateError> {
        let source = self.resolve(LAYOUT_TEMPLATE)?;
        log::debug!("Using template layout from {}", source);
        TemplateLayout::parse(&self.read(&source)?)
    }

    /// Resolve every file the layout enables under `config`.
    ///
    /// Fails on the first missing template, before anything is written.
    pub fn plan(
        &self,
        layout: &TemplateLayout,
        config: &Config,
        project_name: &str,
    ) -> Result<Vec<Template>, TemplateError> {
        layout
            .files_for(config)
            .into_iter()
            .map(|file| {
                Ok(Template {
                    logical_name: file.name.clone(),
                    source: self.resolve(&file.name)?,
                    destination: file.destination_for(project_name),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_user_override_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "# {{project_name}} (mine)\n").unwrap();
        let resolver = TemplateResolver::new(dir.path(), BundledTemplates::python());

        let source = resolver.resolve("README.md").unwrap();
        assert_eq!(source, TemplateSource::User(dir.path().join("README.md")));
        assert!(source.is_user_override());

        let rendered = resolver.render(&source, &RenderContext::new("demo")).unwrap();
        assert_eq!(rendered, "# demo (mine)\n");
    }

    #[test]
    fn test_falls_back_to_bundled() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = TemplateResolver::new(dir.path(), BundledTemplates::python());
        assert_eq!(
            resolver.resolve("setup.py").unwrap(),
            TemplateSource::Bundled("setup.py".to_string())
        );
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = TemplateResolver::new(
            dir.path(),
            BundledTemplates::python().without("README.md"),
        );
        assert!(matches!(
            resolver.resolve("README.md"),
            Err(TemplateError::Missing { name, .. }) if name == "README.md"
        ));
    }

    #[test]
    fn test_render_is_idempotent() {
        let ctx = RenderContext::new("demo").with_imports(["requests", "pytest"]);
        for (_, content) in BundledTemplates::python().iter() {
            assert_eq!(render_str(content, &ctx), render_str(content, &ctx));
        }
    }

    #[test]
    fn test_render_does_not_touch_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "# {{project_name}}\n").unwrap();
        let resolver = TemplateResolver::new(dir.path(), BundledTemplates::empty());

        let source = resolver.resolve("README.md").unwrap();
        resolver.render(&source, &RenderContext::new("demo")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# {{project_name}}\n");
    }

    #[test]
    fn test_imports_block() {
        let content = "{{imports}}def main() -> None:\n    pass\n";

        let plain = render_str(content, &RenderContext::new("demo"));
        assert_eq!(plain, "def main() -> None:\n    pass\n");

        let ctx = RenderContext::new("demo").with_imports(["requests", "attr", "requests"]);
        assert_eq!(
            render_str(content, &ctx),
            "import attr\nimport requests\n\n\ndef main() -> None:\n    pass\n"
        );
    }

    #[test]
    fn test_plan_skips_disabled_files() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = TemplateResolver::new(dir.path(), BundledTemplates::python());
        let layout = resolver.load_layout().unwrap();

        let mut config = Config::defaults(dir.path());
        config.create_setup_file = false;
        let templates = resolver.plan(&layout, &config, "demo").unwrap();

        assert!(templates.iter().all(|t| t.logical_name != "setup.py"));
        let main = templates
            .iter()
            .find(|t| t.logical_name == "src/main.py")
            .unwrap();
        assert_eq!(main.destination, PathBuf::from("src").join("demo").join("main.py"));
    }
}
