//! Default templates compiled into the binary

/// Files shipped with the tool, keyed by logical name
const PYTHON_TEMPLATES: &[(&str, &str)] = &[
    (
        "template.yaml",
        include_str!("../../templates/python/template.yaml"),
    ),
    ("README.md", include_str!("../../templates/python/README.md")),
    (".gitignore", include_str!("../../templates/python/.gitignore")),
    (
        "requirements.txt",
        include_str!("../../templates/python/requirements.txt"),
    ),
    ("setup.py", include_str!("../../templates/python/setup.py")),
    (
        "pyproject.toml",
        include_str!("../../templates/python/pyproject.toml"),
    ),
    (
        "src/__init__.py",
        include_str!("../../templates/python/src/__init__.py"),
    ),
    (
        "src/main.py",
        include_str!("../../templates/python/src/main.py"),
    ),
    (
        "tests/__init__.py",
        include_str!("../../templates/python/tests/__init__.py"),
    ),
    (
        "tests/test_main.py",
        include_str!("../../templates/python/tests/test_main.py"),
    ),
];

/// The set of bundled fallback templates.
#[derive(Debug, Clone)]
pub struct BundledTemplates {
    files: Vec<(&'static str, &'static str)>,
}

impl BundledTemplates {
    /// The default Python project template set
    pub fn python() -> Self {
        Self {
            files: PYTHON_TEMPLATES.to_vec(),
        }
    }

    /// No bundled fallbacks at all
    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }

    /// Drop one logical name from the set
    pub fn without(mut self, name: &str) -> Self {
        self.files.retain(|(n, _)| *n != name);
        self
    }

    /// Add or replace one logical name
    pub fn with_file(mut self, name: &'static str, content: &'static str) -> Self {
        self.files.retain(|(n, _)| *n != name);
        self.files.push((name, content));
        self
    }

    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.files
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, content)| *content)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate `(logical_name, content)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.files.iter().copied()
    }
}

impl Default for BundledTemplates {
    fn default() -> Self {
        Self::python()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_set_is_complete() {
        let bundled = BundledTemplates::python();
        for name in super::super::layout::REQUIRED_TEMPLATES {
            assert!(bundled.contains(name), "missing bundled template {name}");
        }
        assert!(bundled.contains("template.yaml"));
    }

    #[test]
    fn test_without_and_with_file() {
        let bundled = BundledTemplates::python().without("README.md");
        assert!(!bundled.contains("README.md"));

        let bundled = bundled.with_file("README.md", "# custom\n");
        assert_eq!(bundled.get("README.md"), Some("# custom\n"));
        assert!(BundledTemplates::empty().iter().next().is_none());
    }
}
