//! Package specifiers (`name` or `name==version`)

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Operator characters that only appear in range constraints
const RANGE_OPERATORS: &[char] = &['<', '>', '!', '~', '=', ','];

/// A package name optionally pinned to an exact version.
///
/// No version constraint means "latest available".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageSpec {
    pub name: String,
    pub version_constraint: Option<String>,
}

impl PackageSpec {
    /// Create a spec for the latest version of `name`
    pub fn latest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_constraint: None,
        }
    }

    /// Create a spec pinned to `version`
    pub fn pinned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_constraint: Some(version.into()),
        }
    }

    /// Parse a single specifier such as `requests` or `pytest==8.2.0`
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let trimmed = input.trim();
        let invalid = |reason: &str| ConfigError::InvalidPackageSpec {
            spec: trimmed.to_string(),
            reason: reason.to_string(),
        };

        let (name, version) = match trimmed.split_once("==") {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (trimmed, None),
        };

        if name.is_empty() {
            return Err(invalid("package name is empty"));
        }
        if !is_valid_name(name) {
            if name.contains(RANGE_OPERATORS) {
                return Err(invalid("only exact '==' version pins are supported"));
            }
            return Err(invalid(
                "names may only contain letters, digits, '-', '_' and '.'",
            ));
        }

        let version_constraint = match version {
            Some("") => return Err(invalid("version after '==' is empty")),
            Some(v) if v.contains(RANGE_OPERATORS) || v.contains(char::is_whitespace) => {
                return Err(invalid("only a single exact version may follow '=='"));
            }
            Some(v) => Some(v.to_string()),
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            version_constraint,
        })
    }

    /// Parse a comma-delimited list, skipping empty entries
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ConfigError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::parse)
            .collect()
    }

    /// Render a list back into its comma-delimited form
    pub fn join(specs: &[PackageSpec]) -> String {
        specs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Name normalized for comparison (`Foo_Bar.baz` -> `foo-bar-baz`)
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    /// Best-effort import name for the package
    pub fn module_name(&self) -> String {
        self.name.replace(['-', '.'], "_").to_lowercase()
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version_constraint {
            Some(version) => write!(f, "{}=={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for PackageSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Normalize a distribution name so `Foo_Bar`, `foo-bar` and `foo.bar` compare equal
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_was_sep {
                out.push('-');
            }
            last_was_sep = true;
        } else {
            out.extend(c.to_lowercase());
            last_was_sep = false;
        }
    }
    out
}

/// Extract the distribution name from a requirement line.
///
/// Returns `None` for comments, blank lines, pip options like `-r`, and
/// bare URL or path lines (`git+https://...`, `./local`), which carry no name.
pub fn requirement_name(line: &str) -> Option<&str> {
    let line = line.trim();
    if !line.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }
    let end = line
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(line.len());
    let (name, rest) = line.split_at(end);
    if rest.starts_with(['+', ':', '/', '\\']) {
        return None;
    }
    Some(name)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_latest() {
        let spec = PackageSpec::parse("  requests ").unwrap();
        assert_eq!(spec, PackageSpec::latest("requests"));
        assert_eq!(spec.to_string(), "requests");
    }

    #[test]
    fn test_parse_pinned() {
        let spec = PackageSpec::parse("not-a-real-pkg-xyz==1.0").unwrap();
        assert_eq!(spec.name, "not-a-real-pkg-xyz");
        assert_eq!(spec.version_constraint.as_deref(), Some("1.0"));
        assert_eq!(spec.to_string(), "not-a-real-pkg-xyz==1.0");
    }

    #[test]
    fn test_parse_rejects_ranges() {
        assert!(PackageSpec::parse("django>=4").is_err());
        assert!(PackageSpec::parse("django==4,<5").is_err());
        assert!(PackageSpec::parse("django~=4.2").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_parts() {
        assert!(PackageSpec::parse("==1.0").is_err());
        assert!(PackageSpec::parse("flask==").is_err());
        assert!(PackageSpec::parse("-flask").is_err());
    }

    #[test]
    fn test_parse_list() {
        let specs = PackageSpec::parse_list("pytest, , black==24.1.0,").unwrap();
        assert_eq!(
            specs,
            vec![
                PackageSpec::latest("pytest"),
                PackageSpec::pinned("black", "24.1.0"),
            ]
        );
        assert_eq!(PackageSpec::join(&specs), "pytest, black==24.1.0");
        assert!(PackageSpec::parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Foo_Bar.baz"), "foo-bar-baz");
        assert_eq!(normalize_name("foo--bar"), "foo-bar");
        assert_eq!(
            PackageSpec::latest("Python-Dateutil").normalized_name(),
            "python-dateutil"
        );
    }

    #[test]
    fn test_module_name() {
        assert_eq!(PackageSpec::latest("python-dateutil").module_name(), "python_dateutil");
        assert_eq!(PackageSpec::latest("PyYAML").module_name(), "pyyaml");
        assert_eq!(PackageSpec::latest("ruamel.yaml").module_name(), "ruamel_yaml");
    }

    #[test]
    fn test_requirement_name() {
        assert_eq!(requirement_name("pytest==8.2.0"), Some("pytest"));
        assert_eq!(requirement_name("requests[socks]>=2"), Some("requests"));
        assert_eq!(requirement_name("  numpy ; python_version > '3'"), Some("numpy"));
        assert_eq!(requirement_name("# pinned by hand"), None);
        assert_eq!(requirement_name("-r base.txt"), None);
        assert_eq!(requirement_name(""), None);
        assert_eq!(requirement_name("git+https://github.com/a/one.git"), None);
        assert_eq!(requirement_name("https://example.com/pkg-1.0.tar.gz"), None);
        assert_eq!(requirement_name("./vendor/pkg"), None);
        assert_eq!(
            requirement_name("pkg @ git+https://github.com/a/pkg.git"),
            Some("pkg")
        );
    }
}
