//! Flat `requirements.txt` merging

use crate::environment::{normalize_name, requirement_name, InstallResult};
use std::collections::{BTreeMap, HashSet};

/// Merge install results into existing requirement lines.
///
/// Every package named in `results` loses its old lines; succeeded ones come
/// back pinned to the resolved version. Lines for other packages are kept,
/// including several lines for one name (environment markers). Comments,
/// pip options and bare URL or path lines are kept ahead of the
/// requirements, which are sorted by normalized name. Identical lines are
/// written once. Applying the same results to the output again changes
/// nothing.
pub fn write_requirements(results: &[InstallResult], existing: &str) -> String {
    let touched: HashSet<String> = results
        .iter()
        .map(|r| r.spec().normalized_name())
        .collect();

    let mut preamble: Vec<&str> = Vec::new();
    let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for line in existing.lines().map(str::trim).filter(|l| !l.is_empty()) {
        match requirement_name(line) {
            Some(name) => {
                let key = normalize_name(name);
                if touched.contains(&key) {
                    continue;
                }
                let lines = entries.entry(key).or_default();
                if !lines.iter().any(|l| l == line) {
                    lines.push(line.to_string());
                }
            }
            None => {
                if !preamble.contains(&line) {
                    preamble.push(line);
                }
            }
        }
    }

    for result in results {
        if let Some(pinned) = result.pinned_requirement() {
            entries.insert(result.spec().normalized_name(), vec![pinned]);
        }
    }

    preamble
        .into_iter()
        .map(str::to_string)
        .chain(entries.into_values().flatten())
        .map(|line| line + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{FailureReason, PackageSpec};

    fn results() -> Vec<InstallResult> {
        vec![
            InstallResult::succeeded(PackageSpec::latest("pytest"), "8.2.0", 1),
            InstallResult::failed(
                PackageSpec::pinned("not-a-real-pkg-xyz", "1.0"),
                FailureReason::NotFound,
                1,
            ),
            InstallResult::succeeded(PackageSpec::pinned("Black", "24.1.0"), "24.1.0", 1),
        ]
    }

    #[test]
    fn test_only_successes_are_written() {
        let out = write_requirements(&results(), "");
        assert_eq!(out, "Black==24.1.0\npytest==8.2.0\n");
        assert!(!out.contains("not-a-real-pkg-xyz"));
    }

    #[test]
    fn test_manual_entries_survive() {
        let existing = "# pinned by hand\nrequests>=2.0\npytest==7.0.0\n\n-r dev.txt\n";
        let out = write_requirements(&results(), existing);
        assert_eq!(
            out,
            "# pinned by hand\n-r dev.txt\nBlack==24.1.0\npytest==8.2.0\nrequests>=2.0\n"
        );
    }

    #[test]
    fn test_marker_variants_and_url_lines_survive() {
        let existing = "numpy<2; python_version<'3.9'\n\
                        numpy>=2; python_version>='3.9'\n\
                        git+https://github.com/a/one.git\n\
                        git+https://github.com/b/two.git\n\
                        numpy<2; python_version<'3.9'\n";
        let out = write_requirements(&results(), existing);
        assert_eq!(
            out,
            "git+https://github.com/a/one.git\n\
             git+https://github.com/b/two.git\n\
             Black==24.1.0\n\
             numpy<2; python_version<'3.9'\n\
             numpy>=2; python_version>='3.9'\n\
             pytest==8.2.0\n"
        );
        assert_eq!(write_requirements(&results(), &out), out);
    }

    #[test]
    fn test_stale_entry_with_other_spelling_is_replaced() {
        let out = write_requirements(&results(), "black==23.0\n");
        assert_eq!(out, "Black==24.1.0\npytest==8.2.0\n");
    }

    #[test]
    fn test_idempotent() {
        let once = write_requirements(&results(), "requests\n# note\n");
        let twice = write_requirements(&results(), &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_nothing_installed_keeps_manual_lines() {
        assert_eq!(write_requirements(&[], ""), "");
        assert_eq!(write_requirements(&[], "flask\n"), "flask\n");
    }
}
