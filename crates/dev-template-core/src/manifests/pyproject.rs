//! Structured `pyproject.toml` merging

use crate::environment::{normalize_name, requirement_name, InstallResult};
use crate::error::ManifestError;
use std::collections::BTreeMap;
use toml::{Table, Value};

/// Where a dependencies declaration may live, in lookup order
const DEPENDENCY_PATHS: &[&[&str]] = &[
    &["project", "dependencies"],
    &["tool", "poetry", "dependencies"],
    &["dependencies"],
];

/// Merge succeeded results into the document's dependencies declaration.
///
/// Supports a PEP 621 array of requirement strings and a Poetry-style table
/// of `name = "version"`. An entry for the same package (compared by
/// normalized name) is overwritten in place, new packages are appended in
/// name order. A document without a declaration is a
/// [`ManifestError::Shape`], even when there is nothing to merge.
pub fn write_manifest_toml(
    results: &[InstallResult],
    existing: &str,
) -> Result<String, ManifestError> {
    let mut doc: Table = toml::from_str(existing)?;

    let path = DEPENDENCY_PATHS
        .iter()
        .copied()
        .find(|path| lookup(&doc, path).is_some())
        .ok_or_else(|| {
            ManifestError::Shape(
                "no [project] dependencies array or dependencies table".to_string(),
            )
        })?;
    let dotted = path.join(".");

    let pins: BTreeMap<String, (&str, &str)> = results
        .iter()
        .filter_map(|r| {
            let version = r.resolved_version()?;
            Some((r.spec().normalized_name(), (r.spec().name.as_str(), version)))
        })
        .collect();

    let deps = lookup_mut(&mut doc, path)
        .ok_or_else(|| ManifestError::Shape(format!("`{}` disappeared", dotted)))?;

    match deps {
        Value::Array(items) => merge_array(items, &pins, &dotted)?,
        Value::Table(table) => merge_table(table, &pins),
        _ => {
            return Err(ManifestError::Shape(format!(
                "`{}` must be an array of strings or a table",
                dotted
            )))
        }
    }

    if pins.is_empty() {
        return Ok(existing.to_string());
    }
    Ok(toml::to_string_pretty(&doc)?)
}

fn merge_array(
    items: &mut Vec<Value>,
    pins: &BTreeMap<String, (&str, &str)>,
    dotted: &str,
) -> Result<(), ManifestError> {
    let mut seen = Vec::new();
    for item in items.iter_mut() {
        let Value::String(line) = item else {
            return Err(ManifestError::Shape(format!(
                "`{}` must only contain strings",
                dotted
            )));
        };
        let Some(key) = requirement_name(line).map(normalize_name) else {
            continue;
        };
        if let Some((name, version)) = pins.get(&key) {
            *line = format!("{}=={}", name, version);
            seen.push(key);
        }
    }

    for (key, (name, version)) in pins {
        if !seen.contains(key) {
            items.push(Value::String(format!("{}=={}", name, version)));
        }
    }
    Ok(())
}

fn merge_table(table: &mut Table, pins: &BTreeMap<String, (&str, &str)>) {
    for (key, (name, version)) in pins {
        let stale: Vec<String> = table
            .keys()
            .filter(|k| normalize_name(k) == *key && k.as_str() != *name)
            .cloned()
            .collect();
        for k in stale {
            table.remove(&k);
        }
        table.insert(name.to_string(), Value::String(version.to_string()));
    }
}

fn lookup<'a>(doc: &'a Table, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut table = doc;
    for key in parents {
        table = table.get(*key)?.as_table()?;
    }
    table.get(*last)
}

fn lookup_mut<'a>(doc: &'a mut Table, path: &[&str]) -> Option<&'a mut Value> {
    let (last, parents) = path.split_last()?;
    let mut table = doc;
    for key in parents {
        table = table.get_mut(*key)?.as_table_mut()?;
    }
    table.get_mut(*last)
}
