//! Python interpreter detection

use std::process::Command;

/// Interpreter names tried in order of preference
const PYTHON_CANDIDATES: &[&str] = &["python3", "python"];

/// Runtime detection result
#[derive(Debug, Clone)]
pub struct RuntimeInfo {
    pub name: &'static str,
    /// Program to invoke (e.g. `python3`)
    pub program: Option<String>,
    pub version: Option<String>,
    pub available: bool,
}

/// Check if a Python 3 interpreter is available
pub fn check_python() -> RuntimeInfo {
    for candidate in PYTHON_CANDIDATES {
        let output = Command::new(candidate).arg("--version").output();

        if let Ok(out) = output {
            if !out.status.success() {
                continue;
            }
            // Python 2 printed its version on stderr
            let mut version = String::from_utf8_lossy(&out.stdout).trim().to_string();
            if version.is_empty() {
                version = String::from_utf8_lossy(&out.stderr).trim().to_string();
            }
            if is_python3(&version) {
                log::debug!("Detected {} via '{}'", version, candidate);
                return RuntimeInfo {
                    name: "Python 3",
                    program: Some(candidate.to_string()),
                    version: Some(version),
                    available: true,
                };
            }
            log::debug!("Ignoring '{}': reports {}", candidate, version);
        }
    }

    RuntimeInfo {
        name: "Python 3",
        program: None,
        version: None,
        available: false,
    }
}

fn is_python3(version_output: &str) -> bool {
    version_output
        .strip_prefix("Python ")
        .is_some_and(|v| v.starts_with('3'))
}
