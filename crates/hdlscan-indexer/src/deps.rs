//! Second-pass extraction of qualified `library.unit` references

use hdlscan_core::{Dependency, WORK_LIBRARY};
use regex::Regex;

/// Second full pass: find `library.unit` references against the known
/// library set.
///
/// References through the literal `work` library are rewritten to
/// `owning_library` before storage, and the returned collection keeps the
/// first occurrence of each distinct pair.
pub fn extract_dependencies(
    lines: &[String],
    libraries: &[String],
    owning_library: &str,
) -> Vec<Dependency> {
    if libraries.is_empty() {
        return Vec::new();
    }

    let pattern = libraries
        .iter()
        .map(|lib| format!(r"{}\.\w+", regex::escape(lib)))
        .collect::<Vec<_>>()
        .join("|");
    let references =
        Regex::new(&format!("(?i){pattern}")).expect("escaped library names form a valid pattern");

    let mut deps: Vec<Dependency> = Vec::new();
    for line in lines {
        for reference in references.find_iter(line) {
            let Some((library, unit)) = reference.as_str().split_once('.') else {
                continue;
            };
            let library = if library == WORK_LIBRARY {
                owning_library
            } else {
                library
            };
            let dep = Dependency::new(library, unit);
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        }
    }

    deps
}
