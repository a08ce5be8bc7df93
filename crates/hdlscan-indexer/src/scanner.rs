//! Line-oriented scanner for design-unit declarations and library clauses

use std::sync::LazyLock;

use hdlscan_core::{DesignUnit, DesignUnitKind, WORK_LIBRARY};
use regex::Regex;

/// The four declaration shapes this scanner recognizes. The package-body
/// alternative comes first so `package body x is` never half-matches the
/// plain package alternative.
static DESIGN_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)",
        r"^\s*package\s+body\s+(?P<package_body>\w+)\s+is\b",
        r"|^\s*package\s+(?P<package>\w+)\s+is\b",
        r"|^\s*entity\s+(?P<entity>\w+)\s+is\b",
        r"|^\s*library\s+(?P<libraries>[\w,\s]+)",
    ))
    .expect("design unit pattern is valid")
});

/// Result of the first pass over a file's normalized lines.
#[derive(Debug, Default)]
pub struct UnitScan {
    /// Declaration candidates in scan order, package bodies included.
    pub candidates: Vec<DesignUnit>,
    /// Library names visible anywhere in the file, seeded with `work`.
    pub libraries: Vec<String>,
}

/// First full pass: collect design-unit candidates and the library set.
///
/// Library visibility is whole-file, not position-sensitive: this pass
/// finishes over every line before dependency extraction starts, so a
/// clause declared after a reference still covers it.
pub fn scan_lines(lines: &[String]) -> UnitScan {
    let mut scan = UnitScan {
        candidates: Vec::new(),
        libraries: vec![WORK_LIBRARY.to_string()],
    };

    for line in lines {
        for caps in DESIGN_UNITS.captures_iter(line) {
            if let Some(name) = caps.name("package_body") {
                scan.candidates
                    .push(DesignUnit::new(name.as_str(), DesignUnitKind::PackageBody));
            } else if let Some(name) = caps.name("package") {
                scan.candidates
                    .push(DesignUnit::new(name.as_str(), DesignUnitKind::Package));
            } else if let Some(name) = caps.name("entity") {
                scan.candidates
                    .push(DesignUnit::new(name.as_str(), DesignUnitKind::Entity));
            } else if let Some(names) = caps.name("libraries") {
                for name in names.as_str().split(',') {
                    let name = name.trim();
                    if !name.is_empty() && !scan.libraries.iter().any(|l| l == name) {
                        scan.libraries.push(name.to_string());
                    }
                }
            }
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_recognizes_all_four_shapes() {
        let scan = scan_lines(&lines(&[
            "package foo is",
            "package body foo is",
            "entity bar is",
            "library ieee;",
        ]));

        assert_eq!(
            scan.candidates,
            vec![
                DesignUnit::new("foo", DesignUnitKind::Package),
                DesignUnit::new("foo", DesignUnitKind::PackageBody),
                DesignUnit::new("bar", DesignUnitKind::Entity),
            ]
        );
        assert_eq!(scan.libraries, vec!["work", "ieee"]);
    }

    #[test]
    fn test_library_clause_splits_comma_separated_names() {
        let scan = scan_lines(&lines(&["library ieee, lib2 , lib3;"]));

        assert_eq!(scan.libraries, vec!["work", "ieee", "lib2", "lib3"]);
    }

    #[test]
    fn test_libraries_seeded_with_work_and_deduplicated() {
        let scan = scan_lines(&lines(&["library work;", "library ieee;", "library ieee;"]));

        assert_eq!(scan.libraries, vec!["work", "ieee"]);
    }

    #[test]
    fn test_unrecognized_shapes_are_ignored() {
        let scan = scan_lines(&lines(&[
            "architecture rtl of foo is",
            "use ieee.std_logic_1164.all;",
            "signal x : std_logic;",
        ]));

        assert!(scan.candidates.is_empty());
        assert_eq!(scan.libraries, vec!["work"]);
    }

    #[test]
    fn test_declarations_are_line_anchored() {
        // Indentation is fine, but a declaration buried mid-line is not.
        let scan = scan_lines(&lines(&["  entity bar is", "x entity baz is"]));

        assert_eq!(
            scan.candidates,
            vec![DesignUnit::new("bar", DesignUnitKind::Entity)]
        );
    }
}
