//! Core data structures for scanned VHDL sources

use std::fmt;

use serde::{Deserialize, Serialize};

/// The library token that refers to the file's own library. References
/// through it are rewritten to the owning library before storage.
pub const WORK_LIBRARY: &str = "work";

/// Discriminates what kind of design unit a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DesignUnitKind {
    Package,
    PackageBody,
    Entity,
}

impl fmt::Display for DesignUnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DesignUnitKind::Package => "package",
            DesignUnitKind::PackageBody => "package body",
            DesignUnitKind::Entity => "entity",
        };
        f.write_str(s)
    }
}

/// A named declaration a source file provides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesignUnit {
    pub name: String,
    pub kind: DesignUnitKind,
}

impl DesignUnit {
    pub fn new(name: impl Into<String>, kind: DesignUnitKind) -> Self {
        DesignUnit {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for DesignUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// A qualified `library.unit` reference a source file consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub library: String,
    pub unit: String,
}

impl Dependency {
    pub fn new(library: impl Into<String>, unit: impl Into<String>) -> Self {
        Dependency {
            library: library.into(),
            unit: unit.into(),
        }
    }

    /// The `library.unit` form used to join consumers to providers.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.library, self.unit)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.library, self.unit)
    }
}
