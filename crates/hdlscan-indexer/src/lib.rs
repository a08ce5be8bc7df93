//! Per-file VHDL scanning: provided design units, consumed dependencies,
//! and modification-time-driven cache revalidation

pub mod deps;
pub mod loader;
pub mod scanner;
pub mod source;


pub use deps::extract_dependencies;
pub use loader::{DEFAULT_MAX_OPEN_FILES, ReadPermits, ScanError, load_source_lines};
pub use scanner::{UnitScan, scan_lines};
pub use source::SourceFile;
