//! hdlscan Core — design-unit and dependency data model

pub mod model;


pub use model::{Dependency, DesignUnit, DesignUnitKind, WORK_LIBRARY};
