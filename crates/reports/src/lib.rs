//! `stocklens-reports` — report definitions, registry, and the compiled-in
//! catalog.

pub mod catalog;
pub mod definition;
pub mod registry;

pub use definition::{BuildContext, BuildFn, DefaultBehavior, ReportBehavior, ReportDefinition};
pub use registry::{RegistryError, ReportRegistry};
