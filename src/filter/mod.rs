//! Row and column filtering of raw intensity tables.

pub mod annotation;
pub mod identity;
pub mod projection;

pub use annotation::{filter_annotations, AnnotationFilterResult};
pub use identity::{clean_identities, IdentityCleanup};
pub use projection::{project_columns, resolve_columns, ColumnSelection, ProjectedTable};
