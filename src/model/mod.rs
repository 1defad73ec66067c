//! Domain data types.

pub mod annotation;

pub use annotation::{Annotation, AnnotationKind, AnnotationStore};
