//! Compile an annotated class model into a JSON Schema (draft-07) document.
//!
//! Pipeline: model file(s) → registries → per-property annotation parse →
//! recursive, fully inlined schema generation.
pub mod annotation;
pub mod error;
pub mod generate;
pub mod model;
pub mod path;
pub mod path_de;
pub mod registry;
pub mod scalar;

pub use annotation::{parse, ParseError, TypeExpr};
pub use error::{ModelError, RegistryError, SchemaError};
pub use generate::{GeneratorOptions, SchemaGenerator, SchemaNode, TuplePolicy, DRAFT_07};
pub use model::Model;
pub use path::PropertyPath;
pub use registry::{
    ClassDescriptor, ClassRegistry, EnumDescriptor, EnumRegistry, PropertyDeclaration,
};
