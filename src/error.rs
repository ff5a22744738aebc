use std::path::PathBuf;
use thiserror::Error;

use crate::annotation::ParseError;
use crate::path::PropertyPath;

/// Fatal to the whole `generate` call; no partial schema is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("{path}: malformed type annotation: {source}")]
    Parse {
        path: PropertyPath,
        #[source]
        source: ParseError,
    },
    #[error("{path}: unsupported type `{annotation}`: {reason}")]
    UnsupportedType {
        path: PropertyPath,
        annotation: String,
        reason: String,
    },
    #[error("{path}: expected exactly one type annotation, found {found}")]
    MissingAnnotation { path: PropertyPath, found: usize },
    #[error("{path}: unknown type `{name}` (not a registered class, enum, or scalar)")]
    UnknownReference { path: PropertyPath, name: String },
    #[error("{path}: class cycle {}", chain.join(" -> "))]
    Cycle { path: PropertyPath, chain: Vec<String> },
    #[error("{path}: class nesting deeper than {limit}")]
    DepthLimit { path: PropertyPath, limit: usize },
}

impl SchemaError {
    /// Arity failures are well-formed but refused; everything else is syntax.
    pub fn from_parse(path: PropertyPath, annotation: &str, source: ParseError) -> Self {
        if source.is_unsupported() {
            Self::UnsupportedType {
                path,
                annotation: annotation.to_string(),
                reason: source.to_string(),
            }
        } else {
            Self::Parse { path, source }
        }
    }

    pub fn path(&self) -> &PropertyPath {
        match self {
            Self::Parse { path, .. }
            | Self::UnsupportedType { path, .. }
            | Self::MissingAnnotation { path, .. }
            | Self::UnknownReference { path, .. }
            | Self::Cycle { path, .. }
            | Self::DepthLimit { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("class `{0}` is declared more than once")]
    DuplicateClass(String),
    #[error("enum `{0}` is declared more than once")]
    DuplicateEnum(String),
    #[error("class `{class}` declares property `{property}` more than once")]
    DuplicateProperty { class: String, property: String },
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model file {}: {message}", path.display())]
    Format { path: PathBuf, message: String },
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
