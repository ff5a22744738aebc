//! On-disk model description: the JSON form the registries are built from.
//!
//! ```json
//! {
//!   "enums":   { "Color": ["RED", "GREEN"] },
//!   "classes": {
//!     "Shape": {
//!       "color": "Color",
//!       "tags":  ["string", "int"],
//!       "notes": { "doc": "/** @var string|null */" }
//!     }
//!   }
//! }
//! ```
//!
//! Declaration order is kept throughout. Several files may be merged; a class
//! or enum name declared twice across them is an error.
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ModelError;
use crate::path_de;
use crate::registry::{
    ClassDescriptor, ClassRegistry, EnumDescriptor, EnumRegistry, PropertyDeclaration,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    #[serde(default)]
    pub enums: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub classes: IndexMap<String, IndexMap<String, PropertySpec>>,
}

/// How a property's annotation is written in a model file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PropertySpec {
    One(String),
    /// Raw list; anything but exactly one entry fails at generation time.
    Many(Vec<String>),
    Doc { doc: String },
}

impl PropertySpec {
    fn into_declaration(self, name: String) -> PropertyDeclaration {
        match self {
            Self::One(annotation) => PropertyDeclaration::new(name, annotation),
            Self::Many(annotations) => PropertyDeclaration::with_annotations(name, annotations),
            Self::Doc { doc } => PropertyDeclaration::from_doc_comment(name, &doc),
        }
    }
}

impl ModelFile {
    pub fn from_json_str(src: &str, origin: &Path) -> Result<Self, ModelError> {
        path_de::from_str_with_path(src).map_err(|err| ModelError::Format {
            path: origin.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn read(path: &Path) -> Result<Self, ModelError> {
        let src = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&src, path)
    }
}

/// Both registries, ready for generation.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub classes: ClassRegistry,
    pub enums: EnumRegistry,
}

impl Model {
    pub fn from_files<I>(files: I) -> Result<Self, ModelError>
    where
        I: IntoIterator<Item = ModelFile>,
    {
        let mut classes = Vec::new();
        let mut enums = Vec::new();
        for file in files {
            for (name, cases) in file.enums {
                enums.push(EnumDescriptor::new(name, cases));
            }
            for (name, props) in file.classes {
                let properties = props
                    .into_iter()
                    .map(|(prop, spec)| spec.into_declaration(prop))
                    .collect();
                classes.push(ClassDescriptor::new(name, properties));
            }
        }
        let model = Self {
            classes: ClassRegistry::new(classes)?,
            enums: EnumRegistry::new(enums)?,
        };
        tracing::debug!(classes = model.classes.len(), enums = model.enums.len(), "model loaded");
        Ok(model)
    }

    /// Read and merge model files in the given order.
    pub fn load(paths: &[PathBuf]) -> Result<Self, ModelError> {
        let files = paths
            .iter()
            .map(|path| {
                tracing::debug!(path = %path.display(), "reading model file");
                ModelFile::read(path)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_files(files)
    }

    pub fn from_json_str(src: &str) -> Result<Self, ModelError> {
        Self::from_files([ModelFile::from_json_str(src, Path::new("<inline>"))?])
    }
}
