//! Immutable lookups over the data model: classes with their declared
//! properties, and enumerations with their cases.
//!
//! Both registries are built once and only read afterwards, so a single pair
//! can back any number of concurrent `generate` calls.
use indexmap::IndexMap;

use crate::annotation::doc;
use crate::error::RegistryError;

// ------------------------------- Descriptors ------------------------------ //

/// One property as declared on a model class.
///
/// Holds every annotation found for the property; a well-formed declaration
/// has exactly one, which [`PropertyDeclaration::annotation`] enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    pub name: String,
    pub annotations: Vec<String>,
}

impl PropertyDeclaration {
    pub fn new(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self { name: name.into(), annotations: vec![annotation.into()] }
    }

    pub fn with_annotations<I, S>(name: impl Into<String>, annotations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            annotations: annotations.into_iter().map(Into::into).collect(),
        }
    }

    /// Collect the `@var` tags of a doc comment.
    pub fn from_doc_comment(name: impl Into<String>, doc_comment: &str) -> Self {
        Self { name: name.into(), annotations: doc::var_annotations(doc_comment) }
    }

    /// The single annotation, or how many were found instead.
    pub fn annotation(&self) -> Result<&str, usize> {
        match self.annotations.as_slice() {
            [one] => Ok(one.as_str()),
            many => Err(many.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: String,
    pub properties: Vec<PropertyDeclaration>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>, properties: Vec<PropertyDeclaration>) -> Self {
        Self { name: name.into(), properties }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: String,
    pub cases: Vec<String>,
}

impl EnumDescriptor {
    pub fn new<I, S>(name: impl Into<String>, cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), cases: cases.into_iter().map(Into::into).collect() }
    }
}

// ------------------------------- Registries ------------------------------- //

#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, ClassDescriptor>,
}

impl ClassRegistry {
    pub fn new<I>(classes: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = ClassDescriptor>,
    {
        let mut out = IndexMap::new();
        for class in classes {
            let mut seen = std::collections::HashSet::new();
            for property in &class.properties {
                if !seen.insert(property.name.as_str()) {
                    return Err(RegistryError::DuplicateProperty {
                        class: class.name.clone(),
                        property: property.name.clone(),
                    });
                }
            }
            if out.contains_key(&class.name) {
                return Err(RegistryError::DuplicateClass(class.name));
            }
            out.insert(class.name.clone(), class);
        }
        Ok(Self { classes: out })
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnumRegistry {
    enums: IndexMap<String, EnumDescriptor>,
}

impl EnumRegistry {
    pub fn new<I>(enums: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = EnumDescriptor>,
    {
        let mut out = IndexMap::new();
        for e in enums {
            if out.contains_key(&e.name) {
                return Err(RegistryError::DuplicateEnum(e.name));
            }
            out.insert(e.name.clone(), e);
        }
        Ok(Self { enums: out })
    }

    pub fn get(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.enums.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty()
    }
}
