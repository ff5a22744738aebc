//! Annotated class model → JSON Schema (draft-07).
//!
//! Every class reference is inlined as a full, self-contained object schema;
//! no `$ref` is ever emitted. Expansion keeps the set of classes open on the
//! current call path so that a class graph with cycles fails fast instead of
//! recursing forever.
use indexmap::IndexSet;
use serde_json::{json, Map, Value};

use crate::annotation::{self, TypeExpr, ARRAY};
use crate::error::SchemaError;
use crate::path::PropertyPath;
use crate::registry::{ClassRegistry, EnumRegistry};
use crate::scalar;

// ------------------------------- Policy ---------------------------------- //

pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// Nested class expansions allowed below the root before giving up.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The JSON value being built.
pub type SchemaNode = Value;

/// How `array{..}` shapes with differing element types are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TuplePolicy {
    /// Every item takes the first element's type (`array{string,int}` is an
    /// array of strings with at most two items).
    #[default]
    FirstElement,
    /// Elements must all resolve to the same scalar type.
    Homogeneous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub max_depth: usize,
    pub tuple_policy: TuplePolicy,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, tuple_policy: TuplePolicy::default() }
    }
}

// ------------------------------- Generator -------------------------------- //

#[derive(Debug, Clone, Copy)]
pub struct SchemaGenerator<'r> {
    classes: &'r ClassRegistry,
    enums: &'r EnumRegistry,
    options: GeneratorOptions,
}

/// Classes currently being expanded, outermost first. Call-local.
type Active = IndexSet<String>;

impl<'r> SchemaGenerator<'r> {
    pub fn new(classes: &'r ClassRegistry, enums: &'r EnumRegistry) -> Self {
        for name in classes.names().filter(|name| enums.contains(name)) {
            tracing::warn!(name, "name is both a class and an enum; the class wins");
        }
        Self { classes, enums, options: GeneratorOptions::default() }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Full inlined schema for `class_name`. Any failure aborts the whole call.
    pub fn generate(&self, class_name: &str) -> Result<SchemaNode, SchemaError> {
        let mut active = Active::new();
        self.object(class_name, &PropertyPath::root(class_name), &mut active)
    }

    fn object(&self, name: &str, path: &PropertyPath, active: &mut Active) -> Result<Value, SchemaError> {
        let Some(class) = self.classes.get(name) else {
            return Err(SchemaError::UnknownReference { path: path.clone(), name: name.to_string() });
        };
        if let Some(start) = active.get_index_of(name) {
            let mut chain: Vec<String> = active.iter().skip(start).cloned().collect();
            chain.push(name.to_string());
            return Err(SchemaError::Cycle { path: path.clone(), chain });
        }
        // the root itself does not count towards the limit
        if active.len() > self.options.max_depth {
            return Err(SchemaError::DepthLimit { path: path.clone(), limit: self.options.max_depth });
        }

        active.insert(name.to_string());
        tracing::debug!(class = name, depth = active.len(), "expanding class");

        let mut properties = Map::new();
        for property in &class.properties {
            let path = path.property(&property.name);
            let annotation = property.annotation().map_err(|found| {
                SchemaError::MissingAnnotation { path: path.clone(), found }
            })?;
            let expr = annotation::parse(annotation)
                .map_err(|e| SchemaError::from_parse(path.clone(), annotation, e))?;
            tracing::trace!(%path, %expr, "property");
            properties.insert(property.name.clone(), self.fragment(&expr, &path, active)?);
        }

        active.pop();
        Ok(json!({
            "$schema": DRAFT_07,
            "type": "object",
            "properties": properties,
        }))
    }

    /// `array<T>` always wraps `T`'s fragment in `items`, tuples included:
    /// `array<array{float,float}>` is a list of pairs, not a single pair.
    fn fragment(&self, expr: &TypeExpr, path: &PropertyPath, active: &mut Active) -> Result<Value, SchemaError> {
        match expr {
            TypeExpr::Identifier(name) => self.identifier(name, path, active),
            TypeExpr::Generic { base, arg } => {
                if !base.eq_ignore_ascii_case(ARRAY) {
                    return Err(SchemaError::UnsupportedType {
                        path: path.clone(),
                        annotation: expr.to_string(),
                        reason: format!("generic `{base}` is not supported, only `array<T>`"),
                    });
                }
                // class → nested object, tuple → shape, anything else → its fragment
                let items = self.fragment(arg, &path.items(), active)?;
                Ok(json!({ "type": "array", "items": items }))
            }
            TypeExpr::Union(members) => {
                let any_of = members
                    .iter()
                    .map(|member| self.fragment(member, path, active))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(json!({ "anyOf": any_of }))
            }
            TypeExpr::Tuple(elements) => self.tuple(elements, path),
        }
    }

    /// Class, then enum, then scalar; first match wins.
    fn identifier(&self, name: &str, path: &PropertyPath, active: &mut Active) -> Result<Value, SchemaError> {
        if self.classes.contains(name) {
            return self.object(name, path, active);
        }
        if let Some(e) = self.enums.get(name) {
            return Ok(json!({ "type": "string", "enum": e.cases }));
        }
        match scalar::cast_type(name) {
            Some(ty) => Ok(json!({ "type": ty })),
            None => Err(SchemaError::UnknownReference { path: path.clone(), name: name.to_string() }),
        }
    }

    fn tuple(&self, elements: &[TypeExpr], path: &PropertyPath) -> Result<Value, SchemaError> {
        let Some(first) = elements.first() else {
            return Ok(json!({ "type": "array" }));
        };
        let items_path = path.items();
        let item_ty = self.tuple_element(first, &items_path)?;
        for element in &elements[1..] {
            let ty = self.tuple_element(element, &items_path)?;
            if ty == item_ty {
                continue;
            }
            match self.options.tuple_policy {
                TuplePolicy::FirstElement => {
                    tracing::warn!(%path, first = item_ty, other = ty, "mixed tuple approximated by its first element");
                }
                TuplePolicy::Homogeneous => {
                    return Err(SchemaError::UnsupportedType {
                        path: path.clone(),
                        annotation: TypeExpr::Tuple(elements.to_vec()).to_string(),
                        reason: format!("mixed tuple elements `{item_ty}` and `{ty}`"),
                    });
                }
            }
        }
        Ok(json!({
            "type": "array",
            "items": { "type": item_ty },
            "maxItems": elements.len(),
        }))
    }

    fn tuple_element(&self, element: &TypeExpr, path: &PropertyPath) -> Result<&'static str, SchemaError> {
        let unsupported = || SchemaError::UnsupportedType {
            path: path.clone(),
            annotation: element.to_string(),
            reason: "tuple elements must be scalar types".to_string(),
        };
        let Some(name) = element.as_identifier() else {
            return Err(unsupported());
        };
        if let Some(ty) = scalar::cast_type(name) {
            return Ok(ty);
        }
        if self.classes.contains(name) || self.enums.contains(name) {
            return Err(unsupported());
        }
        Err(SchemaError::UnknownReference { path: path.clone(), name: name.to_string() })
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ClassDescriptor, EnumDescriptor, PropertyDeclaration};
    use pretty_assertions::assert_eq;

    fn class(name: &str, props: &[(&str, &str)]) -> ClassDescriptor {
        ClassDescriptor::new(
            name,
            props.iter().map(|(n, a)| PropertyDeclaration::new(*n, *a)).collect(),
        )
    }

    fn registries(classes: Vec<ClassDescriptor>) -> (ClassRegistry, EnumRegistry) {
        let enums = EnumRegistry::new([EnumDescriptor::new("Color", ["RED", "GREEN"])]).unwrap();
        (ClassRegistry::new(classes).unwrap(), enums)
    }

    /// Schema of the single property `p: <annotation>` on a throwaway class.
    fn fragment_of(annotation: &str, options: GeneratorOptions) -> Result<Value, SchemaError> {
        let (classes, enums) = registries(vec![
            class("Holder", &[("p", annotation)]),
            class("Point", &[("x", "float"), ("y", "float")]),
        ]);
        let schema = SchemaGenerator::new(&classes, &enums)
            .with_options(options)
            .generate("Holder")?;
        Ok(schema["properties"]["p"].clone())
    }

    fn point_schema() -> Value {
        json!({
            "$schema": DRAFT_07,
            "type": "object",
            "properties": { "x": { "type": "number" }, "y": { "type": "number" } },
        })
    }

    #[test]
    fn flat_class() {
        let (classes, enums) = registries(vec![class("Point", &[("x", "float"), ("y", "float")])]);
        let schema = SchemaGenerator::new(&classes, &enums).generate("Point").unwrap();
        assert_eq!(schema, point_schema());
        let keys: Vec<_> = schema["properties"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn enum_property_keeps_case_order() {
        let (classes, enums) = registries(vec![class("Shape", &[("color", "Color")])]);
        let schema = SchemaGenerator::new(&classes, &enums).generate("Shape").unwrap();
        assert_eq!(schema["properties"]["color"], json!({ "type": "string", "enum": ["RED", "GREEN"] }));
    }

    #[test]
    fn scalars_and_unions() {
        let opts = GeneratorOptions::default();
        assert_eq!(fragment_of("int", opts).unwrap(), json!({ "type": "integer" }));
        assert_eq!(fragment_of("bool", opts).unwrap(), json!({ "type": "boolean" }));
        assert_eq!(
            fragment_of("string|null", opts).unwrap(),
            json!({ "anyOf": [{ "type": "string" }, { "type": "null" }] }),
        );
        assert_eq!(
            fragment_of("null|string|null", opts).unwrap(),
            json!({ "anyOf": [{ "type": "null" }, { "type": "string" }, { "type": "null" }] }),
        );
    }

    #[test]
    fn arrays_of_classes_are_inlined() {
        let opts = GeneratorOptions::default();
        let expected = json!({ "type": "array", "items": point_schema() });
        assert_eq!(fragment_of("array<Point>", opts).unwrap(), expected);
        assert_eq!(fragment_of("Array<Point>", opts).unwrap(), expected);
        assert_eq!(fragment_of("Point[]", opts).unwrap(), expected);
    }

    #[test]
    fn arrays_of_scalars_and_enums() {
        let opts = GeneratorOptions::default();
        assert_eq!(
            fragment_of("string[]", opts).unwrap(),
            json!({ "type": "array", "items": { "type": "string" } }),
        );
        assert_eq!(
            fragment_of("array<Color>", opts).unwrap(),
            json!({ "type": "array", "items": { "type": "string", "enum": ["RED", "GREEN"] } }),
        );
    }

    #[test]
    fn tuples() {
        let opts = GeneratorOptions::default();
        assert_eq!(
            fragment_of("array{float,float}", opts).unwrap(),
            json!({ "type": "array", "items": { "type": "number" }, "maxItems": 2 }),
        );
        assert_eq!(fragment_of("array{}", opts).unwrap(), json!({ "type": "array" }));
        assert_eq!(
            fragment_of("array<array{float,float}>", opts).unwrap(),
            json!({
                "type": "array",
                "items": { "type": "array", "items": { "type": "number" }, "maxItems": 2 },
            }),
        );
        assert_eq!(
            fragment_of("array{float,float}|array{}", opts).unwrap(),
            json!({ "anyOf": [
                { "type": "array", "items": { "type": "number" }, "maxItems": 2 },
                { "type": "array" },
            ] }),
        );
    }

    #[test]
    fn mixed_tuples_follow_policy() {
        let loose = GeneratorOptions::default();
        assert_eq!(
            fragment_of("array{string,int}", loose).unwrap(),
            json!({ "type": "array", "items": { "type": "string" }, "maxItems": 2 }),
        );
        let strict = GeneratorOptions { tuple_policy: TuplePolicy::Homogeneous, ..loose };
        assert!(matches!(
            fragment_of("array{string,int}", strict).unwrap_err(),
            SchemaError::UnsupportedType { .. },
        ));
        assert!(fragment_of("array{int,int,int}", strict).is_ok());
    }

    #[test]
    fn tuple_elements_must_be_known_scalars() {
        let opts = GeneratorOptions::default();
        assert!(matches!(fragment_of("array{Point}", opts).unwrap_err(), SchemaError::UnsupportedType { .. }));
        assert!(matches!(fragment_of("array{string[]}", opts).unwrap_err(), SchemaError::UnsupportedType { .. }));
        assert!(matches!(fragment_of("array{float,Nope}", opts).unwrap_err(), SchemaError::UnknownReference { .. }));
    }

    #[test]
    fn failure_kinds_carry_paths() {
        let opts = GeneratorOptions::default();

        let err = fragment_of("Area", opts).unwrap_err();
        assert_eq!(err, SchemaError::UnknownReference {
            path: PropertyPath::root("Holder").property("p"),
            name: "Area".into(),
        });
        assert_eq!(err.to_string(), "Holder.p: unknown type `Area` (not a registered class, enum, or scalar)");

        let err = fragment_of("Map<K, V>", opts).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedType { .. }));

        let err = fragment_of("value-of<Color>", opts).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedType { .. }));

        let err = fragment_of("array<", opts).unwrap_err();
        assert!(matches!(err, SchemaError::Parse { .. }));

        let err = fragment_of("Nope[]", opts).unwrap_err();
        assert_eq!(err.path().to_string(), "Holder.p[]");

        // the generic and the tuple each step into their items
        let err = fragment_of("array<array{Nope}>", opts).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownReference { ref name, .. } if name == "Nope"));
        assert_eq!(err.path().to_string(), "Holder.p[][]");

        let deep = format!("{}int{}", "array<".repeat(5000), ">".repeat(5000));
        let err = fragment_of(&deep, opts).unwrap_err();
        assert_eq!(err, SchemaError::Parse {
            path: PropertyPath::root("Holder").property("p"),
            source: annotation::ParseError::TooDeep { limit: annotation::MAX_NESTING },
        });
    }

    #[test]
    fn annotation_count_must_be_one() {
        for annotations in [vec![], vec!["string", "int"]] {
            let found = annotations.len();
            let classes = ClassRegistry::new([ClassDescriptor::new(
                "Holder",
                vec![PropertyDeclaration::with_annotations("p", annotations)],
            )]).unwrap();
            let enums = EnumRegistry::default();
            let err = SchemaGenerator::new(&classes, &enums).generate("Holder").unwrap_err();
            assert_eq!(err, SchemaError::MissingAnnotation {
                path: PropertyPath::root("Holder").property("p"),
                found,
            });
        }
    }

    #[test]
    fn unknown_root() {
        let (classes, enums) = registries(vec![]);
        let err = SchemaGenerator::new(&classes, &enums).generate("Ghost").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownReference { ref name, .. } if name == "Ghost"));
    }

    #[test]
    fn mutual_reference_is_a_cycle() {
        let (classes, enums) = registries(vec![
            class("A", &[("b", "B")]),
            class("B", &[("a", "A")]),
        ]);
        let err = SchemaGenerator::new(&classes, &enums).generate("A").unwrap_err();
        assert_eq!(err, SchemaError::Cycle {
            path: PropertyPath::root("A").property("b").property("a"),
            chain: vec!["A".into(), "B".into(), "A".into()],
        });
        assert_eq!(err.to_string(), "A.b.a: class cycle A -> B -> A");
    }

    #[test]
    fn self_reference_through_array_and_union_is_a_cycle() {
        let (classes, enums) = registries(vec![class("Node", &[("children", "array<Node>|null")])]);
        let err = SchemaGenerator::new(&classes, &enums).generate("Node").unwrap_err();
        assert!(matches!(err, SchemaError::Cycle { .. }));
        assert_eq!(err.path().to_string(), "Node.children[]");
    }

    #[test]
    fn shared_leaf_is_not_a_cycle() {
        let (classes, enums) = registries(vec![
            class("Point", &[("x", "float"), ("y", "float")]),
            class("Segment", &[("from", "Point"), ("to", "Point")]),
        ]);
        let schema = SchemaGenerator::new(&classes, &enums).generate("Segment").unwrap();
        assert_eq!(schema["properties"]["from"], point_schema());
        assert_eq!(schema["properties"]["to"], point_schema());
    }

    #[test]
    fn deep_acyclic_chain_hits_depth_limit() {
        let chain: Vec<ClassDescriptor> = (0..10)
            .map(|i| class(&format!("C{i}"), &[("next", format!("C{}", i + 1).as_str())]))
            .chain([class("C10", &[("leaf", "int")])])
            .collect();
        let (classes, enums) = registries(chain);

        let roomy = SchemaGenerator::new(&classes, &enums);
        assert!(roomy.generate("C0").is_ok());

        let tight = roomy.with_options(GeneratorOptions { max_depth: 3, ..GeneratorOptions::default() });
        let err = tight.generate("C0").unwrap_err();
        assert_eq!(err, SchemaError::DepthLimit {
            path: PropertyPath::root("C0").property("next").property("next").property("next").property("next"),
            limit: 3,
        });
    }

    #[test]
    fn class_shadows_enum_of_same_name() {
        let classes = ClassRegistry::new([
            class("Color", &[("hex", "string")]),
            class("Shape", &[("color", "Color")]),
        ]).unwrap();
        let enums = EnumRegistry::new([EnumDescriptor::new("Color", ["RED"])]).unwrap();
        let schema = SchemaGenerator::new(&classes, &enums).generate("Shape").unwrap();
        assert_eq!(schema["properties"]["color"]["type"], "object");
    }
}
