//! Fixed scalar cast table: model type name → JSON Schema `type` keyword.

pub const SCALARS: [(&str, &str); 7] = [
    ("null", "null"),
    ("bool", "boolean"),
    ("int", "integer"),
    ("float", "number"),
    ("string", "string"),
    ("array", "array"),
    ("object", "object"),
];

/// Total over [`SCALARS`]; anything else is `None`, never a default.
pub fn cast_type(name: &str) -> Option<&'static str> {
    SCALARS
        .iter()
        .find(|(model, _)| *model == name)
        .map(|(_, json)| *json)
}
