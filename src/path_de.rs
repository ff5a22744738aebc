use serde::de::DeserializeOwned;

/// A deserialization failure located inside the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathedError {
    /// serde path, e.g. `classes.Shape.color`; `.` for the document root.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for PathedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at JSON path {} → {}", self.path, self.message)
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathedError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| PathedError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}
