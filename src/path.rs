use std::fmt;

/// Dotted location of a property inside the class being expanded, e.g.
/// `Compartment.subcompartments[].area`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertyPath {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Name(String),
    Items,
}

impl PropertyPath {
    pub fn root(class_name: &str) -> Self {
        Self { segments: vec![Segment::Name(class_name.to_string())] }
    }

    pub fn property(&self, name: &str) -> Self {
        self.with(Segment::Name(name.to_string()))
    }

    /// Step into the element type of an array.
    pub fn items(&self) -> Self {
        self.with(Segment::Items)
    }

    fn with(&self, segment: Segment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Name(name) if i == 0 => f.write_str(name)?,
                Segment::Name(name) => write!(f, ".{name}")?,
                Segment::Items => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}
