use serde::Serialize;

/// Identity metadata carried through the pipeline alongside trajectories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectIdentity {
    /// Object name as listed in the source catalog (e.g. "ISS (ZARYA)").
    pub name: String,
    /// NORAD catalog number.
    pub catalog_number: u64,
}

impl ObjectIdentity {
    pub fn new(name: impl Into<String>, catalog_number: u64) -> Self {
        ObjectIdentity {
            name: name.into(),
            catalog_number,
        }
    }
}

impl std::fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.name, self.catalog_number)
    }
}
