#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag { name: name.into() }
    }

    pub fn value(&self) -> &str {
        &self.name
    }

    /// A tag with a `-` suffix (`v1.0.0-rc.1`, `v0.3-dev`) marks a development build
    pub fn is_stable(&self) -> bool {
        !self.name.is_empty() && !self.name.contains('-')
    }
}
