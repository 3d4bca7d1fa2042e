use crate::transform::ObjectTransform;
use glam::Vec3;

/// Read-only descriptor of one object in a scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    /// Display name, not guaranteed unique
    pub name: String,
    pub hidden: bool,
    pub transform: ObjectTransform,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, transform: ObjectTransform) -> Self {
        Self {
            name: name.into(),
            hidden: false,
            transform,
        }
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn location(&self) -> Vec3 {
        self.transform.location
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }
}
