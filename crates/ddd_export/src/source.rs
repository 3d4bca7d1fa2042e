//! Where scene objects come from
//!
//! The exporter only needs two things from a document: where it was saved
//! and the ordered list of its objects. [`ObjectSource`] is that seam;
//! [`crate::blend::BlendScene`] reads a saved `.blend` file and
//! [`MemoryScene`] holds objects built in code.

use crate::object::SceneObject;
use ddd_error::Result;
use std::path::{Path, PathBuf};

pub trait ObjectSource {
    /// Saved location of the document, `None` if it was never saved
    fn document_path(&self) -> Option<&Path>;

    /// Objects in scene iteration order, hidden ones included
    fn objects(&self) -> Result<Vec<SceneObject>>;
}

/// In-memory scene
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    document_path: Option<PathBuf>,
    objects: Vec<SceneObject>,
}

impl MemoryScene {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self {
            document_path: None,
            objects,
        }
    }

    pub fn saved_at<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.document_path = Some(path.into());
        self
    }

    pub fn push(&mut self, object: SceneObject) {
        self.objects.push(object);
    }
}

impl ObjectSource for MemoryScene {
    fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    fn objects(&self) -> Result<Vec<SceneObject>> {
        Ok(self.objects.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::ObjectTransform;

    #[test]
    fn test_memory_scene() {
        let mut scene = MemoryScene::default();
        assert!(scene.document_path().is_none());

        scene.push(SceneObject::new("Cube", ObjectTransform::IDENTITY));
        scene.push(SceneObject::new("Lamp", ObjectTransform::IDENTITY).hidden(true));
        let scene = scene.saved_at("/work/level.blend");

        assert_eq!(scene.document_path(), Some(Path::new("/work/level.blend")));
        let objects = scene.objects().unwrap();
        assert_eq!(objects.len(), 2);
        assert!(objects[1].hidden);
    }
}
