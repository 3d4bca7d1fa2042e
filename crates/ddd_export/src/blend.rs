//! Scene objects read straight from a `.blend` file
//!
//! Follows what Blender does for `scene.objects` and `Object.hide_get()`:
//! objects come from the scene's master collection and then its child
//! collections depth-first, each object once; an object is hidden when its
//! `Base` in the active view layer carries `BASE_HIDDEN`.

use crate::object::SceneObject;
use crate::source::ObjectSource;
use crate::transform::{EulerOrder, ObjectTransform, ROT_MODE_AXIS_ANGLE, ROT_MODE_QUAT, Rotation};
use ahash::{AHashMap, AHashSet};
use ddd_error::{DddError, Result, SceneErrorKind};
use ddd_parser::{BlendFile, FieldView, block_code};
use glam::Vec3;
use log::{debug, trace, warn};
use std::path::Path;

/// `Base.flag` bit for objects hidden in a view layer
pub const BASE_HIDDEN: i64 = 1 << 8;

/// `Object.restrictflag` bit used by pre-2.80 files
const OB_RESTRICT_VIEW: i64 = 1 << 0;

/// Which scene and view layer to read; `None` picks the file's default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneSelection {
    pub scene: Option<String>,
    pub view_layer: Option<String>,
}

impl SceneSelection {
    pub fn scene(mut self, name: impl Into<String>) -> Self {
        self.scene = Some(name.into());
        self
    }

    pub fn view_layer(mut self, name: impl Into<String>) -> Self {
        self.view_layer = Some(name.into());
        self
    }
}

/// A parsed `.blend` file viewed as an [`ObjectSource`]
pub struct BlendScene {
    file: BlendFile,
    selection: SceneSelection,
}

impl BlendScene {
    pub fn new(file: BlendFile, selection: SceneSelection) -> Self {
        Self { file, selection }
    }

    pub fn open<P: AsRef<Path>>(path: P, selection: SceneSelection) -> Result<Self> {
        Ok(Self::new(BlendFile::from_path(path)?, selection))
    }

    pub fn file(&self) -> &BlendFile {
        &self.file
    }

    pub fn selection(&self) -> &SceneSelection {
        &self.selection
    }

    /// Names of every scene in the file, in block order
    pub fn scene_names(&self) -> Result<Vec<String>> {
        self.file
            .blocks_by_type(&block_code("SC"))
            .iter()
            .map(|&index| id_name(&self.file, index, "Scene"))
            .collect()
    }

    /// Name of the scene that [`ObjectSource::objects`] reads
    pub fn scene_name(&self) -> Result<String> {
        let index = self.scene_block()?;
        id_name(&self.file, index, "Scene")
    }

    fn scene_block(&self) -> Result<usize> {
        let scenes = self.file.blocks_by_type(&block_code("SC"));

        if let Some(wanted) = &self.selection.scene {
            for &index in scenes {
                if id_name(&self.file, index, "Scene")? == *wanted {
                    return Ok(index);
                }
            }
            return Err(self.tag(DddError::scene(
                format!("Scene '{wanted}' not found"),
                SceneErrorKind::SceneNotFound,
            )));
        }

        if let Some(index) = self.current_scene()? {
            return Ok(index);
        }

        scenes.first().copied().ok_or_else(|| {
            self.tag(DddError::scene(
                "File contains no scene",
                SceneErrorKind::NoScene,
            ))
        })
    }

    /// `FileGlobal.curscene`, when the file records one that resolves
    fn current_scene(&self) -> Result<Option<usize>> {
        let Some(&glob) = self.file.blocks_by_type(&block_code("GLOB")).first() else {
            return Ok(None);
        };
        let view = self.file.field_view(glob)?;
        if !view.has_field("FileGlobal", "curscene") {
            return Ok(None);
        }
        let address = view.read_field_pointer("FileGlobal", "curscene")?;
        if address == 0 {
            return Ok(None);
        }

        let found = self.file.find_block_by_address(address).filter(|&index| {
            self.file
                .get_block(index)
                .is_some_and(|block| block.header.code == block_code("SC"))
        });
        if found.is_none() {
            warn!("FileGlobal.curscene {address:#x} does not point at a scene; using the first scene");
        }
        Ok(found)
    }

    /// Object blocks of a scene in `scene.objects` order
    fn object_blocks(&self, scene: usize) -> Result<Vec<usize>> {
        let dna = self.file.dna();
        if dna.has_path("Scene", "master_collection") {
            let master = self
                .file
                .field_view(scene)?
                .read_field_pointer("Scene", "master_collection")?;
            if master != 0 {
                return self.collection_objects(master);
            }
            debug!("Scene has no master collection");
            return Ok(Vec::new());
        }

        if dna.has_path("Scene", "base") {
            debug!("No master collection in DNA; reading the legacy base list");
            return self
                .file
                .walk_list_field(scene, "Scene", "base", "Base")?
                .into_iter()
                .map(|base| self.base_object(base))
                .filter_map(Result::transpose)
                .collect();
        }

        Err(self.tag(DddError::scene_missing_struct(
            "Scene has neither a master collection nor a base list",
        )))
    }

    /// Objects of a collection tree, depth-first, first occurrence wins
    fn collection_objects(&self, root: u64) -> Result<Vec<usize>> {
        self.require_struct("Collection")?;

        let mut objects = Vec::new();
        let mut seen_objects = AHashSet::new();
        let mut seen_collections = AHashSet::new();
        let mut stack = vec![root];

        while let Some(address) = stack.pop() {
            if !seen_collections.insert(address) {
                continue;
            }
            let Some(collection) = self.file.find_block_by_address(address) else {
                warn!("Dangling collection pointer {address:#x}; skipped");
                continue;
            };

            for link in self
                .file
                .walk_list_field(collection, "Collection", "gobject", "CollectionObject")?
            {
                let object = self
                    .file
                    .field_view(link)?
                    .read_field_pointer("CollectionObject", "ob")?;
                if object == 0 {
                    continue;
                }
                let block = self.object_block(object)?;
                if seen_objects.insert(block) {
                    objects.push(block);
                }
            }

            let children = self
                .file
                .walk_list_field(collection, "Collection", "children", "CollectionChild")?;
            // Reversed so the first child is popped first
            for link in children.into_iter().rev() {
                let child = self
                    .file
                    .field_view(link)?
                    .read_field_pointer("CollectionChild", "collection")?;
                if child != 0 {
                    stack.push(child);
                }
            }
        }

        trace!("Collected {} objects from collection tree", objects.len());
        Ok(objects)
    }

    fn base_object(&self, base: usize) -> Result<Option<usize>> {
        let object = self
            .file
            .field_view(base)?
            .read_field_pointer("Base", "object")?;
        if object == 0 {
            return Ok(None);
        }
        self.object_block(object).map(Some)
    }

    fn object_block(&self, address: u64) -> Result<usize> {
        let index = self.file.find_block_by_address(address).ok_or_else(|| {
            self.tag(DddError::scene_invalid_object(format!(
                "Object pointer {address:#x} has no block"
            )))
        })?;
        let struct_name = &self.file.block_struct(index)?.type_name;
        if struct_name != "Object" {
            return Err(self.tag(DddError::scene_invalid_object(format!(
                "Expected an Object at {address:#x}, found {struct_name}"
            )))
            .with_block_index(index));
        }
        Ok(index)
    }

    /// `Base.flag` per object address for the selected view layer
    fn view_layer_flags(&self, scene: usize) -> Result<AHashMap<u64, i64>> {
        let mut flags = AHashMap::new();
        if !self.file.dna().has_path("Scene", "view_layers") {
            if let Some(wanted) = &self.selection.view_layer {
                return Err(self.view_layer_not_found(wanted));
            }
            return Ok(flags);
        }

        let layers = self
            .file
            .walk_list_field(scene, "Scene", "view_layers", "ViewLayer")?;
        let layer = match &self.selection.view_layer {
            Some(wanted) => {
                let mut found = None;
                for &layer in &layers {
                    let name = self
                        .file
                        .field_view(layer)?
                        .read_field_string("ViewLayer", "name")?;
                    if name == *wanted {
                        found = Some(layer);
                        break;
                    }
                }
                found.ok_or_else(|| self.view_layer_not_found(wanted))?
            }
            None => match layers.first() {
                Some(&layer) => layer,
                None => return Ok(flags),
            },
        };

        for base in self
            .file
            .walk_list_field(layer, "ViewLayer", "object_bases", "Base")?
        {
            let view = self.file.field_view(base)?;
            let object = view.read_field_pointer("Base", "object")?;
            if object != 0 {
                flags.insert(object, view.read_field_int("Base", "flag")?);
            }
        }
        Ok(flags)
    }

    fn view_layer_not_found(&self, wanted: &str) -> DddError {
        self.tag(DddError::scene(
            format!("View layer '{wanted}' not found"),
            SceneErrorKind::ViewLayerNotFound,
        ))
    }

    fn require_struct(&self, name: &str) -> Result<()> {
        if self.file.dna().find_struct(name).is_none() {
            return Err(self.tag(DddError::scene_missing_struct(format!(
                "Struct '{name}' not found in DNA"
            ))));
        }
        Ok(())
    }

    fn tag(&self, err: DddError) -> DddError {
        match self.file.path() {
            Some(path) => err.with_file_path(path),
            None => err,
        }
    }
}

impl ObjectSource for BlendScene {
    fn document_path(&self) -> Option<&Path> {
        self.file.path()
    }

    fn objects(&self) -> Result<Vec<SceneObject>> {
        self.require_struct("Object")?;
        let scene = self.scene_block()?;
        let blocks = self.object_blocks(scene)?;
        let flags = self.view_layer_flags(scene)?;
        let legacy_hide = !self.file.dna().has_path("Scene", "view_layers")
            && self.file.dna().has_path("Object", "restrictflag");

        let mut objects = Vec::with_capacity(blocks.len());
        for index in blocks {
            let object = read_object(&self.file, index, &flags, legacy_hide)
                .map_err(|e| self.tag(e).with_block_index(index))?;
            trace!("{} hidden={}", object.name, object.hidden);
            objects.push(object);
        }

        debug!("Read {} objects from scene", objects.len());
        Ok(objects)
    }
}

fn read_object(
    file: &BlendFile,
    index: usize,
    flags: &AHashMap<u64, i64>,
    legacy_hide: bool,
) -> Result<SceneObject> {
    let view = file.field_view(index)?;
    let name = id_name(file, index, "Object")?;
    let transform = read_transform(&view).map_err(|e| {
        DddError::scene_invalid_object(format!("Cannot read transform of '{name}': {e}"))
    })?;

    let hidden = if legacy_hide {
        view.read_field_int("Object", "restrictflag")? & OB_RESTRICT_VIEW != 0
    } else {
        file.get_block(index)
            .and_then(|block| flags.get(&block.header.old_address))
            .is_some_and(|flag| flag & BASE_HIDDEN != 0)
    };

    Ok(SceneObject::new(name, transform).hidden(hidden))
}

/// `ID.name` without its two-character type code
fn id_name(file: &BlendFile, index: usize, struct_name: &str) -> Result<String> {
    let bytes = file
        .field_view(index)?
        .read_field_bytes(struct_name, "id.name")?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let name = bytes.get(2..end).unwrap_or_default();
    Ok(String::from_utf8_lossy(name).into_owned())
}

fn read_transform(view: &FieldView<'_>) -> Result<ObjectTransform> {
    let mode = if view.has_field("Object", "rotmode") {
        view.read_field_int("Object", "rotmode")?
    } else {
        1
    };

    Ok(ObjectTransform {
        location: vec3(view, "loc")?,
        delta_location: optional_vec3(view, "dloc", Vec3::ZERO)?,
        rotation: read_rotation(view, mode, false)?,
        delta_rotation: read_rotation(view, mode, true)?,
        scale: vec3(view, first_present(view, &["scale", "size"]))?,
        delta_scale: if view.has_field("Object", "dscale") {
            vec3(view, "dscale")?
        } else {
            optional_vec3(view, "dsize", Vec3::ONE)?
        },
    })
}

fn read_rotation(view: &FieldView<'_>, mode: i64, delta: bool) -> Result<Rotation> {
    let field = |name: &'static str, delta_name: &'static str| if delta { delta_name } else { name };

    if delta {
        let probe = match mode {
            ROT_MODE_QUAT => "dquat",
            ROT_MODE_AXIS_ANGLE => "drotAxis",
            _ => "drot",
        };
        if !view.has_field("Object", probe) {
            return Ok(Rotation::IDENTITY);
        }
    }

    match mode {
        ROT_MODE_QUAT => Ok(Rotation::Quaternion(
            view.read_field_f32_array::<4>("Object", field("quat", "dquat"))?,
        )),
        ROT_MODE_AXIS_ANGLE => Ok(Rotation::AxisAngle {
            axis: vec3(view, field("rotAxis", "drotAxis"))?,
            angle: view.read_field_f32("Object", field("rotAngle", "drotAngle"))?,
        }),
        1..=6 => Ok(Rotation::Euler {
            angles: vec3(view, field("rot", "drot"))?,
            order: EulerOrder::ALL[(mode - 1) as usize],
        }),
        other => Err(DddError::scene_invalid_object(format!(
            "Unknown rotation mode {other}"
        ))),
    }
}

fn first_present(view: &FieldView<'_>, names: &[&'static str]) -> &'static str {
    names
        .iter()
        .copied()
        .find(|name| view.has_field("Object", name))
        .unwrap_or(names[0])
}

fn vec3(view: &FieldView<'_>, name: &str) -> Result<Vec3> {
    Ok(Vec3::from_array(view.read_field_f32_array::<3>("Object", name)?))
}

fn optional_vec3(view: &FieldView<'_>, name: &str, default: Vec3) -> Result<Vec3> {
    if view.has_field("Object", name) {
        vec3(view, name)
    } else {
        Ok(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddd_parser::writer::{BlendWriter, DnaBuilder, StructData};

    fn object_dna() -> DnaBuilder {
        let mut dna = DnaBuilder::new(8);
        dna.add_struct("ID", &[("void", "*next"), ("void", "*prev"), ("char", "name[66]")])
            .unwrap()
            .add_struct(
                "Object",
                &[
                    ("ID", "id"),
                    ("float", "loc[3]"),
                    ("float", "rot[3]"),
                    ("float", "quat[4]"),
                    ("float", "rotAxis[3]"),
                    ("float", "rotAngle"),
                    ("float", "size[3]"),
                    ("short", "rotmode"),
                ],
            )
            .unwrap();
        dna
    }

    fn single_object(configure: impl FnOnce(&mut StructData)) -> ObjectTransform {
        let builder = object_dna();
        let dna = builder.build().unwrap();
        let mut object = StructData::new(&dna, "Object").unwrap();
        object.set_str("id.name", "OBThing").unwrap();
        object.set_f32s("size", &[1.0, 1.0, 1.0]).unwrap();
        object.set_i16("rotmode", 1).unwrap();
        configure(&mut object);

        let mut writer = BlendWriter::legacy(8, 402).unwrap();
        writer.add_struct("OB", 0x100, &object);
        let file = BlendFile::from_bytes(writer.finish(&builder).unwrap()).unwrap();
        let index = file.blocks_by_type(&block_code("OB"))[0];
        assert_eq!(id_name(&file, index, "Object").unwrap(), "Thing");
        read_transform(&file.field_view(index).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_delta_fields_are_identity() {
        let t = single_object(|o| {
            o.set_f32s("loc", &[1.0, 2.0, 3.0]).unwrap();
        });
        assert_eq!(t.location, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.delta_location, Vec3::ZERO);
        assert_eq!(t.delta_scale, Vec3::ONE);
        assert_eq!(t.delta_rotation, Rotation::IDENTITY);
    }

    #[test]
    fn test_rotation_modes() {
        let t = single_object(|o| {
            o.set_f32s("quat", &[0.0, 0.0, 0.0, 1.0]).unwrap();
            o.set_i16("rotmode", 0).unwrap();
        });
        assert_eq!(t.rotation, Rotation::Quaternion([0.0, 0.0, 0.0, 1.0]));

        let t = single_object(|o| {
            o.set_f32s("rotAxis", &[0.0, 1.0, 0.0]).unwrap();
            o.set_f32("rotAngle", 0.5).unwrap();
            o.set_i16("rotmode", -1).unwrap();
        });
        assert_eq!(
            t.rotation,
            Rotation::AxisAngle {
                axis: Vec3::Y,
                angle: 0.5
            }
        );

        let t = single_object(|o| {
            o.set_f32s("rot", &[0.1, 0.2, 0.3]).unwrap();
            o.set_i16("rotmode", 6).unwrap();
        });
        assert_eq!(
            t.rotation,
            Rotation::Euler {
                angles: Vec3::new(0.1, 0.2, 0.3),
                order: EulerOrder::ZYX
            }
        );
    }

    #[test]
    fn test_unknown_rotation_mode_is_rejected() {
        let builder = object_dna();
        let dna = builder.build().unwrap();
        let mut object = StructData::new(&dna, "Object").unwrap();
        object.set_i16("rotmode", 9).unwrap();
        let mut writer = BlendWriter::legacy(8, 402).unwrap();
        writer.add_struct("OB", 0x100, &object);
        let file = BlendFile::from_bytes(writer.finish(&builder).unwrap()).unwrap();

        let view = file.field_view(0).unwrap();
        let err = read_transform(&view).unwrap_err();
        assert!(err.is_scene());
    }

    #[test]
    fn test_selection_builder() {
        let selection = SceneSelection::default().scene("Main").view_layer("Render");
        assert_eq!(selection.scene.as_deref(), Some("Main"));
        assert_eq!(selection.view_layer.as_deref(), Some("Render"));
    }
}
