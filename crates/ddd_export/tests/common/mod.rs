//! Synthetic .blend scenes for integration tests
#![allow(dead_code)]

use ddd_parser::writer::{BlendWriter, DnaBuilder, StructData};
use ddd_parser::{DnaCollection, Result};
use std::path::Path;

pub const BASE_HIDDEN: i16 = 1 << 8;

/// DNA shaped like Blender 2.80+: collections, view layers and bases
pub fn modern_dna() -> DnaBuilder {
    let mut dna = DnaBuilder::new(8);
    dna.add_struct("ID", &[("void", "*next"), ("void", "*prev"), ("char", "name[66]")])
        .unwrap()
        .add_struct("ListBase", &[("void", "*first"), ("void", "*last")])
        .unwrap()
        .add_struct(
            "Object",
            &[
                ("ID", "id"),
                ("float", "loc[3]"),
                ("float", "dloc[3]"),
                ("float", "scale[3]"),
                ("float", "dscale[3]"),
                ("float", "rot[3]"),
                ("float", "drot[3]"),
                ("float", "quat[4]"),
                ("float", "dquat[4]"),
                ("float", "rotAxis[3]"),
                ("float", "drotAxis[3]"),
                ("float", "rotAngle"),
                ("float", "drotAngle"),
                ("short", "rotmode"),
                ("short", "flag"),
            ],
        )
        .unwrap()
        .add_struct(
            "CollectionObject",
            &[
                ("CollectionObject", "*next"),
                ("CollectionObject", "*prev"),
                ("Object", "*ob"),
            ],
        )
        .unwrap()
        .add_struct(
            "CollectionChild",
            &[
                ("CollectionChild", "*next"),
                ("CollectionChild", "*prev"),
                ("Collection", "*collection"),
            ],
        )
        .unwrap()
        .add_struct(
            "Collection",
            &[("ID", "id"), ("ListBase", "gobject"), ("ListBase", "children")],
        )
        .unwrap()
        .add_struct(
            "Base",
            &[
                ("Base", "*next"),
                ("Base", "*prev"),
                ("Object", "*object"),
                ("short", "flag"),
                ("short", "flag_legacy"),
                ("int", "pad"),
            ],
        )
        .unwrap()
        .add_struct(
            "ViewLayer",
            &[
                ("ViewLayer", "*next"),
                ("ViewLayer", "*prev"),
                ("char", "name[64]"),
                ("ListBase", "object_bases"),
            ],
        )
        .unwrap()
        .add_struct(
            "Scene",
            &[
                ("ID", "id"),
                ("Collection", "*master_collection"),
                ("ListBase", "view_layers"),
            ],
        )
        .unwrap()
        .add_struct("FileGlobal", &[("Scene", "*curscene"), ("char", "filename[1024]")])
        .unwrap();
    dna
}

/// One object to place in a fixture
#[derive(Debug, Clone)]
pub struct ObjectSpec {
    pub name: String,
    pub loc: [f32; 3],
    pub rot: [f32; 3],
    pub scale: [f32; 3],
    pub rotmode: i16,
    pub quat: [f32; 4],
    pub dloc: [f32; 3],
    pub dscale: [f32; 3],
}

impl ObjectSpec {
    pub fn new(name: &str, loc: [f32; 3]) -> Self {
        Self {
            name: name.to_string(),
            loc,
            rot: [0.0; 3],
            scale: [1.0; 3],
            rotmode: 1,
            quat: [1.0, 0.0, 0.0, 0.0],
            dloc: [0.0; 3],
            dscale: [1.0; 3],
        }
    }

    pub fn rot(mut self, rot: [f32; 3]) -> Self {
        self.rot = rot;
        self
    }

    pub fn scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn quat(mut self, quat: [f32; 4]) -> Self {
        self.rotmode = 0;
        self.quat = quat;
        self
    }

    pub fn dloc(mut self, dloc: [f32; 3]) -> Self {
        self.dloc = dloc;
        self
    }
}

/// Builds a modern scene block by block
///
/// Addresses are handed out sequentially, so building the same fixture
/// twice produces identical bytes.
pub struct SceneFixture {
    builder: DnaBuilder,
    dna: DnaCollection,
    writer: BlendWriter,
    next_address: u64,
}

impl Default for SceneFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneFixture {
    pub fn new() -> Self {
        let builder = modern_dna();
        let dna = builder.build().unwrap();
        Self {
            builder,
            dna,
            writer: BlendWriter::legacy(8, 405).unwrap(),
            next_address: 0x1000,
        }
    }

    fn alloc(&mut self) -> u64 {
        let address = self.next_address;
        self.next_address += 0x100;
        address
    }

    /// Add an object block; returns its address
    pub fn object(&mut self, spec: &ObjectSpec) -> u64 {
        let address = self.alloc();
        let mut ob = StructData::new(&self.dna, "Object").unwrap();
        ob.set_str("id.name", &format!("OB{}", spec.name))
            .unwrap()
            .set_f32s("loc", &spec.loc)
            .unwrap()
            .set_f32s("dloc", &spec.dloc)
            .unwrap()
            .set_f32s("rot", &spec.rot)
            .unwrap()
            .set_f32s("scale", &spec.scale)
            .unwrap()
            .set_f32s("dscale", &spec.dscale)
            .unwrap()
            .set_f32s("quat", &spec.quat)
            .unwrap()
            .set_f32s("dquat", &[1.0, 0.0, 0.0, 0.0])
            .unwrap()
            .set_f32s("rotAxis", &[0.0, 1.0, 0.0])
            .unwrap()
            .set_f32s("drotAxis", &[0.0, 1.0, 0.0])
            .unwrap()
            .set_i16("rotmode", spec.rotmode)
            .unwrap();
        self.writer.add_struct("OB", address, &ob);
        address
    }

    /// Add a collection holding `objects` and `children`; returns its address
    pub fn collection(&mut self, name: &str, objects: &[u64], children: &[u64]) -> u64 {
        let address = self.alloc();
        let object_links: Vec<u64> = objects.iter().map(|_| self.alloc()).collect();
        let child_links: Vec<u64> = children.iter().map(|_| self.alloc()).collect();

        let mut links = Vec::new();
        for &ob in objects {
            let mut link = StructData::new(&self.dna, "CollectionObject").unwrap();
            link.set_ptr("ob", ob).unwrap();
            links.push(link);
        }
        let gobject = link_list(&mut self.writer, "DATA", &object_links, links);

        let mut links = Vec::new();
        for &child in children {
            let mut link = StructData::new(&self.dna, "CollectionChild").unwrap();
            link.set_ptr("collection", child).unwrap();
            links.push(link);
        }
        let child_list = link_list(&mut self.writer, "DATA", &child_links, links);

        let mut collection = StructData::new(&self.dna, "Collection").unwrap();
        collection
            .set_str("id.name", &format!("GR{name}"))
            .unwrap()
            .set_ptr("gobject.first", gobject.0)
            .unwrap()
            .set_ptr("gobject.last", gobject.1)
            .unwrap()
            .set_ptr("children.first", child_list.0)
            .unwrap()
            .set_ptr("children.last", child_list.1)
            .unwrap();
        self.writer.add_struct("GR", address, &collection);
        address
    }

    /// Add a scene with view layers given as `(name, [(object, base flag)])`
    pub fn scene(&mut self, name: &str, master: u64, layers: &[(&str, Vec<(u64, i16)>)]) -> u64 {
        let address = self.alloc();
        let layer_addresses: Vec<u64> = layers.iter().map(|_| self.alloc()).collect();
        let base_addresses: Vec<Vec<u64>> = layers
            .iter()
            .map(|(_, bases)| bases.iter().map(|_| self.alloc()).collect())
            .collect();

        let mut layer_data = Vec::new();
        for ((layer_name, bases), addresses) in layers.iter().zip(&base_addresses) {
            let mut base_data = Vec::new();
            for &(object, flag) in bases {
                let mut base = StructData::new(&self.dna, "Base").unwrap();
                base.set_ptr("object", object).unwrap().set_i16("flag", flag).unwrap();
                base_data.push(base);
            }
            let list = link_list(&mut self.writer, "DATA", addresses, base_data);

            let mut layer = StructData::new(&self.dna, "ViewLayer").unwrap();
            layer
                .set_str("name", layer_name)
                .unwrap()
                .set_ptr("object_bases.first", list.0)
                .unwrap()
                .set_ptr("object_bases.last", list.1)
                .unwrap();
            layer_data.push(layer);
        }
        let layer_list = link_list(&mut self.writer, "DATA", &layer_addresses, layer_data);

        let mut scene = StructData::new(&self.dna, "Scene").unwrap();
        scene
            .set_str("id.name", &format!("SC{name}"))
            .unwrap()
            .set_ptr("master_collection", master)
            .unwrap()
            .set_ptr("view_layers.first", layer_list.0)
            .unwrap()
            .set_ptr("view_layers.last", layer_list.1)
            .unwrap();
        self.writer.add_struct("SC", address, &scene);
        address
    }

    /// Record the current scene in a `GLOB` block
    pub fn current_scene(&mut self, scene: u64) {
        let mut glob = StructData::new(&self.dna, "FileGlobal").unwrap();
        glob.set_ptr("curscene", scene).unwrap();
        self.writer.add_struct("GLOB", 0, &glob);
    }

    pub fn finish(&self) -> Vec<u8> {
        self.writer.finish(&self.builder).unwrap()
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        self.writer.write_to(&self.builder, path)
    }
}

/// Link `items` through `next`/`prev` at `addresses`; returns `(first, last)`
fn link_list(
    writer: &mut BlendWriter,
    code: &str,
    addresses: &[u64],
    mut items: Vec<StructData>,
) -> (u64, u64) {
    let count = items.len();
    for (i, item) in items.iter_mut().enumerate() {
        let next = if i + 1 < count { addresses[i + 1] } else { 0 };
        let prev = if i > 0 { addresses[i - 1] } else { 0 };
        item.set_ptr("next", next).unwrap().set_ptr("prev", prev).unwrap();
    }
    for (item, &address) in items.iter().zip(addresses) {
        writer.add_struct(code, address, item);
    }
    match (addresses.first(), addresses.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => (0, 0),
    }
}

/// A pre-2.80 style file: objects linked through `Scene.base`
pub fn legacy_scene(objects: &[(&str, [f32; 3], bool)]) -> Vec<u8> {
    let mut builder = DnaBuilder::new(8);
    builder
        .add_struct("ID", &[("void", "*next"), ("void", "*prev"), ("char", "name[66]")])
        .unwrap()
        .add_struct("ListBase", &[("void", "*first"), ("void", "*last")])
        .unwrap()
        .add_struct(
            "Object",
            &[
                ("ID", "id"),
                ("float", "loc[3]"),
                ("float", "rot[3]"),
                ("float", "size[3]"),
                ("short", "rotmode"),
                ("short", "restrictflag"),
            ],
        )
        .unwrap()
        .add_struct(
            "Base",
            &[("Base", "*next"), ("Base", "*prev"), ("Object", "*object"), ("short", "flag")],
        )
        .unwrap()
        .add_struct("Scene", &[("ID", "id"), ("ListBase", "base")])
        .unwrap();
    let dna = builder.build().unwrap();
    let mut writer = BlendWriter::legacy(8, 279).unwrap();

    let mut bases = Vec::new();
    let mut base_addresses = Vec::new();
    for (i, (name, loc, restricted)) in objects.iter().enumerate() {
        let address = 0x1000 + 0x100 * i as u64;
        let mut ob = StructData::new(&dna, "Object").unwrap();
        ob.set_str("id.name", &format!("OB{name}"))
            .unwrap()
            .set_f32s("loc", loc)
            .unwrap()
            .set_f32s("size", &[1.0; 3])
            .unwrap()
            .set_i16("rotmode", 1)
            .unwrap()
            .set_i16("restrictflag", i16::from(*restricted))
            .unwrap();
        writer.add_struct("OB", address, &ob);

        let mut base = StructData::new(&dna, "Base").unwrap();
        base.set_ptr("object", address).unwrap();
        bases.push(base);
        base_addresses.push(0x8000 + 0x100 * i as u64);
    }
    let (first, last) = link_list(&mut writer, "DATA", &base_addresses, bases);

    let mut scene = StructData::new(&dna, "Scene").unwrap();
    scene
        .set_str("id.name", "SCScene")
        .unwrap()
        .set_ptr("base.first", first)
        .unwrap()
        .set_ptr("base.last", last)
        .unwrap();
    writer.add_struct("SC", 0x9000, &scene);
    writer.finish(&builder).unwrap()
}
