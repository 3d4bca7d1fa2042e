//! # ddd_export
//!
//! Writes the local transform matrix of every visible object in a scene to
//! a flat text file, with each object's location remapped from Y-up to Z-up
//! first.
//!
//! ## Pipeline
//!
//! 1. **Source**: an [`ObjectSource`] yields [`SceneObject`]s in scene
//!    order, either read from a `.blend` file ([`BlendScene`]) or built in
//!    memory ([`MemoryScene`])
//! 2. **Target**: [`OutputTarget::resolve`] turns the document location and
//!    [`ExportConfig`] into an output path
//! 3. **Matrices**: [`recompute_local_matrix`] evaluates each object's local
//!    matrix with its location remapped; objects are never modified
//! 4. **Records**: [`write_record`] emits the name and sixteen `%f` values
//!
//! ```no_run
//! use ddd_export::{BlendScene, ExportConfig, Exporter};
//!
//! let config = ExportConfig {
//!     basedir: Some("/tmp/ddd".into()),
//!     ..ExportConfig::default()
//! };
//! let scene = BlendScene::open("level.blend", config.selection())?;
//! let report = Exporter::new(config).run(&scene)?;
//! println!("{} objects", report.summary.exported);
//! # Ok::<(), ddd_export::Error>(())
//! ```

pub mod blend;
pub mod config;
pub mod export;
pub mod object;
pub mod path;
pub mod record;
pub mod remap;
pub mod source;
pub mod transform;

pub use blend::{BlendScene, SceneSelection};
pub use config::ExportConfig;
pub use ddd_error::{DddError as Error, Result};
pub use export::{ExportFile, ExportReport, ExportSummary, Exporter, export_objects};
pub use object::SceneObject;
pub use path::OutputTarget;
pub use record::{Record, format_fixed, parse_records, write_record};
pub use remap::{AxisRemap, SignedAxis, recompute_local_matrix};
pub use source::{MemoryScene, ObjectSource};
pub use transform::{EulerOrder, ObjectTransform, Rotation};
