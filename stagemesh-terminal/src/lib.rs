//! stagemesh Terminal - Stage report front-end
//!
//! Loads OBJ files, lays them out as stage setpieces and prints what a
//! renderer would receive.
use log::{error, info};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use stagemesh_core::{
    LoadReport, ModelRegistry, ObjError, Stage, StageActor, StageBuffers, StageError, Transform,
    Vec3, NORMAL_OFFSET_BYTES, POSITION_OFFSET_BYTES, TEX_COORD_OFFSET_BYTES, VERTEX_COMPONENTS,
    VERTEX_STRIDE_BYTES,
};

pub mod report;

pub use report::{ReportWriter, Tone};

/// Distance along X between consecutive setpieces.
const SETPIECE_SPACING: f32 = 3.0;
/// How far in front of the row of setpieces the camera stands.
const CAMERA_DISTANCE: f32 = 6.0;

/// Result of loading one file.
pub struct FileLoad {
    pub path: PathBuf,
    pub outcome: Result<LoadReport, ObjError>,
}

/// Main application struct for the terminal report
pub struct TerminalApp {
    registry: ModelRegistry,
    stage: Stage,
    loads: Vec<FileLoad>,
}

impl TerminalApp {
    /// Load every file into a fresh registry and place each loaded model as a
    /// setpiece, in load order.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Self {
        let mut registry = ModelRegistry::with_default_model();
        let mut loads = Vec::with_capacity(paths.len());
        let mut setpieces = Vec::new();

        for path in paths {
            let path = path.as_ref();
            let outcome = registry.load_obj_file(path);
            match &outcome {
                Ok(report) => {
                    for name in &report.models {
                        let offset = setpieces.len() as f32 * SETPIECE_SPACING;
                        setpieces.push(
                            StageActor::new(name.clone(), name.clone())
                                .with_transform(Transform::from_translation(offset, 0.0, 0.0)),
                        );
                    }
                }
                Err(e) => error!("{}", e),
            }
            loads.push(FileLoad {
                path: path.to_path_buf(),
                outcome,
            });
        }

        info!("Placed {} setpiece(s)", setpieces.len());
        let row_center = setpieces.len().saturating_sub(1) as f32 * SETPIECE_SPACING / 2.0;
        let mut stage = Stage::new("Main", setpieces, []);
        if let Some(camera) = stage.camera_mut() {
            camera.transform.translation = Vec3::new(row_center, 0.0, CAMERA_DISTANCE);
        }
        stage.recompute_transforms();

        Self {
            registry,
            stage,
            loads,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.loads.iter().any(|load| load.outcome.is_err())
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Write the full report to `writer`.
    pub fn run<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut report = ReportWriter::new(writer);
        report.heading(&format!("stagemesh | stage '{}'", self.stage.name))?;

        for load in &self.loads {
            self.write_load(&mut report, load)?;
        }

        report.heading("Merged setpieces")?;
        report.indent();
        match self.stage.merged_buffers(&self.registry) {
            Ok(buffers) => write_buffers(&mut report, &buffers)?,
            Err(e) => {
                report.line(Tone::Error, &e.to_string())?;
            }
        }
        report.outdent();

        report.finish()
    }

    fn write_load<W: Write>(&self, report: &mut ReportWriter<'_, W>, load: &FileLoad) -> io::Result<()> {
        let path = load.path.display();
        match &load.outcome {
            Ok(loaded) => {
                report.line(
                    Tone::Good,
                    &format!("{}: {} model(s)", path, loaded.models.len()),
                )?;
                report.indent();
                for name in &loaded.models {
                    if let Some(model) = self.registry.get(name) {
                        let label = if name.is_empty() { "<unnamed>" } else { name.as_str() };
                        report.line(
                            Tone::Plain,
                            &format!(
                                "{}: {} vertices, {} triangles",
                                label,
                                model.vertex_count(),
                                model.triangle_count()
                            ),
                        )?;
                    }
                }
                for warning in &loaded.warnings {
                    report.line(Tone::Warning, &warning.to_string())?;
                }
                report.outdent();
            }
            Err(e) => {
                report.line(Tone::Error, &format!("{}: FAILED", path))?;
                report.indent();
                report.line(Tone::Error, &e.to_string())?;
                report.outdent();
            }
        }
        Ok(())
    }
}

fn write_buffers<W: Write>(report: &mut ReportWriter<'_, W>, buffers: &StageBuffers) -> io::Result<()> {
    report.line(
        Tone::Plain,
        &format!(
            "{} vertex records ({} floats, {} per vertex)",
            buffers.vertex_count(),
            buffers.vertices.len(),
            VERTEX_COMPONENTS
        ),
    )?;
    report.line(
        Tone::Plain,
        &format!(
            "stride {} bytes: position @{}, texcoord @{}, normal @{}",
            VERTEX_STRIDE_BYTES, POSITION_OFFSET_BYTES, TEX_COORD_OFFSET_BYTES, NORMAL_OFFSET_BYTES
        ),
    )?;
    report.line(
        Tone::Plain,
        &format!(
            "{} indices ({} triangles)",
            buffers.index_count(),
            buffers.index_count() / 3
        ),
    )?;
    match buffers.indices_u16() {
        Ok(_) => report.line(Tone::Good, "fits a 16-bit index buffer")?,
        Err(StageError::IndexOverflow { index }) => report.line(
            Tone::Warning,
            &format!("needs 32-bit indices (index {} exceeds u16)", index),
        )?,
        Err(e) => report.line(Tone::Error, &e.to_string())?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_obj(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".obj").unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_loaded_models_become_setpieces() {
        let file = create_test_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\no A\nf 1 2 3\no B\nf 1 2 3\nf 2 4 3\n",
        );
        let app = TerminalApp::load(&[file.path()]);

        assert!(!app.has_failures());
        let names: Vec<&str> = app.stage().setpieces().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        let buffers = app.stage().merged_buffers(app.registry()).unwrap();
        assert_eq!(buffers.vertex_count(), 7);
        assert_eq!(buffers.indices, vec![0, 1, 2, 3, 4, 5, 4, 6, 5]);
        // B is shifted along X
        assert!((buffers.vertices[3 * VERTEX_COMPONENTS] - SETPIECE_SPACING).abs() < 1e-6);
    }

    #[test]
    fn test_camera_faces_the_middle_of_the_row() {
        let file = create_test_obj(
            "v 0 0 0\nv 1 0 0\nv 0 1 0\no A\nf 1 2 3\no B\nf 1 2 3\no C\nf 1 2 3\n",
        );
        let app = TerminalApp::load(&[file.path()]);

        let camera = app.stage().camera().unwrap();
        assert_eq!(
            camera.transform.translation,
            Vec3::new(SETPIECE_SPACING, 0.0, CAMERA_DISTANCE)
        );
        let placed = camera.transform.model_matrix();
        assert!((placed[(0, 3)] - SETPIECE_SPACING).abs() < 1e-6);
        assert!((placed[(2, 3)] - CAMERA_DISTANCE).abs() < 1e-6);
    }

    #[test]
    fn test_report_lists_models_and_warnings() {
        let file = create_test_obj("o Tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nf 1 2 3 1\n");
        let app = TerminalApp::load(&[file.path()]);

        let mut out = Vec::new();
        app.run(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Tri: 3 vertices, 1 triangles"));
        assert!(text.contains("can't load non-triangular faces (4 vertices)"));
        assert!(text.contains("3 vertex records (24 floats, 8 per vertex)"));
        assert!(text.contains("stride 32 bytes: position @0, texcoord @12, normal @20"));
        assert!(text.contains("fits a 16-bit index buffer"));
    }

    #[test]
    fn test_failed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.obj");
        let app = TerminalApp::load(&[&missing]);
        assert!(app.has_failures());
        assert!(app.stage().setpieces().is_empty());
        assert_eq!(app.stage().camera().unwrap().transform.translation.x, 0.0);

        let mut out = Vec::new();
        app.run(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("FAILED"));
        assert!(text.contains("0 vertex records"));
    }
}
