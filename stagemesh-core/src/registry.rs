//! Name-keyed store of parsed mesh models.
use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};

use crate::error::ObjResult;
use crate::geometry::MeshModel;
use crate::obj::{self, ObjDocument, ParseWarning};

/// Name of the model actors use when none is given.
pub const DEFAULT_MODEL_NAME: &str = "Cube";

static EMPTY_MODEL: MeshModel = MeshModel {
    name: String::new(),
    positions: Vec::new(),
    tex_coords: Vec::new(),
    normals: Vec::new(),
    indices: Vec::new(),
};

/// Models available to stages, keyed by model name.
///
/// Inserting a name that already exists replaces the earlier model.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, MeshModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in unit cube under [`DEFAULT_MODEL_NAME`].
    pub fn with_default_model() -> Self {
        let mut registry = Self::new();
        registry.insert(MeshModel::cube(DEFAULT_MODEL_NAME, 1.0));
        registry
    }

    /// Store `model` under its own name, returning any model it replaced.
    pub fn insert(&mut self, model: MeshModel) -> Option<MeshModel> {
        let replaced = self.models.insert(model.name.clone(), model);
        if let Some(old) = &replaced {
            debug!("Replaced model '{}' in registry", old.name);
        }
        replaced
    }

    /// Parse OBJ text and store every model it contains.
    ///
    /// Returns the parse warnings and the names stored, in file order.
    pub fn load_obj(&mut self, file: &str, input: &str) -> ObjResult<LoadReport> {
        let document = obj::parse_obj(file, input)?;
        Ok(self.store_document(file, document))
    }

    /// Read an OBJ file from disk and store every model it contains.
    pub fn load_obj_file(&mut self, path: &Path) -> ObjResult<LoadReport> {
        let document = obj::load_obj_file(path)?;
        Ok(self.store_document(&path.display().to_string(), document))
    }

    fn store_document(&mut self, file: &str, document: ObjDocument) -> LoadReport {
        let mut names = Vec::with_capacity(document.models.len());
        for model in document.models {
            names.push(model.name.clone());
            self.insert(model);
        }
        info!(
            "Loaded {} model(s) from {} with {} warning(s)",
            names.len(),
            file,
            document.warnings.len()
        );
        LoadReport {
            models: names,
            warnings: document.warnings,
        }
    }

    pub fn get(&self, name: &str) -> Option<&MeshModel> {
        self.models.get(name)
    }

    /// Look up `name`, falling back to a shared empty model when it is absent.
    pub fn get_or_empty(&self, name: &str) -> &MeshModel {
        self.models.get(name).unwrap_or(&EMPTY_MODEL)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Model names in ascending order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Outcome of loading one OBJ source into a registry.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Names stored, in file order.
    pub models: Vec<String>,
    pub warnings: Vec<ParseWarning>,
}
