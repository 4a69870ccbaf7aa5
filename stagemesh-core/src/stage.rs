//! Stages: named model instances placed in world space, with merged
//! draw buffers for static scenery.
use std::collections::BTreeMap;

use crate::error::{StageError, StageResult};
use crate::geometry::{MeshModel, VERTEX_COMPONENTS};
use crate::registry::{ModelRegistry, DEFAULT_MODEL_NAME};
use crate::transform::Transform;

/// Key of the actor every stage is created with.
pub const CAMERA_ACTOR_NAME: &str = "camera";

/// A model instance placed in a stage.
///
/// The model is looked up by name in a [`ModelRegistry`] at query time.
#[derive(Debug, Clone, PartialEq)]
pub struct StageActor {
    pub name: String,
    pub model_name: String,
    pub transform: Transform,
}

impl StageActor {
    pub fn new(name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_name: model_name.into(),
            transform: Transform::default(),
        }
    }

    /// An actor showing [`DEFAULT_MODEL_NAME`].
    pub fn with_default_model(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_MODEL_NAME)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Resolve this actor's model, failing with [`StageError::ModelNotFound`].
    pub fn model<'r>(&self, registry: &'r ModelRegistry) -> StageResult<&'r MeshModel> {
        registry
            .get(&self.model_name)
            .ok_or_else(|| StageError::ModelNotFound {
                actor: self.name.clone(),
                model: self.model_name.clone(),
            })
    }

    /// Interleaved vertices placed by the last recomputed model matrix.
    pub fn vertices(&self, registry: &ModelRegistry) -> StageResult<Vec<f32>> {
        let model = self.model(registry)?;
        Ok(self.place(model))
    }

    pub fn indices(&self, registry: &ModelRegistry) -> StageResult<Vec<u32>> {
        Ok(self.model(registry)?.indices.clone())
    }

    /// Like [`vertices`](Self::vertices), but an unloaded model yields nothing.
    pub fn vertices_or_empty(&self, registry: &ModelRegistry) -> Vec<f32> {
        self.place(registry.get_or_empty(&self.model_name))
    }

    /// Like [`indices`](Self::indices), but an unloaded model yields nothing.
    pub fn indices_or_empty(&self, registry: &ModelRegistry) -> Vec<u32> {
        registry.get_or_empty(&self.model_name).indices.clone()
    }

    fn place(&self, model: &MeshModel) -> Vec<f32> {
        model
            .transformed_vertices(self.transform.model_matrix())
            .collect()
    }
}

/// Vertex and index data for one indexed draw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageBuffers {
    /// Interleaved records of [`VERTEX_COMPONENTS`] scalars.
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl StageBuffers {
    /// Number of vertex records, not scalars.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_COMPONENTS
    }

    /// Number of indices to submit in the draw call.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Narrow the indices for a 16-bit index buffer.
    pub fn indices_u16(&self) -> StageResult<Vec<u16>> {
        self.indices
            .iter()
            .map(|&index| u16::try_from(index).map_err(|_| StageError::IndexOverflow { index }))
            .collect()
    }
}

/// A world: ordered setpieces merged into one buffer, plus individually
/// drawn actors keyed by name.
#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    setpieces: Vec<StageActor>,
    actors: BTreeMap<String, StageActor>,
}

impl Stage {
    /// Build a stage. A `"camera"` actor showing the default model is added
    /// unless `actors` already contains one.
    pub fn new(
        name: impl Into<String>,
        setpieces: Vec<StageActor>,
        actors: impl IntoIterator<Item = StageActor>,
    ) -> Self {
        let mut actors: BTreeMap<String, StageActor> = actors
            .into_iter()
            .map(|actor| (actor.name.clone(), actor))
            .collect();
        actors
            .entry(CAMERA_ACTOR_NAME.to_string())
            .or_insert_with(|| StageActor::with_default_model(CAMERA_ACTOR_NAME));

        Self {
            name: name.into(),
            setpieces,
            actors,
        }
    }

    /// Setpieces in merge order.
    pub fn setpieces(&self) -> &[StageActor] {
        &self.setpieces
    }

    /// Setpieces for per-frame transform updates; membership stays fixed.
    pub fn setpieces_mut(&mut self) -> &mut [StageActor] {
        &mut self.setpieces
    }

    /// Actors in ascending name order.
    pub fn actors(&self) -> impl Iterator<Item = &StageActor> {
        self.actors.values()
    }

    pub fn actor(&self, name: &str) -> Option<&StageActor> {
        self.actors.get(name)
    }

    pub fn actor_mut(&mut self, name: &str) -> Option<&mut StageActor> {
        self.actors.get_mut(name)
    }

    pub fn camera(&self) -> Option<&StageActor> {
        self.actor(CAMERA_ACTOR_NAME)
    }

    pub fn camera_mut(&mut self) -> Option<&mut StageActor> {
        self.actor_mut(CAMERA_ACTOR_NAME)
    }

    /// Recompute the model matrix of every setpiece and actor.
    pub fn recompute_transforms(&mut self) {
        for actor in self.setpieces.iter_mut().chain(self.actors.values_mut()) {
            actor.transform.recompute();
        }
    }

    /// Setpiece vertices concatenated in order, each placed by its actor's
    /// model matrix.
    pub fn merged_vertices(&self, registry: &ModelRegistry) -> StageResult<Vec<f32>> {
        let mut vertices = Vec::new();
        for actor in &self.setpieces {
            let model = actor.model(registry)?;
            vertices.extend(model.transformed_vertices(actor.transform.model_matrix()));
        }
        Ok(vertices)
    }

    /// Setpiece indices concatenated in order, each shifted by the number of
    /// vertex records contributed by the setpieces before it.
    pub fn merged_indices(&self, registry: &ModelRegistry) -> StageResult<Vec<u32>> {
        let mut indices = Vec::new();
        let mut base = 0u32;
        for actor in &self.setpieces {
            let model = actor.model(registry)?;
            base = append_offset(&mut indices, actor, model, base)?;
        }
        Ok(indices)
    }

    /// Both merged buffers in a single pass over the setpieces.
    pub fn merged_buffers(&self, registry: &ModelRegistry) -> StageResult<StageBuffers> {
        let mut buffers = StageBuffers::default();
        let mut base = 0u32;
        for actor in &self.setpieces {
            let model = actor.model(registry)?;
            buffers
                .vertices
                .extend(model.transformed_vertices(actor.transform.model_matrix()));
            base = append_offset(&mut buffers.indices, actor, model, base)?;
        }
        Ok(buffers)
    }

    /// One placed vertex array per actor, in actor order.
    pub fn actor_vertices(&self, registry: &ModelRegistry) -> StageResult<Vec<Vec<f32>>> {
        self.actors
            .values()
            .map(|actor| actor.vertices(registry))
            .collect()
    }

    /// One index array per actor, in actor order.
    pub fn actor_indices(&self, registry: &ModelRegistry) -> StageResult<Vec<Vec<u32>>> {
        self.actors
            .values()
            .map(|actor| actor.indices(registry))
            .collect()
    }
}

/// Append `model`'s indices shifted by `base` and return the base for the
/// next setpiece.
fn append_offset(
    indices: &mut Vec<u32>,
    actor: &StageActor,
    model: &MeshModel,
    base: u32,
) -> StageResult<u32> {
    let limit = || StageError::VertexLimit {
        actor: actor.name.clone(),
    };
    let next = u32::try_from(model.vertex_count())
        .ok()
        .and_then(|count| base.checked_add(count))
        .ok_or_else(limit)?;
    indices.reserve(model.indices.len());
    for &index in &model.indices {
        indices.push(base.checked_add(index).ok_or_else(limit)?);
    }
    Ok(next)
}
