//! A diagram together with the scene last published to clients

use mindmap_core::{Diagram, DiffEngine, Notice, Scene, SceneDiff};
use serde::Serialize;

/// Holds the live diagram and turns every change into a [`SceneDiff`]
/// against what clients have already seen.
#[derive(Debug)]
pub struct LiveSession {
    diagram: Diagram,
    diffs: DiffEngine,
    published: Scene,
}

impl LiveSession {
    pub fn new(diagram: Diagram) -> Self {
        let published = diagram.scene();
        LiveSession { diagram, diffs: DiffEngine::new(), published }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn diagram_mut(&mut self) -> &mut Diagram {
        &mut self.diagram
    }

    /// The scene as clients currently know it.
    pub fn published(&self) -> &Scene {
        &self.published
    }

    pub fn sequence(&self) -> u64 {
        self.diffs.sequence()
    }

    /// Diff the current scene against the published one and publish it.
    pub fn commit(&mut self) -> SceneDiff {
        let scene = self.diagram.scene();
        let diff = self.diffs.compute_diff(&self.published, &scene);
        self.published = scene;
        diff
    }
}

/// A diff plus the notice of the action that caused it.
#[derive(Debug, Clone, Serialize)]
pub struct Update {
    pub diff: SceneDiff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl Update {
    /// Whether clients need to hear about this update at all.
    pub fn is_noteworthy(&self) -> bool {
        self.notice.is_some() || !self.diff.is_empty()
    }
}
