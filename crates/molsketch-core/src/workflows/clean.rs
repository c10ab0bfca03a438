use crate::core::models::ids::AtomId;
use crate::core::utils::geometry::lerp;
use crate::engine::commands::CleanStructureCommand;
use nalgebra::Point2;
use std::collections::HashMap;
use tracing::trace;

/// Frame-by-frame interpolation from the current drawing to a cleaned layout.
///
/// Frames are computed without touching the document; the caller renders them. Only
/// [`CleanAnimation::finish`] produces something that changes the document, and it does so
/// as one command, so the whole animation is a single undo step. Dropping the animation
/// before finishing it cancels the cleanup.
#[derive(Debug, Clone)]
pub struct CleanAnimation {
    start: HashMap<AtomId, Point2<f64>>,
    target: HashMap<AtomId, Point2<f64>>,
    steps: usize,
    current: usize,
}

/// Smooth-step easing: zero slope at both ends.
fn ease(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

impl CleanAnimation {
    /// Creates an animation of `steps` frames. A step count of zero is treated as one.
    ///
    /// Atoms present in `target` but missing from `start` jump straight to their target.
    pub fn new(
        start: HashMap<AtomId, Point2<f64>>,
        target: HashMap<AtomId, Point2<f64>>,
        steps: usize,
    ) -> Self {
        Self {
            start,
            target,
            steps: steps.max(1),
            current: 0,
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of frames already produced.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.steps
    }

    pub fn target(&self) -> &HashMap<AtomId, Point2<f64>> {
        &self.target
    }

    /// Advances one frame and returns the positions of every animated atom.
    ///
    /// The last frame equals the target exactly. Returns `None` once finished.
    pub fn tick(&mut self) -> Option<HashMap<AtomId, Point2<f64>>> {
        if self.is_finished() {
            return None;
        }
        self.current += 1;
        let t = ease(self.current as f64 / self.steps as f64);
        trace!("Clean animation frame {}/{}", self.current, self.steps);

        let frame = self
            .target
            .iter()
            .map(|(&id, end)| {
                let position = match self.start.get(&id) {
                    Some(begin) if !self.is_finished() => lerp(begin, end, t),
                    _ => *end,
                };
                (id, position)
            })
            .collect();
        Some(frame)
    }

    /// Ends the animation, returning the command that commits the final layout.
    pub fn finish(self) -> CleanStructureCommand {
        CleanStructureCommand::new(self.target)
    }
}
