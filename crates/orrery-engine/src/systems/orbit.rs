//! Circular orbital motion with drift-free pause/resume.
//!
//! Position is never stored: it is recomputed every frame from the elapsed time
//! minus the total time spent paused. Pausing only ever adds to that offset,
//! so the phase resumes exactly where it froze.

use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitMotionState {
    /// Angular speed in radians per second.
    angular_speed: f32,
    /// Orbit radius in world units.
    radius: f32,
    /// Sum of all completed pause intervals, in seconds.
    pause_offset: f64,
    /// Elapsed time at which the current pause began. `Some` iff paused.
    paused_at: Option<f64>,
}

impl OrbitMotionState {
    pub fn new(angular_speed: f32, radius: f32) -> Self {
        Self {
            angular_speed,
            radius: radius.max(0.0),
            pause_offset: 0.0,
            paused_at: None,
        }
    }

    /// Whether this body moves at all. Stationary bodies ignore pausing.
    pub fn is_stationary(&self) -> bool {
        self.angular_speed == 0.0 || self.radius == 0.0
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause_offset(&self) -> f64 {
        self.pause_offset
    }

    /// Apply the pause flag for this frame and return the local (x, z) offset
    /// from the orbit center.
    pub fn advance(&mut self, now: f64, paused: bool) -> (f32, f32) {
        if !self.is_stationary() {
            match (self.paused_at, paused) {
                (None, true) => self.paused_at = Some(now),
                (Some(start), false) => {
                    self.pause_offset += (now - start).max(0.0);
                    self.paused_at = None;
                }
                _ => {}
            }
        }
        self.position_at(now)
    }

    /// Local (x, z) offset at `now` without changing pause state.
    pub fn position_at(&self, now: f64) -> (f32, f32) {
        if self.is_stationary() {
            return (0.0, 0.0);
        }
        // While paused the clock is frozen at the pause start.
        let clock = self.paused_at.unwrap_or(now);
        let t = (clock - self.pause_offset) * self.angular_speed as f64;
        ((t.sin() * self.radius as f64) as f32, (t.cos() * self.radius as f64) as f32)
    }
}

/// Resolve world positions from per-body local offsets and orbit parents.
/// `parents[i]` is the body whose position body `i` orbits (`None` = origin).
/// Parent chains must be acyclic.
pub fn world_positions(local: &[(f32, f32)], parents: &[Option<usize>]) -> Vec<Vec3> {
    let mut resolved: Vec<Option<Vec3>> = vec![None; local.len()];
    for i in 0..local.len() {
        resolve(i, local, parents, &mut resolved, 0);
    }
    resolved.into_iter().map(|p| p.unwrap_or(Vec3::ZERO)).collect()
}

fn resolve(
    i: usize,
    local: &[(f32, f32)],
    parents: &[Option<usize>],
    resolved: &mut [Option<Vec3>],
    depth: usize,
) -> Vec3 {
    if let Some(pos) = resolved[i] {
        return pos;
    }
    let (x, z) = local[i];
    let center = match parents.get(i).copied().flatten() {
        Some(p) if p < local.len() && depth < local.len() => {
            resolve(p, local, parents, resolved, depth + 1)
        }
        _ => Vec3::ZERO,
    };
    let pos = center + Vec3::new(x, 0.0, z);
    resolved[i] = Some(pos);
    pos
}
