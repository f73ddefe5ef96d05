use crate::core::time::Countdown;

/// Lifecycle of the host render surface as seen by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Active,
    /// Surface lost; a remount is scheduled.
    Lost,
    /// Remount issued; waiting for the new surface to report itself restored.
    Recovering,
}

/// Watches surface loss and restore events and turns each loss into exactly
/// one remount, keyed by a monotonically increasing generation counter.
pub struct SurfaceContinuityGuard {
    state: SurfaceState,
    generation: u32,
    remount_delay: f64,
    remount_timer: Countdown,
    /// A restore arrived while the remount was still pending.
    restored_early: bool,
    alive: bool,
}

impl SurfaceContinuityGuard {
    pub fn new(remount_delay: f64) -> Self {
        Self {
            state: SurfaceState::Active,
            generation: 0,
            remount_delay,
            remount_timer: Countdown::new(),
            restored_early: false,
            alive: true,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    /// Remount key for the current surface.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Handle a surface-lost event. Always returns true: the host must
    /// prevent the event's default handling. No error is surfaced.
    pub fn on_lost(&mut self, now: f64) -> bool {
        if !self.alive {
            return true;
        }
        match self.state {
            SurfaceState::Lost => {
                log::debug!("surface lost again before remount; already scheduled");
            }
            SurfaceState::Active | SurfaceState::Recovering => {
                log::warn!("render surface lost - seamlessly restarting");
                self.state = SurfaceState::Lost;
                self.restored_early = false;
                self.remount_timer.arm(now, self.remount_delay);
            }
        }
        true
    }

    /// Handle a surface-restored event. Returns true if it changed state.
    pub fn on_restored(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        match self.state {
            SurfaceState::Active => false,
            SurfaceState::Lost => {
                log::info!("render surface restored; remount still pending");
                self.restored_early = true;
                false
            }
            SurfaceState::Recovering => {
                log::info!("render surface restored");
                self.state = SurfaceState::Active;
                true
            }
        }
    }

    /// Fire the remount once its delay has passed. Returns the new generation.
    pub fn poll(&mut self, now: f64) -> Option<u32> {
        if !self.alive || !self.remount_timer.poll(now) {
            return None;
        }
        self.generation += 1;
        self.state = if self.restored_early {
            SurfaceState::Active
        } else {
            SurfaceState::Recovering
        };
        self.restored_early = false;
        log::info!("remounting render surface (generation {})", self.generation);
        Some(self.generation)
    }

    /// Cancel any pending remount and ignore all further events.
    pub fn teardown(&mut self) {
        self.alive = false;
        self.remount_timer.cancel();
    }
}
