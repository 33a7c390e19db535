pub mod collide;
pub mod store;

use log::{debug, info};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    config::{Settings, SimulationSettings},
    forces::ForceSet,
    types::{LayoutMode, Phase, Placement, SimStats, Vec2},
};

use self::{collide::Collider, store::EntityStore};

/// Receives every entity's position after a tick that moved something.
pub trait PositionSink {
    fn receive(&mut self, placements: &[Placement]);
}

impl<F: FnMut(&[Placement])> PositionSink for F {
    fn receive(&mut self, placements: &[Placement]) {
        self(placements)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// `start` has not been called yet.
    Idle,
    /// Alpha is below its floor; nothing moved and the sink was not called.
    Resting,
    Moved,
}

pub struct Simulation {
    store: EntityStore,
    forces: ForceSet,
    mode: LayoutMode,
    params: SimulationSettings,
    collide_padding: f32,
    phase: Phase,
    alpha: f32,
    alpha_target: f32,
    settle_elapsed: u32,
    ticks: u64,
    last_collisions: usize,
    collider: Collider,
    placements: Vec<Placement>,
    rng: StdRng,
}

impl Simulation {
    /// Scatters the store over the canvas and starts in `Combine`, idle.
    pub fn new(mut store: EntityStore, settings: &Settings) -> Self {
        let forces = ForceSet::build(&store, settings);
        let mut rng = StdRng::seed_from_u64(settings.simulation.seed);
        let (width, height) = (settings.canvas.width, settings.canvas.height);
        for entity in store.entities_mut() {
            entity.pos = Vec2::new(rng.gen_range(0.0..width), rng.gen_range(0.0..height));
            entity.vel = Vec2::ZERO;
        }
        let placements = store
            .entities()
            .iter()
            .map(|e| Placement {
                id: e.id.clone(),
                pos: e.pos,
            })
            .collect();

        Self {
            store,
            forces,
            mode: LayoutMode::Combine,
            params: settings.simulation,
            collide_padding: settings.forces.collide_padding,
            phase: Phase::Idle,
            alpha: 1.0,
            alpha_target: 0.0,
            settle_elapsed: 0,
            ticks: 0,
            last_collisions: 0,
            collider: Collider::new(),
            placements,
            rng,
        }
    }

    pub fn start(&mut self) {
        if self.phase == Phase::Idle {
            info!(
                "starting simulation with {} entities in {:?}",
                self.store.len(),
                self.mode
            );
            self.phase = Phase::Running;
        }
    }

    /// Swaps the force pair and collision toggle, then re-heats toward the
    /// settle target. The settle lasts at least `settle_ticks` and ends once
    /// no body moves more than `settle_displacement` in a tick, or after
    /// `settle_max_ticks`. Calling it again with the same mode only restarts
    /// the settle.
    pub fn activate(&mut self, mode: LayoutMode) {
        debug!("activating {:?} (was {:?}, alpha {:.3})", mode, self.mode, self.alpha);
        self.mode = mode;
        if self.phase == Phase::Idle {
            return;
        }
        self.alpha_target = self.params.settle_alpha_target;
        self.settle_elapsed = 0;
        self.phase = Phase::Settling;
    }

    pub fn tick(&mut self, sink: &mut impl PositionSink) -> TickOutcome {
        match self.phase {
            Phase::Idle => return TickOutcome::Idle,
            Phase::Running if self.alpha < self.params.alpha_min => {
                return TickOutcome::Resting;
            }
            Phase::Running | Phase::Settling => {}
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.ticks += 1;

        let alpha = self.alpha;
        let pair = self.forces.pair(self.mode);
        for entity in self.store.entities_mut() {
            let dvx = pair.x.impulse(entity, entity.pos.x, alpha);
            let dvy = pair.y.impulse(entity, entity.pos.y, alpha);
            entity.vel += Vec2::new(dvx, dvy);
        }

        self.last_collisions = if self.mode.collides() {
            self.collider.resolve(
                self.store.entities_mut(),
                self.collide_padding,
                self.params.collision_iterations,
                &mut self.rng,
            )
        } else {
            0
        };

        let friction = 1.0 - self.params.velocity_decay;
        let mut max_step = 0.0_f32;
        for (entity, placement) in self
            .store
            .entities_mut()
            .iter_mut()
            .zip(self.placements.iter_mut())
        {
            entity.vel = entity.vel * friction;
            entity.pos += entity.vel;
            placement.pos = entity.pos;
            max_step = max_step.max(entity.vel.length());
        }
        sink.receive(&self.placements);

        if self.phase == Phase::Settling {
            self.settle_elapsed += 1;
            let still = max_step < self.params.settle_displacement;
            if self.settle_elapsed >= self.params.settle_ticks
                && (still || self.settle_elapsed >= self.params.settle_max_ticks)
            {
                debug!(
                    "settle finished after {} ticks at alpha {:.3}, largest step {:.4}",
                    self.settle_elapsed, self.alpha, max_step
                );
                self.alpha_target = 0.0;
                self.phase = Phase::Running;
            }
        }

        TickOutcome::Moved
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn stats(&self) -> SimStats {
        let entities = self.store.entities();
        let mean_speed = if entities.is_empty() {
            0.0
        } else {
            entities.iter().map(|e| e.vel.length()).sum::<f32>() / entities.len() as f32
        };
        SimStats {
            ticks: self.ticks,
            alpha: self.alpha,
            phase: self.phase,
            collisions: self.last_collisions,
            mean_speed,
        }
    }
}
