use super::{
    boundary::keep_in_bounds,
    collision::{
        particle_contact, AabbOverlap, BroadPhase, BroadPhaseMethod, BruteForce, Contact,
        SpatialGrid,
    },
    Constraint, ConstraintKey, ForceGenerator, Particle, ParticleKey, ParticleResolver,
    SpawnError, SpawnRequest,
};
use crate::{
    config::{ConfigError, ParticleWorldParams},
    math::Vec2,
};

use thunderdome as td;

/// A collection of particles simulated with force generators,
/// constraints, optional particle-particle collisions and a bounding box.
///
/// Every call to [`step`][Self::step] goes through the same phases in a fixed order:
/// forces, integration, constraints, collisions and finally the boundary.
pub struct ParticleWorld {
    particles: td::Arena<Particle>,
    constraints: td::Arena<Constraint>,
    generators: Vec<ForceGenerator>,
    resolver: ParticleResolver,
    grid: SpatialGrid,
    params: ParticleWorldParams,
    // reused between steps to avoid reallocating
    contacts: Vec<Contact>,
}

impl ParticleWorld {
    /// Create an empty world. Fails if the parameters don't pass validation.
    pub fn new(params: ParticleWorldParams) -> Result<Self, ConfigError> {
        params.validate()?;
        log::debug!(
            "Creating particle world of size {}x{} with {:?} broad phase",
            params.width,
            params.height,
            params.broad_phase
        );
        Ok(Self {
            particles: td::Arena::new(),
            constraints: td::Arena::new(),
            generators: Vec::new(),
            resolver: ParticleResolver::new(params.restitution),
            grid: SpatialGrid::new(params.width, params.height, params.cell_size),
            params,
            contacts: Vec::new(),
        })
    }

    /// The parameters currently in effect, including changes made with setters.
    #[inline]
    pub fn params(&self) -> &ParticleWorldParams {
        &self.params
    }

    //
    // particles
    //

    /// Validate a spawn request and add the resulting particle.
    pub fn spawn(&mut self, request: SpawnRequest) -> Result<ParticleKey, SpawnError> {
        match request.to_particle() {
            Ok(particle) => Ok(self.insert(particle)),
            Err(err) => {
                log::warn!("Rejected particle spawn: {err}");
                Err(err)
            }
        }
    }

    /// Add a particle without validation.
    pub fn insert(&mut self, particle: Particle) -> ParticleKey {
        ParticleKey(self.particles.insert(particle))
    }

    /// Remove a particle and every constraint that refers to it.
    pub fn remove(&mut self, key: ParticleKey) -> Option<Particle> {
        let particle = self.particles.remove(key.0)?;
        self.constraints.retain(|_, c| !c.involves(key));
        Some(particle)
    }

    #[inline]
    pub fn get(&self, key: ParticleKey) -> Option<&Particle> {
        self.particles.get(key.0)
    }

    #[inline]
    pub fn get_mut(&mut self, key: ParticleKey) -> Option<&mut Particle> {
        self.particles.get_mut(key.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticleKey, &Particle)> {
        self.particles.iter().map(|(k, p)| (ParticleKey(k), p))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ParticleKey, &mut Particle)> {
        self.particles.iter_mut().map(|(k, p)| (ParticleKey(k), p))
    }

    /// Number of live particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Keep only the particles for which the predicate returns true.
    ///
    /// Constraints referring to removed particles are dropped at the start of the next step.
    pub fn retain(&mut self, mut pred: impl FnMut(ParticleKey, &mut Particle) -> bool) {
        self.particles.retain(|k, p| pred(ParticleKey(k), p));
    }

    /// Remove all particles and constraints. Force generators are kept.
    pub fn clear(&mut self) {
        log::debug!(
            "Clearing {} particles and {} constraints",
            self.particles.len(),
            self.constraints.len()
        );
        self.particles.clear();
        self.constraints.clear();
        self.contacts.clear();
    }

    //
    // constraints
    //

    pub fn add_constraint(&mut self, constraint: Constraint) -> ConstraintKey {
        ConstraintKey(self.constraints.insert(constraint))
    }

    /// Access a constraint if it still exists.
    #[inline]
    pub fn constraint(&self, key: ConstraintKey) -> Option<&Constraint> {
        self.constraints.get(key.0)
    }

    /// Mutably access a constraint if it still exists.
    #[inline]
    pub fn constraint_mut(&mut self, key: ConstraintKey) -> Option<&mut Constraint> {
        self.constraints.get_mut(key.0)
    }

    /// Remove a constraint. Returns the constraint if it still existed.
    ///
    /// Constraints also disappear when one of their particles is removed,
    /// so a constraint can be gone even if it was never removed explicitly.
    pub fn remove_constraint(&mut self, key: ConstraintKey) -> Option<Constraint> {
        self.constraints.remove(key.0)
    }

    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintKey, &Constraint)> {
        self.constraints.iter().map(|(k, c)| (ConstraintKey(k), c))
    }

    #[inline]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    //
    // force generators
    //

    pub fn add_force_generator(&mut self, generator: ForceGenerator) {
        self.generators.push(generator);
    }

    #[inline]
    pub fn force_generators(&self) -> &[ForceGenerator] {
        &self.generators
    }

    /// Mutable access to generators, e.g. for moving attractors around.
    #[inline]
    pub fn force_generators_mut(&mut self) -> &mut [ForceGenerator] {
        &mut self.generators
    }

    pub fn clear_force_generators(&mut self) {
        self.generators.clear();
    }

    //
    // settings
    //

    #[inline]
    pub fn gravity_enabled(&self) -> bool {
        self.params.gravity_enabled
    }

    /// Turn gravity generators on or off. Other generators are unaffected.
    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.params.gravity_enabled = enabled;
    }

    #[inline]
    pub fn collisions_enabled(&self) -> bool {
        self.params.collisions_enabled
    }

    pub fn set_collisions_enabled(&mut self, enabled: bool) {
        self.params.collisions_enabled = enabled;
    }

    /// Set the restitution of particle-particle contacts. Negative values are clamped to zero.
    pub fn set_restitution(&mut self, restitution: f32) {
        let restitution = restitution.max(0.0);
        self.params.restitution = restitution;
        self.resolver.restitution = restitution;
    }

    /// Set how many times constraints are solved per step. Zero is raised to one.
    pub fn set_constraint_iterations(&mut self, iterations: usize) {
        if iterations == 0 {
            log::warn!("Constraint iteration count must be at least 1, using 1");
        }
        self.params.constraint_iterations = iterations.max(1);
    }

    /// Resize the simulation area and the spatial grid covering it.
    pub fn set_bounds(&mut self, width: f32, height: f32) -> Result<(), ConfigError> {
        let params = ParticleWorldParams {
            width,
            height,
            ..self.params
        };
        params.validate()?;
        self.params = params;
        self.grid = SpatialGrid::new(width, height, params.cell_size);
        Ok(())
    }

    pub fn set_broad_phase(&mut self, method: BroadPhaseMethod) {
        self.params.broad_phase = method;
    }

    //
    // simulation
    //

    /// Advance the simulation by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let _span = tracy_span!("particle step", "step");

        // removal with `retain` can leave constraints pointing nowhere
        let particles = &self.particles;
        self.constraints
            .retain(|_, c| c.particles().all(|k| particles.contains(k.0)));

        {
            let _span = tracy_span!("apply forces", "step");
            let gravity_enabled = self.params.gravity_enabled;
            for (_, particle) in self.particles.iter_mut() {
                if particle.has_infinite_mass() {
                    continue;
                }
                for generator in &self.generators {
                    if !gravity_enabled && generator.is_gravity() {
                        continue;
                    }
                    generator.apply(particle, dt);
                }
            }
        }

        {
            let _span = tracy_span!("integrate", "step");
            for (_, particle) in self.particles.iter_mut() {
                particle.integrate(dt);
            }
        }

        {
            let _span = tracy_span!("solve constraints", "step");
            for _ in 0..self.params.constraint_iterations {
                for (_, constraint) in self.constraints.iter() {
                    constraint.solve(&mut self.particles);
                }
            }
        }

        if self.params.collisions_enabled && self.particles.len() >= 2 {
            let _span = tracy_span!("particle collisions", "step");
            self.collide();
        }

        {
            let _span = tracy_span!("boundary", "step");
            let size = Vec2::new(self.params.width, self.params.height);
            let restitution = self.params.boundary_restitution;
            for (_, particle) in self.particles.iter_mut() {
                if particle.has_infinite_mass() {
                    continue;
                }
                keep_in_bounds(
                    &mut particle.position,
                    &mut particle.velocity,
                    particle.radius,
                    size,
                    restitution,
                );
            }
        }
    }

    fn collide(&mut self) {
        let pairs = match self.params.broad_phase {
            BroadPhaseMethod::BruteForce => BruteForce.pairs(&self.particles),
            BroadPhaseMethod::Aabb => AabbOverlap.pairs(&self.particles),
            BroadPhaseMethod::Grid => self.grid.pairs(&self.particles),
        };

        self.contacts.clear();
        let particles = &self.particles;
        self.contacts.extend(pairs.into_iter().filter_map(|keys| {
            let [k1, k2] = keys;
            particle_contact(keys, particles.get(k1.0)?, particles.get(k2.0)?)
        }));
        log::trace!("{} particle contacts", self.contacts.len());

        self.resolver
            .resolve_contacts(&mut self.particles, &self.contacts);
    }
}
