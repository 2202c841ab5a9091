//! Broad phase collision detection algorithms
//! are responsible for detecting pairs of possibly intersecting particles
//! for further, more accurate narrow phase inspection.

use super::{SpatialGrid, AABB};
use crate::physics::{Particle, ParticleKey};

use thunderdome as td;

/// A broad phase algorithm.
///
/// Every pair is reported once, ordered so that the first key has the lower arena slot.
pub trait BroadPhase {
    /// Returns pairs of potentially intersecting particles.
    fn pairs(&mut self, particles: &td::Arena<Particle>) -> Vec<[ParticleKey; 2]>;
}

/// Which broad phase a particle world uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub enum BroadPhaseMethod {
    /// Every particle against every other particle.
    BruteForce,
    /// Pairs whose bounding boxes overlap.
    Aabb,
    /// Neighbouring cells of a [`SpatialGrid`][super::SpatialGrid].
    #[default]
    Grid,
}

/// The simplest possible broad phase algorithm,
/// which pairs every object with every other object.
/// Very inefficient, but can work for small systems.
pub struct BruteForce;

impl BroadPhase for BruteForce {
    fn pairs(&mut self, particles: &td::Arena<Particle>) -> Vec<[ParticleKey; 2]> {
        let keys: Vec<td::Index> = particles.iter().map(|(k, _)| k).collect();
        let mut pairs = Vec::new();
        let mut items = keys.iter();
        while let Some(&k1) = items.next() {
            for &k2 in items.clone() {
                pairs.push([ParticleKey(k1), ParticleKey(k2)]);
            }
        }

        pairs
    }
}

/// All-pairs testing with a cheap bounding box rejection in front.
pub struct AabbOverlap;

impl BroadPhase for AabbOverlap {
    fn pairs(&mut self, particles: &td::Arena<Particle>) -> Vec<[ParticleKey; 2]> {
        let boxes: Vec<(td::Index, AABB)> = particles
            .iter()
            .map(|(k, p)| (k, AABB::from_particle(p)))
            .collect();

        let mut pairs = Vec::new();
        for (i, (k1, b1)) in boxes.iter().enumerate() {
            for (k2, b2) in &boxes[i + 1..] {
                if b1.intersects(b2) {
                    pairs.push([ParticleKey(*k1), ParticleKey(*k2)]);
                }
            }
        }

        pairs
    }
}

impl BroadPhase for SpatialGrid {
    fn pairs(&mut self, particles: &td::Arena<Particle>) -> Vec<[ParticleKey; 2]> {
        self.clear();
        for (k, p) in particles.iter() {
            self.insert(ParticleKey(k), p.position);
        }

        let mut pairs = Vec::new();
        for (k, p) in particles.iter() {
            let key = ParticleKey(k);
            // keeping only higher slots dedupes pairs and drops the particle itself
            pairs.extend(
                self.query(p.position)
                    .filter(|other| other.slot() > key.slot())
                    .map(|other| [key, other]),
            );
        }

        pairs
    }
}
