use thunderdome as td;

/// Key type to look up a particle stored in a [`ParticleWorld`][super::ParticleWorld].
///
/// Keys are generational, so a key to a removed particle
/// never resolves to a different particle inserted later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParticleKey(pub(crate) td::Index);

impl ParticleKey {
    /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
    /// Useful for creating your own mappings from particles to other things.
    #[inline]
    pub fn index(&self) -> td::Index {
        self.0
    }

    /// Slot of the key in the arena, used to order contact pairs.
    #[inline]
    pub(crate) fn slot(&self) -> u32 {
        self.0.slot()
    }
}

/// Key type to look up a rigid body stored in a [`RigidWorld`][super::RigidWorld].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyKey(pub(crate) td::Index);

impl BodyKey {
    /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
    #[inline]
    pub fn index(&self) -> td::Index {
        self.0
    }
}

/// Key type to look up a constraint stored in a [`ParticleWorld`][super::ParticleWorld].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConstraintKey(pub(crate) td::Index);

impl ConstraintKey {
    /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
    #[inline]
    pub fn index(&self) -> td::Index {
        self.0
    }
}
