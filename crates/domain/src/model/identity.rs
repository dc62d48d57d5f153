//! Identity assigned to an entity after it is first persisted.

use std::fmt::Display;

use thiserror::Error;

/// Errors raised by identity bookkeeping.
///
/// Both variants signal a programming error in the caller rather than a
/// condition an end user can fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The entity has not been persisted yet.
    #[error("{entity} ID has not been assigned yet")]
    Unassigned { entity: &'static str },

    /// The entity already carries an identity.
    #[error("{entity} ID has already been assigned ({existing})")]
    AlreadyAssigned {
        entity: &'static str,
        existing: String,
    },
}

/// Write-once identity slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity<I>(Option<I>);

impl<I> Default for Identity<I> {
    fn default() -> Self {
        Self(None)
    }
}

impl<I: Copy + Display> Identity<I> {
    /// Creates an empty slot.
    pub fn unassigned() -> Self {
        Self(None)
    }

    /// Returns the identity if one has been assigned.
    pub fn get(&self) -> Option<I> {
        self.0
    }

    /// Returns true once an identity has been assigned.
    pub fn is_assigned(&self) -> bool {
        self.0.is_some()
    }

    fn assign(&mut self, entity: &'static str, id: I) -> Result<(), IdentityError> {
        if let Some(existing) = self.0 {
            return Err(IdentityError::AlreadyAssigned {
                entity,
                existing: existing.to_string(),
            });
        }
        self.0 = Some(id);
        Ok(())
    }

    fn require(&self, entity: &'static str) -> Result<I, IdentityError> {
        self.0.ok_or(IdentityError::Unassigned { entity })
    }
}

/// An object whose identity is absent until first persisted, then fixed.
pub trait Entity {
    /// The identifier type of this entity kind.
    type Id: Copy + Display;

    /// Human-readable entity kind, used in error messages.
    const KIND: &'static str;

    fn identity(&self) -> &Identity<Self::Id>;

    fn identity_mut(&mut self) -> &mut Identity<Self::Id>;

    /// Returns the identity, or `None` for an unsaved entity.
    fn id(&self) -> Option<Self::Id> {
        self.identity().get()
    }

    /// Checks for an identity without failing.
    fn has_id(&self) -> bool {
        self.identity().is_assigned()
    }

    /// Assigns the identity. Fails if one is already set.
    fn assign_id(&mut self, id: Self::Id) -> Result<(), IdentityError> {
        self.identity_mut().assign(Self::KIND, id)
    }

    /// Returns the identity, failing for an unsaved entity.
    fn require_id(&self) -> Result<Self::Id, IdentityError> {
        self.identity().require(Self::KIND)
    }
}
