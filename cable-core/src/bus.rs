//! The shared, per-compartment ion-concentration bus.
//!
//! The host engine owns one [`IonBus`] per model. For every registered ion
//! species the bus holds, per compartment, a concentration value (mM) and a
//! transmembrane current value (mA/cm²). Mechanisms never hold references
//! into the bus; they hold index-based handles issued at model-build time:
//!
//! - [`ReadHandle`] — `Copy`, unlimited per slot, reads only
//! - [`WriteHandle`] — neither `Copy` nor `Clone`, at most one per slot,
//!   additionally writes the concentration
//!
//! The exactly-one-writer discipline is enforced when a mechanism claims its
//! write handle, so no locking is needed at runtime: the host may drive
//! independent compartments from different threads as long as each slot has
//! the single writer the registry guarantees.

use thiserror::Error;

/// Identifies a registered ion species on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeciesId(usize);

impl SpeciesId {
    /// The position of this species in the bus's registration order.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Identifies a compartment of the simulated morphology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompartmentId(usize);

impl CompartmentId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

/// Errors that can occur while building against the bus.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BusError {
    #[error("unknown species {name:?}")]
    UnknownSpecies { name: String },

    #[error("compartment {index} out of range ({count} compartments)")]
    CompartmentOutOfRange { index: usize, count: usize },

    #[error(
        "species {species:?} is registered with valence {existing}, \
         cannot re-register with valence {requested}"
    )]
    ValenceMismatch {
        species: String,
        existing: f64,
        requested: f64,
    },

    #[error(
        "concentration of {species:?} in compartment {compartment} \
         is already written by {owner:?}"
    )]
    WriteConflict {
        species: String,
        compartment: usize,
        owner: String,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    concentration: f64,
    current: f64,
}

#[derive(Debug, Clone)]
struct SpeciesEntry {
    name: String,
    valence: Option<f64>,
}

/// Host-owned ion state, shared by every mechanism in a model.
#[derive(Debug)]
pub struct IonBus {
    species: Vec<SpeciesEntry>,
    compartments: usize,
    slots: Vec<Slot>,
    owners: Vec<Option<String>>,
}

impl IonBus {
    /// Creates a bus for a model with `compartments` compartments and no
    /// registered species. All slots start at zero.
    pub fn new(compartments: usize) -> Self {
        Self {
            species: Vec::new(),
            compartments,
            slots: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// The number of compartments this bus serves.
    pub fn compartments(&self) -> usize {
        self.compartments
    }

    /// Registers an ion species, or finds it if already registered.
    ///
    /// Registration is idempotent. A species first registered without a
    /// valence may be promoted by a later registration that declares one;
    /// two registrations declaring different valences conflict.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::ValenceMismatch`] if `valence` contradicts an
    /// earlier declaration.
    pub fn register_species(
        &mut self,
        name: &str,
        valence: Option<f64>,
    ) -> Result<SpeciesId, BusError> {
        if let Some(position) = self.species.iter().position(|entry| entry.name == name) {
            let entry = &mut self.species[position];
            match (entry.valence, valence) {
                (Some(existing), Some(requested)) if existing != requested => {
                    return Err(BusError::ValenceMismatch {
                        species: name.to_string(),
                        existing,
                        requested,
                    });
                }
                (None, Some(_)) => entry.valence = valence,
                _ => {}
            }
            return Ok(SpeciesId(position));
        }

        self.species.push(SpeciesEntry {
            name: name.to_string(),
            valence,
        });
        self.slots
            .extend(std::iter::repeat_n(Slot::default(), self.compartments));
        self.owners
            .extend(std::iter::repeat_n(None, self.compartments));
        Ok(SpeciesId(self.species.len() - 1))
    }

    /// Looks up a species by name.
    pub fn species(&self, name: &str) -> Option<SpeciesId> {
        self.species
            .iter()
            .position(|entry| entry.name == name)
            .map(SpeciesId)
    }

    /// The declared valence of a species, if any registration declared one.
    ///
    /// # Panics
    ///
    /// Panics if `species` was not issued by this bus.
    pub fn valence(&self, species: SpeciesId) -> Option<f64> {
        self.species[species.0].valence
    }

    /// Issues a read handle for one (species, compartment) slot.
    ///
    /// Any number of read handles may exist for the same slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the species is unknown to this bus or the
    /// compartment is out of range.
    pub fn read_handle(
        &self,
        species: SpeciesId,
        compartment: CompartmentId,
    ) -> Result<ReadHandle, BusError> {
        self.validate(species, compartment)?;
        Ok(ReadHandle {
            species,
            compartment,
        })
    }

    /// Claims write ownership of one concentration slot.
    ///
    /// At most one write handle exists per slot for the lifetime of the bus;
    /// `owner` names the claiming mechanism for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::WriteConflict`] if another mechanism already owns
    /// the slot, or a range error as for [`read_handle`](Self::read_handle).
    pub fn claim_write(
        &mut self,
        species: SpeciesId,
        compartment: CompartmentId,
        owner: &str,
    ) -> Result<WriteHandle, BusError> {
        self.validate(species, compartment)?;
        let offset = self.offset(species, compartment);
        if let Some(existing) = &self.owners[offset] {
            return Err(BusError::WriteConflict {
                species: self.species[species.0].name.clone(),
                compartment: compartment.0,
                owner: existing.clone(),
            });
        }
        self.owners[offset] = Some(owner.to_string());
        Ok(WriteHandle {
            species,
            compartment,
        })
    }

    /// The name of the mechanism that owns a concentration slot, if any.
    ///
    /// # Panics
    ///
    /// Panics if `species` or `compartment` is out of range for this bus.
    pub fn write_owner(&self, species: SpeciesId, compartment: CompartmentId) -> Option<&str> {
        let offset = self.checked_offset(species, compartment);
        self.owners[offset].as_deref()
    }

    /// The concentration of a species in a compartment (mM).
    ///
    /// # Panics
    ///
    /// Panics if `species` or `compartment` is out of range for this bus.
    pub fn concentration(&self, species: SpeciesId, compartment: CompartmentId) -> f64 {
        self.slots[self.checked_offset(species, compartment)].concentration
    }

    /// The transmembrane current of a species in a compartment (mA/cm²).
    ///
    /// # Panics
    ///
    /// Panics if `species` or `compartment` is out of range for this bus.
    pub fn current(&self, species: SpeciesId, compartment: CompartmentId) -> f64 {
        self.slots[self.checked_offset(species, compartment)].current
    }

    /// Sets the transmembrane current of a species in a compartment.
    ///
    /// Currents are produced by the host's electrical solve (or by tests);
    /// they are not subject to write ownership, which covers concentrations
    /// only.
    ///
    /// # Panics
    ///
    /// Panics if `species` or `compartment` is out of range for this bus.
    pub fn set_current(&mut self, species: SpeciesId, compartment: CompartmentId, value: f64) {
        let offset = self.checked_offset(species, compartment);
        self.slots[offset].current = value;
    }

    fn validate(&self, species: SpeciesId, compartment: CompartmentId) -> Result<(), BusError> {
        if species.0 >= self.species.len() {
            return Err(BusError::UnknownSpecies {
                name: format!("#{}", species.0),
            });
        }
        if compartment.0 >= self.compartments {
            return Err(BusError::CompartmentOutOfRange {
                index: compartment.0,
                count: self.compartments,
            });
        }
        Ok(())
    }

    fn offset(&self, species: SpeciesId, compartment: CompartmentId) -> usize {
        species.0 * self.compartments + compartment.0
    }

    fn checked_offset(&self, species: SpeciesId, compartment: CompartmentId) -> usize {
        assert!(
            species.0 < self.species.len(),
            "species #{} was not issued by this bus",
            species.0
        );
        assert!(
            compartment.0 < self.compartments,
            "compartment {} out of range ({} compartments)",
            compartment.0,
            self.compartments
        );
        self.offset(species, compartment)
    }
}

/// A read-only capability for one (species, compartment) slot.
///
/// A handle is only meaningful with the bus that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadHandle {
    species: SpeciesId,
    compartment: CompartmentId,
}

impl ReadHandle {
    /// Reads the slot's concentration (mM).
    pub fn concentration(&self, bus: &IonBus) -> f64 {
        bus.slots[bus.checked_offset(self.species, self.compartment)].concentration
    }

    /// Reads the slot's transmembrane current (mA/cm²).
    pub fn current(&self, bus: &IonBus) -> f64 {
        bus.slots[bus.checked_offset(self.species, self.compartment)].current
    }
}

/// The exclusive write capability for one concentration slot.
///
/// Deliberately neither `Copy` nor `Clone`: the handle is the proof that its
/// holder is the slot's single authorized writer.
#[derive(Debug, PartialEq, Eq)]
pub struct WriteHandle {
    species: SpeciesId,
    compartment: CompartmentId,
}

impl WriteHandle {
    /// Reads the slot's concentration (mM).
    pub fn concentration(&self, bus: &IonBus) -> f64 {
        bus.slots[bus.checked_offset(self.species, self.compartment)].concentration
    }

    /// Writes the slot's concentration (mM).
    pub fn set_concentration(&self, bus: &mut IonBus, value: f64) {
        let offset = bus.checked_offset(self.species, self.compartment);
        bus.slots[offset].concentration = value;
    }

    /// A read handle for the same slot.
    pub fn reader(&self) -> ReadHandle {
        ReadHandle {
            species: self.species,
            compartment: self.compartment,
        }
    }
}
