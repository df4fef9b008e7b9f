//! Roster
//!
//! The fixed group of people a receipt is split between. Roster order is the
//! canonical order for totals and for deterministic remainder tie-breaks.

use std::{fmt, str::FromStr};

use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised while building a roster or selecting participants from it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    /// A roster must contain at least one participant.
    #[error("roster must contain at least one participant")]
    Empty,

    /// Participant names must not be blank.
    #[error("participant name must not be blank")]
    BlankName,

    /// The same participant was listed twice.
    #[error("participant {0:?} is listed more than once")]
    Duplicate(String),

    /// A name was selected that is not on the roster.
    #[error("{0:?} is not on the roster")]
    UnknownParticipant(String),

    /// A roster index was outside the roster.
    #[error("participant index {0} is outside the roster")]
    IndexOutOfRange(usize),
}

/// A single person on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Participant(String);

impl Participant {
    /// Creates a participant from a display name.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::BlankName`] if the trimmed name is empty.
    pub fn new(name: &str) -> Result<Self, RosterError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(RosterError::BlankName);
        }

        Ok(Self(name.to_string()))
    }

    /// Returns the participant's display name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, duplicate-free list of participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    participants: SmallVec<[Participant; 4]>,
}

impl Roster {
    /// Creates a roster from display names, preserving their order.
    ///
    /// # Errors
    ///
    /// - [`RosterError::Empty`]: no names were given.
    /// - [`RosterError::BlankName`]: a name was blank.
    /// - [`RosterError::Duplicate`]: a name appeared twice.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, RosterError> {
        let mut participants: SmallVec<[Participant; 4]> = SmallVec::new();

        for name in names {
            let participant = Participant::new(name.as_ref())?;

            if participants.contains(&participant) {
                return Err(RosterError::Duplicate(participant.0));
            }

            participants.push(participant);
        }

        if participants.is_empty() {
            return Err(RosterError::Empty);
        }

        Ok(Self { participants })
    }

    /// Number of participants on the roster.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Always `false`; a roster cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participants in roster order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Returns the participant at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Participant> {
        self.participants.get(index)
    }

    /// Returns the roster index of the named participant.
    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();

        self.participants.iter().position(|p| p.name() == name)
    }

    /// Builds a participant set from names. Repeated names collapse into one member.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::UnknownParticipant`] for a name not on the roster.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<ParticipantSet, RosterError> {
        let mut set = ParticipantSet::empty();

        for name in names {
            let index = self
                .position(name.as_ref())
                .ok_or_else(|| RosterError::UnknownParticipant(name.as_ref().trim().to_string()))?;

            set.insert(index);
        }

        Ok(set)
    }

    /// A participant set containing everyone on the roster.
    pub fn everyone(&self) -> ParticipantSet {
        ParticipantSet {
            members: (0..self.len()).collect(),
        }
    }

    /// Checks that every member of `set` is on this roster.
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::IndexOutOfRange`] for the first member outside the roster.
    pub fn check(&self, set: &ParticipantSet) -> Result<(), RosterError> {
        match set.iter().find(|&index| index >= self.len()) {
            Some(index) => Err(RosterError::IndexOutOfRange(index)),
            None => Ok(()),
        }
    }

    /// Names of the members of `set`, in roster order.
    pub fn names(&self, set: &ParticipantSet) -> Vec<&str> {
        set.iter()
            .filter_map(|index| self.get(index).map(Participant::name))
            .collect()
    }
}

impl FromStr for Roster {
    type Err = RosterError;

    /// Parses a comma separated list such as `"Joe,Nic,Nat"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').collect();

        Self::new(&names)
    }
}

/// A duplicate-free set of roster indexes, kept in roster order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantSet {
    members: SmallVec<[usize; 4]>,
}

impl ParticipantSet {
    /// The empty set. Items assigned to nobody are skipped by the allocator.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a set from roster indexes, ignoring repeats.
    pub fn from_indexes(indexes: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::empty();

        for index in indexes {
            set.insert(index);
        }

        set
    }

    /// Adds a member, keeping roster order. Returns `false` if it was already present.
    pub fn insert(&mut self, index: usize) -> bool {
        match self.members.binary_search(&index) {
            Ok(_) => false,
            Err(at) => {
                self.members.insert(at, index);
                true
            }
        }
    }

    /// Whether `index` is a member.
    pub fn contains(&self, index: usize) -> bool {
        self.members.binary_search(&index).is_ok()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nobody is assigned.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in roster order.
    pub fn as_slice(&self) -> &[usize] {
        &self.members
    }

    /// Iterates members in roster order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members.iter().copied()
    }
}
