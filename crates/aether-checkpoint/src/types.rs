//! Keys, entries and the tag enumerations stored in a checkpoint.

use std::fmt;

use aether_core::ValueKind;

// ── Key ─────────────────────────────────────────────────────────

/// The closed set of keys a checkpoint may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// [`Model`] tag.
    Model,
    /// Step counter (unsigned).
    Step,
    /// Whether any cell toppled in the last step (flag, absent at step 0).
    ChangedFromPreviousStep,
    /// Grid payload (bytes, owned by the grid backend).
    Grid,
    /// [`GridType`] tag.
    GridType,
    /// [`GridImplementation`] tag of the grid payload.
    GridImplementation,
    /// Encoded initial value (bytes).
    InitialConfiguration,
    /// [`InitialConfiguration`] tag.
    InitialConfigurationType,
    /// [`ValueKind`] tag of the initial value.
    InitialConfigurationImplementation,
    /// Largest stored coordinate (unsigned).
    CoordinateBounds,
    /// [`CoordinateBounds`] tag.
    CoordinateBoundsImplementation,
    /// Toppling-alternation compliance grid (bytes, one per cell).
    TopplingAlternationCompliance,
    /// [`GridImplementation`] tag of the compliance grid.
    TopplingAlternationComplianceImplementation,
    /// Lattice dimension (unsigned).
    GridDimension,
}

impl Key {
    /// Every key, in code order.
    pub const ALL: [Key; 14] = [
        Key::Model,
        Key::Step,
        Key::ChangedFromPreviousStep,
        Key::Grid,
        Key::GridType,
        Key::GridImplementation,
        Key::InitialConfiguration,
        Key::InitialConfigurationType,
        Key::InitialConfigurationImplementation,
        Key::CoordinateBounds,
        Key::CoordinateBoundsImplementation,
        Key::TopplingAlternationCompliance,
        Key::TopplingAlternationComplianceImplementation,
        Key::GridDimension,
    ];

    /// Stable one-byte code used on disk.
    pub fn code(self) -> u8 {
        match self {
            Key::Model => 0,
            Key::Step => 1,
            Key::ChangedFromPreviousStep => 2,
            Key::Grid => 3,
            Key::GridType => 4,
            Key::GridImplementation => 5,
            Key::InitialConfiguration => 6,
            Key::InitialConfigurationType => 7,
            Key::InitialConfigurationImplementation => 8,
            Key::CoordinateBounds => 9,
            Key::CoordinateBoundsImplementation => 10,
            Key::TopplingAlternationCompliance => 11,
            Key::TopplingAlternationComplianceImplementation => 12,
            Key::GridDimension => 13,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    fn name(self) -> &'static str {
        match self {
            Key::Model => "model",
            Key::Step => "step",
            Key::ChangedFromPreviousStep => "changed flag",
            Key::Grid => "grid",
            Key::GridType => "grid type",
            Key::GridImplementation => "grid implementation",
            Key::InitialConfiguration => "initial configuration",
            Key::InitialConfigurationType => "initial configuration type",
            Key::InitialConfigurationImplementation => "initial configuration implementation",
            Key::CoordinateBounds => "coordinate bounds",
            Key::CoordinateBoundsImplementation => "coordinate bounds implementation",
            Key::TopplingAlternationCompliance => "toppling alternation compliance",
            Key::TopplingAlternationComplianceImplementation => {
                "toppling alternation compliance implementation"
            }
            Key::GridDimension => "grid dimension",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Entry ───────────────────────────────────────────────────────

/// A typed checkpoint value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// Raw code of a [`CheckpointTag`].
    Tag(u8),
    /// A boolean.
    Flag(bool),
    /// An unsigned integer.
    Unsigned(u64),
    /// An opaque byte payload.
    Bytes(Vec<u8>),
}

impl Entry {
    /// One-byte type marker used on disk.
    pub fn marker(&self) -> u8 {
        match self {
            Entry::Tag(_) => 0,
            Entry::Flag(_) => 1,
            Entry::Unsigned(_) => 2,
            Entry::Bytes(_) => 3,
        }
    }
}

// ── Tags ────────────────────────────────────────────────────────

/// An enumeration stored in a checkpoint as a one-byte code.
pub trait CheckpointTag: Copy + PartialEq + fmt::Display {
    /// Stable one-byte code used on disk.
    fn code(self) -> u8;

    /// Inverse of [`code`](Self::code).
    fn from_code(code: u8) -> Option<Self>;
}

/// Which automaton produced the checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    /// The Aether toppling automaton.
    Aether,
}

/// Shape of the lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridType {
    /// An unbounded regular hypercubic lattice.
    InfiniteRegular,
}

/// How the initial configuration was built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitialConfiguration {
    /// One value at the origin, zero everywhere else.
    SingleSourceAtOrigin,
}

/// How the grid bounds are represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateBounds {
    /// A single largest coordinate shared by every axis.
    MaxCoordinateInteger,
}

/// Representation of a stored asymmetric grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridImplementation {
    /// Values held in memory, encoded inline in the checkpoint.
    AsymmetricArray(ValueKind),
    /// Fixed-width records in a step file next to the checkpoint.
    AsymmetricFile(ValueKind),
    /// One boolean per cell, encoded inline.
    AsymmetricBoolArray,
}

impl CheckpointTag for Model {
    fn code(self) -> u8 {
        1
    }

    fn from_code(code: u8) -> Option<Self> {
        (code == 1).then_some(Model::Aether)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("aether")
    }
}

impl CheckpointTag for GridType {
    fn code(self) -> u8 {
        1
    }

    fn from_code(code: u8) -> Option<Self> {
        (code == 1).then_some(GridType::InfiniteRegular)
    }
}

impl fmt::Display for GridType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("infinite regular")
    }
}

impl CheckpointTag for InitialConfiguration {
    fn code(self) -> u8 {
        1
    }

    fn from_code(code: u8) -> Option<Self> {
        (code == 1).then_some(InitialConfiguration::SingleSourceAtOrigin)
    }
}

impl fmt::Display for InitialConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("single source at origin")
    }
}

impl CheckpointTag for CoordinateBounds {
    fn code(self) -> u8 {
        1
    }

    fn from_code(code: u8) -> Option<Self> {
        (code == 1).then_some(CoordinateBounds::MaxCoordinateInteger)
    }
}

impl fmt::Display for CoordinateBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("max coordinate integer")
    }
}

const ARRAY_BASE: u8 = 0x10;
const FILE_BASE: u8 = 0x20;
const BOOL_ARRAY: u8 = 0x30;

impl CheckpointTag for GridImplementation {
    fn code(self) -> u8 {
        match self {
            GridImplementation::AsymmetricArray(kind) => ARRAY_BASE | kind.code(),
            GridImplementation::AsymmetricFile(kind) => FILE_BASE | kind.code(),
            GridImplementation::AsymmetricBoolArray => BOOL_ARRAY,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        if code == BOOL_ARRAY {
            return Some(GridImplementation::AsymmetricBoolArray);
        }
        let kind = ValueKind::from_code(code & 0x0f)?;
        match code & 0xf0 {
            ARRAY_BASE => Some(GridImplementation::AsymmetricArray(kind)),
            FILE_BASE => Some(GridImplementation::AsymmetricFile(kind)),
            _ => None,
        }
    }
}

impl fmt::Display for GridImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridImplementation::AsymmetricArray(kind) => write!(f, "asymmetric {kind} array"),
            GridImplementation::AsymmetricFile(kind) => write!(f, "asymmetric {kind} file"),
            GridImplementation::AsymmetricBoolArray => f.write_str("asymmetric bool array"),
        }
    }
}

impl CheckpointTag for ValueKind {
    fn code(self) -> u8 {
        ValueKind::code(self)
    }

    fn from_code(code: u8) -> Option<Self> {
        ValueKind::from_code(code)
    }
}
