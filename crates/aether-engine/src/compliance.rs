//! Toppling-alternation compliance.
//!
//! Positions are split by the parity of their coordinate sum. Each step
//! one parity has the turn: its cells are expected to topple and the
//! other parity's cells are expected to hold still. A cell complies when
//! `toppled == its_turn`. The turn flips every step, so it is carried as
//! an explicit [`Turn`] that [`ComplianceRecorder::finish`] hands back
//! already flipped.

use aether_core::Value;
use aether_space::PyramidLayout;

/// Which parity of positions is expected to topple in a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Turn {
    /// Positions with an even coordinate sum.
    Even,
    /// Positions with an odd coordinate sum.
    Odd,
}

impl Turn {
    /// Turn of the first step: a non-negative source starts on the
    /// even positions, a negative one on the odd positions.
    pub fn initial<V: Value>(initial_value: &V) -> Self {
        if *initial_value >= V::zero() {
            Turn::Even
        } else {
            Turn::Odd
        }
    }

    /// Turn of the step that will produce `step + 1`.
    pub fn at_step<V: Value>(initial_value: &V, step: u64) -> Self {
        let first = Self::initial(initial_value);
        if step % 2 == 0 {
            first
        } else {
            first.flipped()
        }
    }

    /// The other parity.
    pub fn flipped(self) -> Self {
        match self {
            Turn::Even => Turn::Odd,
            Turn::Odd => Turn::Even,
        }
    }

    /// Whether `position` is expected to topple this turn.
    pub fn includes(self, position: &[i32]) -> bool {
        let sum: i64 = position.iter().map(|&p| i64::from(p)).sum();
        (sum % 2 == 0) == (self == Turn::Even)
    }
}

/// Compliance of every stored cell for one completed step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComplianceGrid {
    turn: Turn,
    cells: Vec<bool>,
}

impl ComplianceGrid {
    /// The turn the recorded step was played on.
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Number of stored cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell is stored.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Compliance of a canonical cell.
    ///
    /// Cells beyond the stored section never toppled.
    pub fn get(&self, layout: &PyramidLayout, canonical: &[i32]) -> bool {
        let address = layout.address(canonical);
        match usize::try_from(address).ok().and_then(|a| self.cells.get(a)) {
            Some(&complied) => complied,
            None => !self.turn.includes(canonical),
        }
    }

    /// One byte per cell in address order.
    pub fn encode(&self) -> Vec<u8> {
        self.cells.iter().map(|&c| u8::from(c)).collect()
    }

    /// Inverse of [`encode`](Self::encode).
    ///
    /// Returns `None` unless `bytes` holds exactly `cell_count` zeros
    /// and ones.
    pub fn decode(bytes: &[u8], cell_count: u64, turn: Turn) -> Option<Self> {
        if bytes.len() as u64 != cell_count {
            return None;
        }
        let cells = bytes
            .iter()
            .map(|&b| match b {
                0 => Some(false),
                1 => Some(true),
                _ => None,
            })
            .collect::<Option<Vec<bool>>>()?;
        Some(Self { turn, cells })
    }
}

/// Collects compliance while a step runs.
#[derive(Debug)]
pub struct ComplianceRecorder {
    turn: Turn,
    cells: Vec<bool>,
}

impl ComplianceRecorder {
    /// Record a step played on `turn` covering up to `cell_count` cells.
    pub fn new(turn: Turn, cell_count: u64) -> Self {
        Self {
            turn,
            cells: vec![false; cell_count as usize],
        }
    }

    /// Record whether the cell at `address` toppled.
    pub fn record(&mut self, address: u64, canonical: &[i32], toppled: bool) {
        if let Some(slot) = self.cells.get_mut(address as usize) {
            *slot = toppled == self.turn.includes(canonical);
        }
    }

    /// Keep the first `cell_count` cells and return them with the turn
    /// for the next step.
    pub fn finish(mut self, cell_count: u64) -> (ComplianceGrid, Turn) {
        self.cells.truncate(cell_count as usize);
        let next = self.turn.flipped();
        (
            ComplianceGrid {
                turn: self.turn,
                cells: self.cells,
            },
            next,
        )
    }
}
