//! The Aether step loop.
//!
//! [`AetherEngine`] owns the symmetry, the grid arena and the derived
//! per-step state (changed flag, compliance, metrics). It only ever
//! stores the canonical section of the lattice; every query is folded
//! into it first.

use std::error::Error;
use std::fmt;
use std::time::Instant;

use aether_arena::{ArenaError, GridArena, MemoryArena};
use aether_checkpoint::CheckpointError;
use aether_core::Value;
use aether_space::{HypercubicSymmetry, SpaceError};
use num_rational::BigRational;
use num_traits::Zero;
use smallvec::SmallVec;

use crate::compliance::{ComplianceGrid, ComplianceRecorder, Turn};
use crate::config::{ConfigError, EngineConfig};
use crate::metrics::StepMetrics;
use crate::topple::{topple, RelevantNeighbour};

// ── EngineError ────────────────────────────────────────────────────

/// Errors returned by [`AetherEngine`] operations.
#[derive(Debug)]
pub enum EngineError {
    /// The configuration was rejected.
    Config(ConfigError),
    /// The grid backend failed; the published grid is unchanged.
    Arena(ArenaError),
    /// A checkpoint could not be written, read or accepted.
    Checkpoint(CheckpointError),
    /// A queried position does not fit the lattice.
    Space(SpaceError),
    /// Compliance was queried on an engine that does not track it.
    ComplianceNotTracked,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration: {e}"),
            Self::Arena(e) => write!(f, "grid: {e}"),
            Self::Checkpoint(e) => write!(f, "checkpoint: {e}"),
            Self::Space(e) => write!(f, "position: {e}"),
            Self::ComplianceNotTracked => {
                write!(f, "toppling alternation compliance is not tracked")
            }
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Arena(e) => Some(e),
            Self::Checkpoint(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::ComplianceNotTracked => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ArenaError> for EngineError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<CheckpointError> for EngineError {
    fn from(e: CheckpointError) -> Self {
        Self::Checkpoint(e)
    }
}

impl From<SpaceError> for EngineError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

// ── AetherEngine ───────────────────────────────────────────────────

/// Work done by one pass over the grid.
struct StepTally {
    cells_processed: u64,
    cells_toppled: u64,
    slices_released: u32,
    grew: bool,
}

/// The Aether automaton on an unbounded `D`-dimensional lattice.
///
/// Generic over the exact value type `V` and the grid backend `A`.
///
/// # Examples
///
/// ```
/// use aether_engine::{AetherEngine, EngineConfig};
///
/// let mut engine = AetherEngine::<i64>::new(EngineConfig::new(1, 4), ()).unwrap();
/// assert!(engine.next_step().unwrap());
/// assert_eq!(engine.get(&[-1]).unwrap(), 1);
/// assert_eq!(engine.get(&[0]).unwrap(), 2);
/// assert_eq!(engine.get(&[1]).unwrap(), 1);
/// ```
pub struct AetherEngine<V: Value, A: GridArena<V> = MemoryArena<V>> {
    pub(crate) symmetry: HypercubicSymmetry,
    pub(crate) arena: A,
    pub(crate) initial_value: V,
    pub(crate) changed: bool,
    pub(crate) turn: Turn,
    pub(crate) track_compliance: bool,
    pub(crate) compliance: Option<ComplianceGrid>,
    pub(crate) last_metrics: StepMetrics,
}

// Compile-time assertion: the engine can move between threads.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<AetherEngine<i64>>();
        assert_send::<AetherEngine<i32, aether_arena::FileArena<i32>>>();
        assert_send::<AetherEngine<BigRational>>();
    }
};

impl<V: Value, A: GridArena<V>> AetherEngine<V, A> {
    /// Build the step-0 engine: the initial value at the origin.
    pub fn new(config: EngineConfig<V>, options: A::Options) -> Result<Self, EngineError> {
        config.validate()?;
        let symmetry = HypercubicSymmetry::new(config.dimension)?;
        let arena = A::create(config.dimension, &config.initial_value, options)?;
        log::info!(
            "aether engine: {}D, initial value {} ({}), {:?} grid",
            config.dimension,
            config.initial_value,
            V::KIND,
            A::STORAGE
        );
        Ok(Self {
            symmetry,
            arena,
            turn: Turn::initial(&config.initial_value),
            initial_value: config.initial_value,
            changed: false,
            track_compliance: config.track_compliance,
            compliance: None,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Advance one step. Returns whether any cell toppled.
    ///
    /// On error the staging grid is discarded and the engine still
    /// holds the previous step.
    pub fn next_step(&mut self) -> Result<bool, EngineError> {
        let started = Instant::now();
        let step = self.arena.step() + 1;
        let max = self.arena.max_coordinate();
        let layout = *self.arena.layout();

        let mut recorder = self
            .track_compliance
            .then(|| ComplianceRecorder::new(self.turn, layout.total_cells(max + 1)));

        self.arena.begin_step(step)?;
        let tally = match self.run_step(max, recorder.as_mut()) {
            Ok(tally) => tally,
            Err(e) => {
                self.arena.abandon();
                return Err(e);
            }
        };
        if let Err(e) = self.arena.publish(tally.grew) {
            self.arena.abandon();
            return Err(e.into());
        }

        if let Some(recorder) = recorder {
            let (grid, next) = recorder.finish(layout.total_cells(self.arena.max_coordinate()));
            self.compliance = Some(grid);
            self.turn = next;
        } else {
            self.turn = self.turn.flipped();
        }
        debug_assert_eq!(self.turn, Turn::at_step(&self.initial_value, step));

        self.changed = tally.cells_toppled > 0;
        self.last_metrics = StepMetrics {
            total_us: started.elapsed().as_micros() as u64,
            cells_processed: tally.cells_processed,
            cells_toppled: tally.cells_toppled,
            slices_released: tally.slices_released,
            grew: tally.grew,
        };
        log::debug!(
            "step {step}: max coordinate {}, {} of {} cells toppled in {}us",
            self.arena.max_coordinate(),
            tally.cells_toppled,
            tally.cells_processed,
            self.last_metrics.total_us
        );
        Ok(self.changed)
    }

    /// Visit slices `0..=max + 1` of the published grid, staging the
    /// next one.
    fn run_step(
        &mut self,
        max: i32,
        mut recorder: Option<&mut ComplianceRecorder>,
    ) -> Result<StepTally, EngineError> {
        let layout = *self.arena.layout();
        let mut tally = StepTally {
            cells_processed: 0,
            cells_toppled: 0,
            slices_released: 0,
            grew: false,
        };

        for x in 0..=max + 1 {
            for cell in layout.slice_cells(x) {
                let value = self.arena.read(&cell)?;
                let folded = self.symmetry.folded_neighbours(&cell);

                let mut targets: SmallVec<[usize; 8]> = SmallVec::new();
                let mut relevant: SmallVec<[RelevantNeighbour<V>; 8]> = SmallVec::new();
                for (i, neighbour) in folded.iter().enumerate() {
                    let neighbour_value = self.arena.read(&neighbour.position)?;
                    if neighbour_value < value {
                        targets.push(i);
                        relevant.push(RelevantNeighbour {
                            value: neighbour_value,
                            symmetry_count: neighbour.symmetry_count,
                            share_multiplier: neighbour.share_multiplier,
                        });
                    }
                }

                let outcome = topple(&value, &relevant);
                if !outcome.kept.is_zero() {
                    self.arena.add(&cell, &outcome.kept)?;
                }
                for (&i, delta) in targets.iter().zip(&outcome.deltas) {
                    if !delta.is_zero() {
                        self.arena.add(&folded[i].position, delta)?;
                    }
                }

                tally.cells_processed += 1;
                if outcome.toppled {
                    tally.cells_toppled += 1;
                    if x >= max {
                        tally.grew = true;
                    }
                }
                if let Some(recorder) = recorder.as_deref_mut() {
                    recorder.record(layout.address(&cell), &cell, outcome.toppled);
                }
            }
            if x >= 1 {
                self.arena.release_slice(x - 1)?;
                tally.slices_released += 1;
            }
        }
        Ok(tally)
    }

    /// Value at any lattice position.
    pub fn get(&self, position: &[i32]) -> Result<V, EngineError> {
        self.symmetry.check_position(position)?;
        let canonical = self.symmetry.canonical(position);
        Ok(self.arena.read(&canonical)?)
    }

    /// Value at a position that is already canonical
    /// (`p[0] >= p[1] >= ... >= p[D-1] >= 0`).
    pub fn get_asymmetric(&self, canonical: &[i32]) -> Result<V, EngineError> {
        self.symmetry.check_position(canonical)?;
        if !self.symmetry.is_canonical(canonical) {
            return Err(SpaceError::NotCanonical {
                position: canonical.iter().copied().collect(),
            }
            .into());
        }
        Ok(self.arena.read(canonical)?)
    }

    /// Compliance of `position` in the last step, or `None` at step 0
    /// before any step has been played.
    pub fn compliance(&self, position: &[i32]) -> Result<Option<bool>, EngineError> {
        if !self.track_compliance {
            return Err(EngineError::ComplianceNotTracked);
        }
        self.symmetry.check_position(position)?;
        let canonical = self.symmetry.canonical(position);
        Ok(self
            .compliance
            .as_ref()
            .map(|grid| grid.get(self.arena.layout(), &canonical)))
    }

    /// Sum of every lattice value, each canonical cell weighted by its
    /// orbit size. Equals the initial value at every step.
    pub fn total_mass(&self) -> Result<BigRational, EngineError> {
        let layout = *self.arena.layout();
        let mut total = <BigRational as Zero>::zero();
        for x in 0..=self.arena.max_coordinate() {
            for cell in layout.slice_cells(x) {
                let value = self.arena.read(&cell)?;
                if value.is_zero() {
                    continue;
                }
                let orbit = BigRational::from_integer(self.symmetry.orbit_size(&cell).into());
                total += value.to_rational() * orbit;
            }
        }
        Ok(total)
    }

    /// Largest coordinate of the stored section; every position with a
    /// larger coordinate is zero.
    pub fn max_coordinate(&self) -> i32 {
        self.arena.max_coordinate()
    }

    /// Steps played since the initial configuration.
    pub fn step(&self) -> u64 {
        self.arena.step()
    }

    /// Whether the last step changed anything. `false` at step 0.
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Value the origin started with.
    pub fn initial_value(&self) -> &V {
        &self.initial_value
    }

    /// Number of lattice axes.
    pub fn dimension(&self) -> usize {
        self.symmetry.dimension()
    }

    /// Whether compliance is tracked.
    pub fn tracks_compliance(&self) -> bool {
        self.track_compliance
    }

    /// Metrics from the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// The grid backend.
    pub fn arena(&self) -> &A {
        &self.arena
    }

    /// Release every resource held by the grid backend.
    pub fn close(self) -> Result<(), EngineError> {
        log::info!("closing aether engine at step {}", self.arena.step());
        Ok(self.arena.close()?)
    }
}
