//! Writing and restoring engine checkpoints.
//!
//! A backup is a directory holding `checkpoint.bin` and, for file-backed
//! grids, the step file under `grid/`. Restoring checks every tag in the
//! bundle against what the target engine type expects before any grid
//! data is touched.

use std::fs;
use std::path::{Path, PathBuf};

use aether_arena::{GridArena, GridHeader, StorageKind};
use aether_checkpoint::{
    read_file, write_file, Checkpoint, CheckpointError, CoordinateBounds, Entry, GridImplementation,
    GridType, InitialConfiguration, Key, Model,
};
use aether_core::Value;
use aether_space::HypercubicSymmetry;

use crate::compliance::{ComplianceGrid, Turn};
use crate::config::RestoreConfig;
use crate::engine::{AetherEngine, EngineError};
use crate::metrics::StepMetrics;

/// File name of the bundle inside a backup directory.
pub const CHECKPOINT_FILE_NAME: &str = "checkpoint.bin";

fn grid_implementation<V: Value, A: GridArena<V>>() -> GridImplementation {
    match A::STORAGE {
        StorageKind::Memory => GridImplementation::AsymmetricArray(V::KIND),
        StorageKind::File => GridImplementation::AsymmetricFile(V::KIND),
    }
}

fn malformed(detail: impl Into<String>) -> CheckpointError {
    CheckpointError::MalformedFrame {
        detail: detail.into(),
    }
}

impl<V: Value, A: GridArena<V>> AetherEngine<V, A> {
    /// Write a backup to the directory `path/name`, returning it.
    ///
    /// The directory is created if missing; an existing bundle in it is
    /// replaced.
    pub fn back_up(&self, path: &Path, name: &str) -> Result<PathBuf, EngineError> {
        let directory = path.join(name);
        fs::create_dir_all(&directory).map_err(CheckpointError::from)?;

        let mut checkpoint = Checkpoint::new();
        checkpoint.put_tag(Key::Model, Model::Aether);
        checkpoint.put(Key::Step, Entry::Unsigned(self.step()));
        if self.step() > 0 {
            checkpoint.put(Key::ChangedFromPreviousStep, Entry::Flag(self.changed));
        }

        let mut initial = Vec::new();
        self.initial_value.encode(&mut initial);
        checkpoint.put(Key::InitialConfiguration, Entry::Bytes(initial));
        checkpoint.put_tag(
            Key::InitialConfigurationType,
            InitialConfiguration::SingleSourceAtOrigin,
        );
        checkpoint.put_tag(Key::InitialConfigurationImplementation, V::KIND);

        checkpoint.put(Key::Grid, Entry::Bytes(self.arena.export(&directory)?));
        checkpoint.put_tag(Key::GridType, GridType::InfiniteRegular);
        checkpoint.put_tag(Key::GridImplementation, grid_implementation::<V, A>());
        checkpoint.put(Key::GridDimension, Entry::Unsigned(self.dimension() as u64));

        checkpoint.put(
            Key::CoordinateBounds,
            Entry::Unsigned(self.max_coordinate() as u64),
        );
        checkpoint.put_tag(
            Key::CoordinateBoundsImplementation,
            CoordinateBounds::MaxCoordinateInteger,
        );

        if let Some(grid) = &self.compliance {
            checkpoint.put(Key::TopplingAlternationCompliance, Entry::Bytes(grid.encode()));
            checkpoint.put_tag(
                Key::TopplingAlternationComplianceImplementation,
                GridImplementation::AsymmetricBoolArray,
            );
        }

        write_file(&directory.join(CHECKPOINT_FILE_NAME), &checkpoint)?;
        log::info!(
            "backed up step {} to {}",
            self.step(),
            directory.display()
        );
        Ok(directory)
    }

    /// Restore an engine from a backup directory written by
    /// [`back_up`](Self::back_up).
    ///
    /// Fails with [`CheckpointError::Incompatible`] when the backup was
    /// written by a different model, value type, grid backend or
    /// dimension. A compliance-tracking engine restored from a backup
    /// without a compliance grid plays one extra step to rebuild it.
    pub fn restore(
        path: &Path,
        config: RestoreConfig,
        options: A::Options,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let checkpoint = read_file(&path.join(CHECKPOINT_FILE_NAME))?;

        checkpoint.expect_tag(Key::Model, Model::Aether)?;
        checkpoint.expect_tag(
            Key::InitialConfigurationType,
            InitialConfiguration::SingleSourceAtOrigin,
        )?;
        checkpoint.expect_tag(Key::InitialConfigurationImplementation, V::KIND)?;
        checkpoint.expect_tag(Key::GridType, GridType::InfiniteRegular)?;
        checkpoint.expect_tag(Key::GridImplementation, grid_implementation::<V, A>())?;
        checkpoint.expect_tag(
            Key::CoordinateBoundsImplementation,
            CoordinateBounds::MaxCoordinateInteger,
        )?;
        checkpoint.expect_unsigned(Key::GridDimension, config.dimension as u64)?;

        let (initial_value, used) =
            V::decode(checkpoint.bytes(Key::InitialConfiguration)?).map_err(|e| {
                malformed(format!("initial value: {e}"))
            })?;
        if used != checkpoint.bytes(Key::InitialConfiguration)?.len() {
            return Err(malformed("trailing bytes after the initial value").into());
        }

        let step = checkpoint.unsigned(Key::Step)?;
        let max_coordinate = i32::try_from(checkpoint.unsigned(Key::CoordinateBounds)?)
            .map_err(|_| malformed("coordinate bounds exceed i32"))?;
        let changed = checkpoint.flag(Key::ChangedFromPreviousStep)?.unwrap_or(false);

        let header = GridHeader {
            dimension: config.dimension,
            max_coordinate,
            step,
        };
        let arena = A::import(header, checkpoint.bytes(Key::Grid)?, path, options)?;
        let layout = *arena.layout();

        let mut rebuild_compliance = false;
        let compliance = if !config.track_compliance || step == 0 {
            None
        } else if checkpoint.contains(Key::TopplingAlternationCompliance) {
            checkpoint.expect_tag(
                Key::TopplingAlternationComplianceImplementation,
                GridImplementation::AsymmetricBoolArray,
            )?;
            let turn = Turn::at_step(&initial_value, step - 1);
            let grid = ComplianceGrid::decode(
                checkpoint.bytes(Key::TopplingAlternationCompliance)?,
                layout.total_cells(max_coordinate),
                turn,
            )
            .ok_or_else(|| malformed("compliance grid does not match the grid bounds"))?;
            Some(grid)
        } else {
            rebuild_compliance = true;
            None
        };

        let mut engine = Self {
            symmetry: HypercubicSymmetry::new(config.dimension)?,
            arena,
            turn: Turn::at_step(&initial_value, step),
            initial_value,
            changed,
            track_compliance: config.track_compliance,
            compliance,
            last_metrics: StepMetrics::default(),
        };
        log::info!("restored step {step} from {}", path.display());

        if rebuild_compliance {
            log::info!("backup has no compliance grid; replaying one step to rebuild it");
            engine.next_step()?;
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use aether_arena::MemoryArena;
    use aether_test_utils::ScratchDir;

    #[test]
    fn restores_every_query() {
        let scratch = ScratchDir::new("backup");
        let mut engine = AetherEngine::<i64>::new(EngineConfig::new(2, 300), ()).unwrap();
        for _ in 0..6 {
            engine.next_step().unwrap();
        }
        let dir = engine.back_up(scratch.path(), "six").unwrap();
        assert!(dir.join(CHECKPOINT_FILE_NAME).is_file());

        let restored =
            AetherEngine::<i64, MemoryArena<i64>>::restore(&dir, RestoreConfig::new(2), ())
                .unwrap();
        assert_eq!(restored.step(), 6);
        assert_eq!(restored.max_coordinate(), engine.max_coordinate());
        assert_eq!(restored.changed(), engine.changed());
        assert_eq!(restored.initial_value(), &300);
        for x in -8..=8 {
            for y in -8..=8 {
                assert_eq!(restored.get(&[x, y]).unwrap(), engine.get(&[x, y]).unwrap());
            }
        }
    }

    #[test]
    fn rejects_a_different_value_type() {
        let scratch = ScratchDir::new("backup");
        let engine = AetherEngine::<i64>::new(EngineConfig::new(1, 5), ()).unwrap();
        let dir = engine.back_up(scratch.path(), "b").unwrap();
        let err = AetherEngine::<i32>::restore(&dir, RestoreConfig::new(1), ())
            .err()
            .unwrap();
        match err {
            EngineError::Checkpoint(CheckpointError::Incompatible { key, .. }) => {
                assert_eq!(key, Key::InitialConfigurationImplementation);
            }
            other => panic!("expected incompatible checkpoint, got {other}"),
        }
    }

    #[test]
    fn rejects_a_different_dimension() {
        let scratch = ScratchDir::new("backup");
        let engine = AetherEngine::<i64>::new(EngineConfig::new(2, 5), ()).unwrap();
        let dir = engine.back_up(scratch.path(), "b").unwrap();
        assert!(matches!(
            AetherEngine::<i64>::restore(&dir, RestoreConfig::new(3), ()),
            Err(EngineError::Checkpoint(CheckpointError::Incompatible {
                key: Key::GridDimension,
                ..
            }))
        ));
    }

    #[test]
    fn missing_compliance_is_rebuilt_by_one_step() {
        let scratch = ScratchDir::new("backup");
        let mut plain = AetherEngine::<i64>::new(EngineConfig::new(2, 64), ()).unwrap();
        plain.next_step().unwrap();
        plain.next_step().unwrap();
        let dir = plain.back_up(scratch.path(), "plain").unwrap();

        let tracked = AetherEngine::<i64>::restore(
            &dir,
            RestoreConfig::new(2).with_compliance(true),
            (),
        )
        .unwrap();
        assert_eq!(tracked.step(), 3);
        assert!(tracked.compliance(&[0, 0]).unwrap().is_some());

        plain.next_step().unwrap();
        assert_eq!(tracked.get(&[1, 0]).unwrap(), plain.get(&[1, 0]).unwrap());
    }

    #[test]
    fn compliance_grid_round_trips() {
        let scratch = ScratchDir::new("backup");
        let config = EngineConfig::new(2, 50i64).with_compliance(true);
        let mut engine = AetherEngine::<i64>::new(config, ()).unwrap();
        for _ in 0..4 {
            engine.next_step().unwrap();
        }
        let dir = engine.back_up(scratch.path(), "tracked").unwrap();
        let restored = AetherEngine::<i64>::restore(
            &dir,
            RestoreConfig::new(2).with_compliance(true),
            (),
        )
        .unwrap();
        assert_eq!(restored.step(), 4);
        for x in -6..=6 {
            for y in -6..=6 {
                assert_eq!(
                    restored.compliance(&[x, y]).unwrap(),
                    engine.compliance(&[x, y]).unwrap()
                );
            }
        }
    }
}
