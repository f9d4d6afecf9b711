//! File-backed slice grids.
//!
//! Each step lives in one file of fixed-width little-endian records laid
//! out in pyramid address order, so slice `x` is the contiguous byte
//! range starting at `cells_before(x) * WIDTH`. The staging file grows a
//! slice at a time as writes reach it; freshly extended regions read as
//! zero.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use aether_core::FixedWidth;
use aether_space::PyramidLayout;

use crate::error::ArenaError;
use crate::grid::{GridArena, GridHeader, StorageKind};

/// Sub-folder of a checkpoint directory that holds exported step files.
pub const GRID_FOLDER_NAME: &str = "grid";

static NEXT_WORKING_DIR: AtomicU64 = AtomicU64::new(0);

fn step_file_name(step: u64) -> String {
    format!("step={step}.data")
}

/// Where a [`FileArena`] keeps its working files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileArenaOptions {
    /// Parent folder; each arena creates its own sub-folder inside it.
    pub folder: PathBuf,
}

impl FileArenaOptions {
    /// Options rooted at `folder`.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

struct GridFile {
    file: File,
    path: PathBuf,
    /// Read-only file belonging to a checkpoint; never deleted.
    from_backup: bool,
}

struct Staging {
    step: u64,
    grid: GridFile,
    /// Slices `0..allocated` have backing bytes in the file.
    allocated: i32,
}

/// Grid storage backed by one file per step.
///
/// The arena owns a private working directory under
/// [`FileArenaOptions::folder`]; it is removed, together with every step
/// file it holds, on [`close`](GridArena::close) or drop.
pub struct FileArena<V: FixedWidth> {
    layout: PyramidLayout,
    max_coordinate: i32,
    step: u64,
    working_dir: PathBuf,
    current: GridFile,
    released: Vec<bool>,
    staging: Option<Staging>,
    closed: bool,
    _values: PhantomData<V>,
}

impl<V: FixedWidth> FileArena<V> {
    /// The private directory holding this arena's step files.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Path of the file backing the published grid.
    pub fn current_path(&self) -> &Path {
        &self.current.path
    }

    fn open_working_dir(options: &FileArenaOptions) -> Result<PathBuf, ArenaError> {
        let dir = options.folder.join(format!(
            "grid-{}-{}",
            std::process::id(),
            NEXT_WORKING_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&dir)?;
        log::info!("file grid working directory {}", dir.display());
        Ok(dir)
    }

    fn byte_offset(&self, canonical: &[i32]) -> u64 {
        self.layout.address(canonical) * V::WIDTH as u64
    }

    /// Byte offset of the first record of slice `x`.
    fn slice_start(&self, x: i32) -> u64 {
        self.layout.cells_before(x) * V::WIDTH as u64
    }

    fn remove_staging(&mut self) {
        if let Some(staging) = self.staging.take() {
            drop(staging.grid.file);
            if let Err(e) = fs::remove_file(&staging.grid.path) {
                log::warn!(
                    "could not remove staging grid {}: {e}",
                    staging.grid.path.display()
                );
            }
        }
    }

    fn cleanup(&mut self) -> Result<(), ArenaError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.remove_staging();
        fs::remove_dir_all(&self.working_dir)?;
        log::info!(
            "removed file grid working directory {}",
            self.working_dir.display()
        );
        Ok(())
    }
}

fn read_record<V: FixedWidth>(mut file: &File, offset: u64) -> Result<V, ArenaError> {
    let mut buf = [0u8; 16];
    let buf = &mut buf[..V::WIDTH];
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf)?;
    Ok(V::read_le(buf))
}

fn write_record<V: FixedWidth>(mut file: &File, offset: u64, value: &V) -> Result<(), ArenaError> {
    let mut buf = [0u8; 16];
    let buf = &mut buf[..V::WIDTH];
    value.write_le(buf);
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(buf)?;
    Ok(())
}

fn create_grid_file(path: PathBuf) -> Result<GridFile, ArenaError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)?;
    Ok(GridFile {
        file,
        path,
        from_backup: false,
    })
}

impl<V: FixedWidth> GridArena<V> for FileArena<V> {
    type Options = FileArenaOptions;

    const STORAGE: StorageKind = StorageKind::File;

    fn create(
        dimension: usize,
        initial: &V,
        options: FileArenaOptions,
    ) -> Result<Self, ArenaError> {
        let layout = PyramidLayout::new(dimension)?;
        let working_dir = Self::open_working_dir(&options)?;
        let current = create_grid_file(working_dir.join(step_file_name(0)))?;
        write_record(&current.file, 0, initial)?;
        current.file.sync_all()?;
        Ok(Self {
            layout,
            max_coordinate: 0,
            step: 0,
            working_dir,
            current,
            released: vec![false],
            staging: None,
            closed: false,
            _values: PhantomData,
        })
    }

    fn import(
        header: GridHeader,
        payload: &[u8],
        directory: &Path,
        options: FileArenaOptions,
    ) -> Result<Self, ArenaError> {
        let layout = PyramidLayout::new(header.dimension)?;
        let relative = std::str::from_utf8(payload).map_err(|e| ArenaError::MalformedPayload {
            detail: format!("grid file path is not UTF-8: {e}"),
        })?;
        let path = directory.join(relative);
        if !path.is_file() {
            return Err(ArenaError::MissingGridFile { path });
        }

        let file = File::open(&path)?;
        let expected = layout.total_cells(header.max_coordinate) * V::WIDTH as u64;
        let found = file.metadata()?.len();
        if found != expected {
            return Err(ArenaError::MalformedPayload {
                detail: format!(
                    "{} is {found} bytes, {expected} expected for max coordinate {}",
                    path.display(),
                    header.max_coordinate
                ),
            });
        }

        let working_dir = Self::open_working_dir(&options)?;
        Ok(Self {
            layout,
            max_coordinate: header.max_coordinate,
            step: header.step,
            working_dir,
            current: GridFile {
                file,
                path,
                from_backup: true,
            },
            released: vec![false; header.max_coordinate as usize + 1],
            staging: None,
            closed: false,
            _values: PhantomData,
        })
    }

    fn layout(&self) -> &PyramidLayout {
        &self.layout
    }

    fn max_coordinate(&self) -> i32 {
        self.max_coordinate
    }

    fn step(&self) -> u64 {
        self.step
    }

    fn read(&self, canonical: &[i32]) -> Result<V, ArenaError> {
        let x = canonical[0];
        if x > self.max_coordinate {
            return Ok(V::zero());
        }
        if self.released[x as usize] {
            return Err(ArenaError::SliceReleased { slice: x });
        }
        read_record(&self.current.file, self.byte_offset(canonical))
    }

    fn begin_step(&mut self, next_step: u64) -> Result<(), ArenaError> {
        if self.staging.is_some() {
            return Err(ArenaError::StepInProgress);
        }
        let grid = create_grid_file(self.working_dir.join(step_file_name(next_step)))?;
        self.staging = Some(Staging {
            step: next_step,
            grid,
            allocated: 0,
        });
        Ok(())
    }

    fn add(&mut self, canonical: &[i32], delta: &V) -> Result<(), ArenaError> {
        let x = canonical[0];
        let max_slice = self.max_coordinate + 1;
        if x > max_slice {
            return Err(ArenaError::OutOfBounds {
                position: canonical.iter().copied().collect(),
                max_slice,
            });
        }
        let offset = self.byte_offset(canonical);
        let end = self.slice_start(x + 1);
        let staging = self.staging.as_mut().ok_or(ArenaError::NoStepInProgress)?;
        if x >= staging.allocated {
            staging.grid.file.set_len(end)?;
            staging.allocated = x + 1;
        }
        let current: V = read_record(&staging.grid.file, offset)?;
        write_record(&staging.grid.file, offset, &current.add(delta))
    }

    fn release_slice(&mut self, x: i32) -> Result<(), ArenaError> {
        if let Some(flag) = self.released.get_mut(x as usize) {
            *flag = true;
        }
        Ok(())
    }

    fn publish(&mut self, grew: bool) -> Result<(), ArenaError> {
        let new_max = self.max_coordinate + i32::from(grew);
        let beyond = self.max_coordinate + 1;
        let beyond_range = (self.slice_start(beyond), self.slice_start(beyond + 1));
        let end = self.slice_start(new_max + 1);

        let staging = self.staging.as_mut().ok_or(ArenaError::NoStepInProgress)?;
        if !grew && staging.allocated > beyond {
            let (start, stop) = beyond_range;
            let mut bytes = vec![0u8; (stop - start) as usize];
            let mut file = &staging.grid.file;
            file.seek(SeekFrom::Start(start))?;
            file.read_exact(&mut bytes)?;
            if bytes.iter().any(|&b| b != 0) {
                return Err(ArenaError::MassBeyondBounds { slice: beyond });
            }
        }

        let finished = staging.grid.file.set_len(end).and_then(|()| staging.grid.file.sync_all());
        if let Err(e) = finished {
            self.remove_staging();
            return Err(e.into());
        }

        let Some(staging) = self.staging.take() else {
            return Err(ArenaError::NoStepInProgress);
        };
        let previous = std::mem::replace(&mut self.current, staging.grid);
        self.max_coordinate = new_max;
        self.step = staging.step;
        self.released = vec![false; new_max as usize + 1];

        if !previous.from_backup {
            drop(previous.file);
            if let Err(e) = fs::remove_file(&previous.path) {
                log::warn!(
                    "could not remove superseded grid {}: {e}",
                    previous.path.display()
                );
            }
        }
        log::trace!(
            "file grid published step {} (max coordinate {new_max})",
            self.step
        );
        Ok(())
    }

    fn abandon(&mut self) {
        self.remove_staging();
        self.released.fill(false);
    }

    fn export(&self, directory: &Path) -> Result<Vec<u8>, ArenaError> {
        let relative = Path::new(GRID_FOLDER_NAME).join(step_file_name(self.step));
        let target = directory.join(&relative);
        let same_file = match (target.canonicalize(), self.current.path.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_file {
            fs::create_dir_all(directory.join(GRID_FOLDER_NAME))?;
            fs::copy(&self.current.path, &target)?;
            File::open(&target)?.sync_all()?;
            log::info!("copied grid for step {} to {}", self.step, target.display());
        }
        relative
            .to_str()
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| ArenaError::MalformedPayload {
                detail: format!("grid file path {} is not UTF-8", relative.display()),
            })
    }

    fn close(mut self) -> Result<(), ArenaError> {
        self.cleanup()
    }
}

impl<V: FixedWidth> Drop for FileArena<V> {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            log::warn!(
                "could not remove file grid working directory {}: {e}",
                self.working_dir.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aether_test_utils::ScratchDir;

    fn arena(scratch: &ScratchDir, initial: i64) -> FileArena<i64> {
        FileArena::create(1, &initial, FileArenaOptions::new(scratch.path())).unwrap()
    }

    #[test]
    fn step_zero_holds_single_source() {
        let scratch = ScratchDir::new("file-arena");
        let arena = FileArena::<i32>::create(
            2,
            &-7,
            FileArenaOptions::new(scratch.path()),
        )
        .unwrap();
        assert_eq!(arena.read(&[0, 0]).unwrap(), -7);
        assert_eq!(arena.read(&[3, 1]).unwrap(), 0);
        assert!(arena.current_path().ends_with("step=0.data"));
    }

    #[test]
    fn publish_swaps_and_deletes_previous_step() {
        let scratch = ScratchDir::new("file-arena");
        let mut arena = arena(&scratch, 4);
        let step0 = arena.current_path().to_path_buf();

        arena.begin_step(1).unwrap();
        arena.add(&[0], &2).unwrap();
        arena.add(&[1], &1).unwrap();
        arena.add(&[1], &0).unwrap();
        arena.release_slice(0).unwrap();
        assert!(matches!(
            arena.read(&[0]),
            Err(ArenaError::SliceReleased { slice: 0 })
        ));
        arena.publish(true).unwrap();

        assert!(!step0.exists());
        assert_eq!(arena.read(&[0]).unwrap(), 2);
        assert_eq!(arena.read(&[1]).unwrap(), 1);
        assert_eq!(arena.max_coordinate(), 1);
        assert_eq!(arena.step(), 1);
        let len = fs::metadata(arena.current_path()).unwrap().len();
        assert_eq!(len, 2 * 8);
    }

    #[test]
    fn publish_without_growth_trims_the_extra_slice() {
        let scratch = ScratchDir::new("file-arena");
        let mut arena = arena(&scratch, 1);
        arena.begin_step(1).unwrap();
        arena.add(&[0], &1).unwrap();
        arena.add(&[1], &0).unwrap();
        arena.publish(false).unwrap();
        assert_eq!(arena.max_coordinate(), 0);
        assert_eq!(fs::metadata(arena.current_path()).unwrap().len(), 8);
    }

    #[test]
    fn mass_beyond_bounds_is_refused() {
        let scratch = ScratchDir::new("file-arena");
        let mut arena = arena(&scratch, 4);
        arena.begin_step(1).unwrap();
        arena.add(&[1], &1).unwrap();
        assert!(matches!(
            arena.publish(false),
            Err(ArenaError::MassBeyondBounds { slice: 1 })
        ));
        arena.abandon();
        assert_eq!(scratch.entry_count(arena.working_dir()), 1);
    }

    #[test]
    fn export_copies_into_checkpoint_folder() {
        let scratch = ScratchDir::new("file-arena");
        let backup = scratch.path().join("backup");
        let mut arena = arena(&scratch, 4);
        arena.begin_step(1).unwrap();
        arena.add(&[0], &2).unwrap();
        arena.add(&[1], &1).unwrap();
        arena.publish(true).unwrap();

        let payload = arena.export(&backup).unwrap();
        let relative = String::from_utf8(payload.clone()).unwrap();
        assert!(backup.join(&relative).is_file());

        let header = GridHeader {
            dimension: 1,
            max_coordinate: 1,
            step: 1,
        };
        let restored = FileArena::<i64>::import(
            header,
            &payload,
            &backup,
            FileArenaOptions::new(scratch.path()),
        )
        .unwrap();
        assert_eq!(restored.read(&[0]).unwrap(), 2);
        assert_eq!(restored.read(&[1]).unwrap(), 1);

        // Exporting back into the same checkpoint does not copy onto itself.
        assert_eq!(restored.export(&backup).unwrap(), payload);
        restored.close().unwrap();
        assert!(backup.join(&relative).is_file());
    }

    #[test]
    fn import_rejects_missing_and_truncated_files() {
        let scratch = ScratchDir::new("file-arena");
        let header = GridHeader {
            dimension: 2,
            max_coordinate: 3,
            step: 9,
        };
        let options = FileArenaOptions::new(scratch.path());
        assert!(matches!(
            FileArena::<i32>::import(header, b"grid/step=9.data", scratch.path(), options.clone()),
            Err(ArenaError::MissingGridFile { .. })
        ));

        fs::create_dir_all(scratch.path().join(GRID_FOLDER_NAME)).unwrap();
        fs::write(scratch.path().join("grid/step=9.data"), [0u8; 12]).unwrap();
        assert!(matches!(
            FileArena::<i32>::import(header, b"grid/step=9.data", scratch.path(), options),
            Err(ArenaError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn close_removes_working_directory() {
        let scratch = ScratchDir::new("file-arena");
        let arena = arena(&scratch, 3);
        let dir = arena.working_dir().to_path_buf();
        assert!(dir.is_dir());
        arena.close().unwrap();
        assert!(!dir.exists());

        let dropped = self::arena(&scratch, 3);
        let dir = dropped.working_dir().to_path_buf();
        drop(dropped);
        assert!(!dir.exists());
    }
}
