//! In-memory slice grids.
//!
//! The published grid is a `Vec` of slices, each `Option<Vec<V>>` so a
//! consumed slice can be dropped in the middle of a step. Staging slices
//! are allocated on first write, so a step never holds more than the
//! live window of the published grid plus the staging slices written so
//! far.

use std::path::Path;

use aether_core::{Value, ValueError};
use aether_space::PyramidLayout;

use crate::error::ArenaError;
use crate::grid::{GridArena, GridHeader, StorageKind};

type Slices<V> = Vec<Option<Vec<V>>>;

struct Staging<V> {
    step: u64,
    slices: Slices<V>,
}

/// Grid storage backed by in-memory slices.
///
/// # Examples
///
/// ```
/// use aether_arena::{GridArena, MemoryArena};
///
/// let mut arena = MemoryArena::<i64>::create(1, &4, ()).unwrap();
/// arena.begin_step(1).unwrap();
/// arena.add(&[0], &2).unwrap();
/// arena.add(&[1], &1).unwrap();
/// arena.release_slice(0).unwrap();
/// arena.publish(true).unwrap();
///
/// assert_eq!(arena.max_coordinate(), 1);
/// assert_eq!(arena.read(&[1]).unwrap(), 1);
/// assert_eq!(arena.read(&[7]).unwrap(), 0);
/// ```
pub struct MemoryArena<V: Value> {
    layout: PyramidLayout,
    max_coordinate: i32,
    step: u64,
    published: Slices<V>,
    staging: Option<Staging<V>>,
}

impl<V: Value> MemoryArena<V> {
    /// Published slices still held in memory.
    pub fn live_slices(&self) -> usize {
        self.published.iter().filter(|s| s.is_some()).count()
    }

    fn zero_slice(&self, x: i32) -> Vec<V> {
        vec![V::zero(); self.layout.slice_len(x) as usize]
    }
}

impl<V: Value> GridArena<V> for MemoryArena<V> {
    type Options = ();

    const STORAGE: StorageKind = StorageKind::Memory;

    fn create(dimension: usize, initial: &V, _options: ()) -> Result<Self, ArenaError> {
        let layout = PyramidLayout::new(dimension)?;
        Ok(Self {
            layout,
            max_coordinate: 0,
            step: 0,
            published: vec![Some(vec![initial.clone()])],
            staging: None,
        })
    }

    fn import(
        header: GridHeader,
        payload: &[u8],
        _directory: &Path,
        _options: (),
    ) -> Result<Self, ArenaError> {
        let layout = PyramidLayout::new(header.dimension)?;
        let mut cursor = payload;
        let count = read_count(&mut cursor)?;
        let expected = layout.total_cells(header.max_coordinate);
        if count != expected {
            return Err(ArenaError::MalformedPayload {
                detail: format!(
                    "{count} cells stored, {expected} expected for max coordinate {}",
                    header.max_coordinate
                ),
            });
        }

        let mut published = Vec::with_capacity(header.max_coordinate as usize + 1);
        for x in 0..=header.max_coordinate {
            let len = layout.slice_len(x) as usize;
            let mut slice = Vec::with_capacity(len);
            for _ in 0..len {
                let (value, used) = V::decode(cursor)?;
                cursor = &cursor[used..];
                slice.push(value);
            }
            published.push(Some(slice));
        }
        if !cursor.is_empty() {
            return Err(ArenaError::MalformedPayload {
                detail: format!("{} trailing bytes", cursor.len()),
            });
        }

        Ok(Self {
            layout,
            max_coordinate: header.max_coordinate,
            step: header.step,
            published,
            staging: None,
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
        match &self.published[x as usize] {
            Some(slice) => Ok(slice[self.layout.offset_in_slice(canonical) as usize].clone()),
            None => Err(ArenaError::SliceReleased { slice: x }),
        }
    }

    fn begin_step(&mut self, next_step: u64) -> Result<(), ArenaError> {
        if self.staging.is_some() {
            return Err(ArenaError::StepInProgress);
        }
        let depth = self.max_coordinate as usize + 2;
        self.staging = Some(Staging {
            step: next_step,
            slices: (0..depth).map(|_| None).collect(),
        });
        Ok(())
    }

    fn add(&mut self, canonical: &[i32], delta: &V) -> Result<(), ArenaError> {
        let x = canonical[0];
        let offset = self.layout.offset_in_slice(canonical) as usize;
        let len = self.layout.slice_len(x) as usize;
        let max_slice = self.max_coordinate + 1;
        let staging = self.staging.as_mut().ok_or(ArenaError::NoStepInProgress)?;
        let slot = staging
            .slices
            .get_mut(x as usize)
            .ok_or_else(|| ArenaError::OutOfBounds {
                position: canonical.iter().copied().collect(),
                max_slice,
            })?;
        let slice = slot.get_or_insert_with(|| vec![V::zero(); len]);
        slice[offset] = slice[offset].add(delta);
        Ok(())
    }

    fn release_slice(&mut self, x: i32) -> Result<(), ArenaError> {
        if let Some(slot) = self.published.get_mut(x as usize) {
            *slot = None;
        }
        Ok(())
    }

    fn publish(&mut self, grew: bool) -> Result<(), ArenaError> {
        let staging = self.staging.take().ok_or(ArenaError::NoStepInProgress)?;
        let mut slices = staging.slices;
        let new_max = self.max_coordinate + i32::from(grew);

        if !grew {
            let beyond = self.max_coordinate + 1;
            if let Some(Some(slice)) = slices.get(beyond as usize) {
                if slice.iter().any(|v| !v.is_zero()) {
                    // Keep the staging grid so the caller can still abandon it.
                    self.staging = Some(Staging {
                        step: staging.step,
                        slices,
                    });
                    return Err(ArenaError::MassBeyondBounds { slice: beyond });
                }
            }
        }

        slices.truncate(new_max as usize + 1);
        for (x, slot) in slices.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(self.zero_slice(x as i32));
            }
        }

        self.published = slices;
        self.max_coordinate = new_max;
        self.step = staging.step;
        log::trace!(
            "memory grid published step {} (max coordinate {new_max})",
            self.step
        );
        Ok(())
    }

    fn abandon(&mut self) {
        self.staging = None;
    }

    fn export(&self, _directory: &Path) -> Result<Vec<u8>, ArenaError> {
        let count = self.layout.total_cells(self.max_coordinate);
        let mut payload = Vec::with_capacity(8 + count as usize * 8);
        payload.extend_from_slice(&count.to_le_bytes());
        for (x, slot) in self.published.iter().enumerate() {
            let slice = slot.as_ref().ok_or(ArenaError::SliceReleased { slice: x as i32 })?;
            for value in slice {
                value.encode(&mut payload);
            }
        }
        Ok(payload)
    }

    fn close(self) -> Result<(), ArenaError> {
        Ok(())
    }
}

fn read_count(cursor: &mut &[u8]) -> Result<u64, ArenaError> {
    let Some((head, rest)) = cursor.split_first_chunk::<8>() else {
        return Err(ArenaError::Value(ValueError::Truncated {
            needed: 8,
            available: cursor.len(),
        }));
    };
    *cursor = rest;
    Ok(u64::from_le_bytes(*head))
}
