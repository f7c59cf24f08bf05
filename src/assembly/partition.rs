use crate::assembly::{AssembledSystem, GlobalSystem};
use log::debug;
use rayon::prelude::*;
use std::ops::Range;
use std::time::Instant;

/// Static ownership of cells by workers: worker `w` owns the contiguous range `ranges()[w]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPartition {
    ranges: Vec<Range<usize>>,
}

impl ElementPartition {
    /// Splits `0..num_cells` into `num_workers` contiguous ranges whose sizes differ by at most one.
    ///
    /// The first `num_cells % num_workers` ranges hold the extra cells. Ranges may be empty when
    /// there are more workers than cells.
    ///
    /// # Panics
    ///
    /// Panics if `num_workers` is zero.
    pub fn uniform(num_cells: usize, num_workers: usize) -> Self {
        assert!(num_workers > 0, "need at least one worker");
        let base = num_cells / num_workers;
        let remainder = num_cells % num_workers;
        let mut start = 0;
        let ranges = (0..num_workers)
            .map(|w| {
                let size = base + usize::from(w < remainder);
                let range = start..start + size;
                start += size;
                range
            })
            .collect();
        Self { ranges }
    }

    pub fn num_workers(&self) -> usize {
        self.ranges.len()
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// The first cell owned by worker 0, if any.
    pub fn first_cell(&self) -> Option<usize> {
        self.ranges.iter().find(|r| !r.is_empty()).map(|r| r.start)
    }

    /// Assembles every range into its own buffer in parallel, then merges the buffers in worker
    /// order and closes the result.
    pub fn assemble<F>(&self, num_dofs: usize, assemble_range: F) -> eyre::Result<AssembledSystem>
    where
        F: Fn(Range<usize>, &mut GlobalSystem) -> eyre::Result<()> + Sync,
    {
        let start = Instant::now();
        let partial_systems = self
            .ranges
            .par_iter()
            .map(|range| {
                let mut system = GlobalSystem::new(num_dofs);
                assemble_range(range.clone(), &mut system)?;
                Ok(system)
            })
            .collect::<eyre::Result<Vec<_>>>()?;

        let mut merged = GlobalSystem::new(num_dofs);
        for system in partial_systems {
            merged.merge(system);
        }
        let closed = merged.close();
        debug!(
            "Assembled system with {} unknowns and {} nonzeros on {} workers in {:.3} ms",
            num_dofs,
            closed.jacobian.nnz(),
            self.num_workers(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(closed)
    }
}
