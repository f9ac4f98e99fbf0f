//! In-memory archive of sampled model output.

use crate::error::Result;
use crate::mesh::MaskedField;
use crate::solver::{NPZBState, Tracer};
use crate::types::{GridShape, SlotIndex};

/// One archived sample: the four fields at one model time.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Sample index within the archive
    pub index: usize,
    /// Model time (s)
    pub time: f64,
    /// Number of steps completed when the sample was taken
    pub step: usize,
    /// N, P, Z, B in [`Tracer::ALL`] order; land cells are missing
    pub fields: [MaskedField; 4],
}

impl Snapshot {
    /// Copy one slot of every field out of the state.
    pub fn capture(
        state: &NPZBState,
        slot: SlotIndex,
        index: usize,
        time: f64,
        step: usize,
    ) -> Result<Self> {
        let [n, p, z, b] = Tracer::ALL.map(|t| state.snapshot(t, slot));
        Ok(Self {
            index,
            time,
            step,
            fields: [n?, p?, z?, b?],
        })
    }

    /// Field of one variable.
    #[inline]
    pub fn field(&self, tracer: Tracer) -> &MaskedField {
        &self.fields[tracer.index()]
    }
}

/// Ordered collection of snapshots, indexed by sample number.
#[derive(Clone, Debug, Default)]
pub struct OutputArchive {
    samples: Vec<Snapshot>,
}

impl OutputArchive {
    /// Empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture `slot` of the state as the next sample.
    pub fn record(&mut self, state: &NPZBState, slot: SlotIndex, time: f64, step: usize) -> Result<&Snapshot> {
        let snapshot = Snapshot::capture(state, slot, self.samples.len(), time, step)?;
        self.samples.push(snapshot);
        Ok(&self.samples[self.samples.len() - 1])
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no sample has been recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample by index.
    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.samples.get(index)
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<&Snapshot> {
        self.samples.last()
    }

    /// Iterate over samples in time order.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.samples.iter()
    }

    /// Model time of every sample.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Grid shape of the stored fields, if any sample exists.
    pub fn shape(&self) -> Option<GridShape> {
        self.samples.first().map(|s| s.fields[0].shape())
    }

    /// Time series of one variable at (j, i); `None` entries are land.
    pub fn series(&self, tracer: Tracer, j: usize, i: usize) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.field(tracer).get(j, i)).collect()
    }
}

impl<'a> IntoIterator for &'a OutputArchive {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::SeaMask;
    use crate::solver::GradientSpec;

    #[test]
    fn test_record_and_series() {
        let mut state = NPZBState::new(SeaMask::closed_basin(GridShape::new(3, 4)));
        state.initialize(Tracer::P, &GradientSpec::uniform(0.5));

        let mut archive = OutputArchive::new();
        archive.record(&state, SlotIndex::ZERO, 0.0, 0).unwrap();
        state.field_mut(Tracer::P).slot_mut(SlotIndex::new(1))[5] = 0.75;
        let snap = archive.record(&state, SlotIndex::new(1), 3600.0, 6).unwrap();
        assert_eq!(snap.index, 1);
        assert_eq!(snap.step, 6);

        assert_eq!(archive.len(), 2);
        assert_eq!(archive.times(), vec![0.0, 3600.0]);
        assert_eq!(archive.series(Tracer::P, 1, 1), vec![Some(0.5), Some(0.75)]);
        assert_eq!(archive.series(Tracer::P, 0, 0), vec![None, None]);
        assert_eq!(archive.shape(), Some(GridShape::new(3, 4)));
    }
}
