//! Conjunction bookkeeping.
//!
//! A conjunction succeeds over `[start, p)` only when every conjunct reaches
//! its end at `p`. Conjuncts run as independent branches, so their arrivals
//! are collected here, outside any single branch, and the last arrival at a
//! position continues with the captures of all of them.

use std::ops::Range;

use super::thread::BranchState;

#[derive(Debug)]
struct ConjRecord {
    /// Per conjunct: arrival positions with the branch state at arrival.
    arrivals: Vec<Vec<(usize, BranchState)>>,
}

#[derive(Debug, Default)]
pub(crate) struct ConjTable {
    records: Vec<ConjRecord>,
}

impl ConjTable {
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn open(&mut self, conjuncts: usize) -> u32 {
        let id = self.records.len() as u32;
        self.records.push(ConjRecord {
            arrivals: vec![Vec::new(); conjuncts],
        });
        id
    }

    pub fn arrive(&mut self, record: u32, child: usize, pos: usize, state: &BranchState) {
        self.records[record as usize].arrivals[child].push((pos, state.clone()));
    }

    /// Merged state if every other conjunct has already arrived at `pos`.
    ///
    /// Each other conjunct contributes its earliest arrival at `pos`; only
    /// the groups in its own id range are taken from it.
    pub fn join(
        &self,
        record: u32,
        child: usize,
        pos: usize,
        state: &BranchState,
        groups: &[Range<u32>],
    ) -> Option<BranchState> {
        let record = &self.records[record as usize];
        let mut merged = state.clone();
        for (other, arrivals) in record.arrivals.iter().enumerate() {
            if other == child {
                continue;
            }
            let (_, theirs) = arrivals.iter().find(|(p, _)| *p == pos)?;
            merged.adopt(theirs, groups[other].clone());
        }
        Some(merged)
    }
}
