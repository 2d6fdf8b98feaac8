use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One line of a trace file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TraceBlock {
    pub id: u64,       // line ordinal, 0-based
    pub gap: f64,      // seconds since the previous block
    pub start: f64,    // absolute arrival in seconds (inclusive running sum of gaps)
    pub deadline: u64, // ms, relative to arrival
    pub size: u64,     // bytes
    pub priority: u32,
}

/// Parsed trace. Block ids are dense and equal to their index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub blocks: Vec<TraceBlock>,
}

impl Trace {
    pub fn new(blocks: Vec<TraceBlock>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&TraceBlock> {
        usize::try_from(id).ok().and_then(|idx| self.blocks.get(idx))
    }

    /// Priority classes present in the trace, ascending.
    pub fn classes(&self) -> Vec<u32> {
        self.blocks
            .iter()
            .map(|b| b.priority)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Arrival time of the last block.
    pub fn duration(&self) -> f64 {
        self.blocks.last().map_or(0.0, |b| b.start)
    }
}
