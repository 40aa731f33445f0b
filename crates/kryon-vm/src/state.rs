use indexmap::IndexMap;

use crate::value::RuntimeValue;

/// The shared, mutable state-cell table addressed by `GetState`/`SetState`.
///
/// Writes made during a function's execution don't take effect or notify
/// subscribers immediately — they're buffered in first-write order (last
/// value wins per cell within one function) and only committed, in that
/// order, once the function halts (§4.11).
pub struct StateTable {
    cells: Vec<RuntimeValue>,
    pending: IndexMap<u16, RuntimeValue>,
    subscribers: Vec<Box<dyn FnMut(u16, &RuntimeValue) + Send>>,
}

impl StateTable {
    pub fn new(initial: Vec<RuntimeValue>) -> Self {
        Self { cells: initial, pending: IndexMap::new(), subscribers: Vec::new() }
    }

    pub fn get(&self, state_id: u16) -> RuntimeValue {
        self.pending.get(&state_id).or_else(|| self.cells.get(state_id as usize)).cloned().unwrap_or(RuntimeValue::Null)
    }

    /// Buffers a write; does not notify subscribers until `commit_pending`.
    pub fn set(&mut self, state_id: u16, value: RuntimeValue) {
        self.pending.insert(state_id, value);
    }

    pub fn subscribe(&mut self, f: impl FnMut(u16, &RuntimeValue) + Send + 'static) {
        self.subscribers.push(Box::new(f));
    }

    /// Applies every buffered write to the backing cells, in first-write
    /// order, notifying subscribers as each lands. Called once a function
    /// halts normally — never on a trap, per §4.11/§4.12.
    pub fn commit_pending(&mut self) {
        let writes: Vec<(u16, RuntimeValue)> = self.pending.drain(..).collect();
        for (state_id, value) in writes {
            if (state_id as usize) < self.cells.len() {
                self.cells[state_id as usize] = value.clone();
            }
            for subscriber in &mut self.subscribers {
                subscriber(state_id, &value);
            }
        }
    }

    /// Drops buffered writes without applying them — used when a function
    /// traps instead of halting.
    pub fn discard_pending(&mut self) {
        self.pending.clear();
    }
}
