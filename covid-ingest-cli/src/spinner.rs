//! Spinner pool for concurrent pipeline progress.
//!
//! Manages a fixed number of progress bar "slots" that concurrently running
//! pipelines claim and release, keyed by a `usize`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use covid_ingest_import::ImportProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// A pool of reusable spinner slots.
pub(crate) struct SpinnerPool {
    _mp: MultiProgress,
    spinners: Vec<ProgressBar>,
    slot_assignments: HashMap<usize, usize>,
    free_slots: Vec<usize>,
}

impl SpinnerPool {
    /// Create a new spinner pool with `n` slots. When `quiet` is true, all
    /// spinners are hidden.
    pub(crate) fn new(n: usize, quiet: bool) -> Self {
        let mp = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };

        let spinner_style = ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("/-\\|");

        let spinners = (0..n)
            .map(|_| {
                let pb = mp.add(ProgressBar::new_spinner());
                pb.set_style(spinner_style.clone());
                pb
            })
            .collect();

        Self {
            _mp: mp,
            spinners,
            slot_assignments: HashMap::new(),
            free_slots: (0..n).rev().collect(),
        }
    }

    /// Claim a spinner slot for the given key and set its message. A key
    /// that already holds a slot keeps it.
    pub(crate) fn claim(&mut self, key: usize, msg: String) {
        if let Some(&slot) = self.slot_assignments.get(&key) {
            self.spinners[slot].set_message(msg);
        } else if let Some(slot) = self.free_slots.pop() {
            self.spinners[slot].reset();
            self.spinners[slot].enable_steady_tick(Duration::from_millis(100));
            self.spinners[slot].set_message(msg);
            self.slot_assignments.insert(key, slot);
        }
    }

    /// Update the message for a claimed slot. No-op if the key has no slot.
    pub(crate) fn update(&self, key: usize, msg: String) {
        if let Some(&slot) = self.slot_assignments.get(&key) {
            self.spinners[slot].set_message(msg);
        }
    }

    /// Release a spinner slot: stop ticking, clear the line, return to pool.
    pub(crate) fn release(&mut self, key: usize) {
        if let Some(slot) = self.slot_assignments.remove(&key) {
            self.spinners[slot].disable_steady_tick();
            self.spinners[slot].set_message("");
            self.spinners[slot].finish_and_clear();
            self.free_slots.push(slot);
        }
    }

    /// Clear all spinners and reset slot tracking.
    pub(crate) fn clear_all(&mut self) {
        for spinner in &self.spinners {
            spinner.disable_steady_tick();
            spinner.set_message("");
            spinner.finish_and_clear();
        }
        self.slot_assignments.clear();
        self.free_slots = (0..self.spinners.len()).rev().collect();
    }
}

/// Progress reporter that drives one slot of a shared [`SpinnerPool`].
pub(crate) struct SpinnerProgress {
    pool: Arc<Mutex<SpinnerPool>>,
    key: usize,
    name: &'static str,
}

impl SpinnerProgress {
    pub(crate) fn new(pool: Arc<Mutex<SpinnerPool>>, key: usize, name: &'static str) -> Self {
        Self { pool, key, name }
    }
}

impl ImportProgress for SpinnerProgress {
    fn on_location(&self, current: u64, label: &str) {
        if let Ok(pool) = self.pool.lock() {
            pool.update(self.key, format!("{}: {} locations ({})", self.name, current, label));
        }
    }

    fn on_phase(&self, message: &str) {
        if let Ok(mut pool) = self.pool.lock() {
            pool.claim(self.key, format!("{}: {}", self.name, message));
        }
    }

    fn on_complete(&self, message: &str) {
        if let Ok(mut pool) = self.pool.lock() {
            pool.release(self.key);
        }
        log::info!("{}", message);
    }
}
