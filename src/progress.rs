//! Progress reporting for scans.
//!
//! The engine only knows about [`ProgressSink`]. The CLI runs the scan on a
//! worker thread whose sink forwards percentages over a channel, and the
//! calling thread draws them with indicatif.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::{DupeError, Result};
use crate::grouping::{self, ScanOptions, ScanResult};

/// Receives the completed percentage (0.0 to 100.0) after each file.
///
/// Calls are non-decreasing within one scan and the last one is exactly
/// 100.0. Implementations should return quickly.
pub trait ProgressSink {
    fn report(&mut self, percent: f64);
}

impl<F> ProgressSink for F
where
    F: FnMut(f64),
{
    fn report(&mut self, percent: f64) {
        self(percent)
    }
}

/// Bar resolution: hundredths of a percent
const BAR_STEPS: u64 = 10_000;

/// Terminal progress bar driven by scan percentages
pub struct ScanBar {
    bar: ProgressBar,
}

impl ScanBar {
    pub fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }

        let bar = ProgressBar::new(BAR_STEPS);
        let style = ProgressStyle::with_template("Searching... [{bar:40.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_message("0.00%");
        Self { bar }
    }

    pub fn update(&self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        self.bar
            .set_position((percent / 100.0 * BAR_STEPS as f64).round() as u64);
        self.bar.set_message(format!("{:.2}%", percent));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Run [`grouping::scan`] on a worker thread, feeding its progress to `bar`.
///
/// Blocks until the scan completes. The calling thread only redraws the
/// bar, so the scan itself stays strictly sequential.
pub fn scan_in_background(
    roots: &[PathBuf],
    options: &ScanOptions,
    bar: &ScanBar,
) -> Result<ScanResult> {
    let (tx, rx) = mpsc::channel::<f64>();

    thread::scope(|scope| {
        let worker = scope.spawn(move || {
            let mut sink = |percent: f64| {
                // Receiver only disappears once the scope is unwinding
                let _ = tx.send(percent);
            };
            grouping::scan(roots, options, &mut sink)
        });

        // Ends when the worker drops its sender
        for percent in rx {
            bar.update(percent);
        }
        bar.finish();

        worker.join().map_err(|_| DupeError::ScanWorker)?
    })
}
