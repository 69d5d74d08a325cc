// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Terminal progress bar for plan evaluation.

use std::io::{self, Write};
use std::sync::Mutex;

use entiny::ProgressObserver;

const BAR_WIDTH: usize = 30;

/// Draws `[#####.....] done/total` on stderr, redrawing only when the bar moves.
#[derive(Debug, Default)]
pub struct TerminalProgress {
    state: Mutex<DrawState>,
}

#[derive(Debug, Default)]
struct DrawState {
    /// Highest completion count seen
    done: usize,
    /// Last drawn fill, in bar cells
    filled: Option<usize>,
}

impl TerminalProgress {
    /// Create a progress bar that has not drawn anything yet
    pub fn new() -> Self {
        Self::default()
    }

    fn draw(&self, done: usize, total: usize) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if !state.advance(done, total) {
            return;
        }
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{}", render_line(done, total));
        let _ = stderr.flush();
    }
}

impl DrawState {
    /// Record `done` and decide whether the bar needs a redraw.
    ///
    /// Parallel requests can report out of order; a count lower than one
    /// already seen is ignored.
    fn advance(&mut self, done: usize, total: usize) -> bool {
        if done < self.done {
            return false;
        }
        self.done = done;
        let filled = render_fill(done, total);
        if self.filled == Some(filled) && done != total {
            return false;
        }
        self.filled = Some(filled);
        true
    }
}

impl ProgressObserver for TerminalProgress {
    fn on_start(&self, total: usize) {
        self.draw(0, total);
    }

    fn on_request_complete(&self, done: usize, total: usize) {
        self.draw(done, total);
    }

    fn on_finish(&self) {
        let _ = writeln!(io::stderr());
    }
}

fn render_fill(done: usize, total: usize) -> usize {
    if total == 0 {
        BAR_WIDTH
    } else {
        done.min(total) * BAR_WIDTH / total
    }
}

fn render_line(done: usize, total: usize) -> String {
    let filled = render_fill(done, total);
    format!(
        "Sampling [{}{}] {done}/{total} requests",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH - filled)
    )
}
