//! Rendering of progress events on stdout.

use std::io::{self, Write};

use anyhow::Result;
use catalog_scraper_core::ProgressEvent;
use indicatif::{ProgressBar, ProgressStyle};

/// How each progress event is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputMode {
    /// The human-readable progress line.
    Text,
    /// The progress line prefixed with `[index/total]` on per-link events,
    /// for runs whose links interleave.
    LabeledText,
    /// One JSON object per line.
    Json,
}

impl OutputMode {
    /// Picks the mode for a run: labels are needed once links run in parallel.
    pub(crate) fn for_run(json: bool, concurrency: usize) -> Self {
        if json {
            Self::Json
        } else if concurrency > 1 {
            Self::LabeledText
        } else {
            Self::Text
        }
    }
}

pub(crate) fn render_event(mode: OutputMode, event: &ProgressEvent) -> Result<String> {
    Ok(match (mode, event.link()) {
        (OutputMode::Json, _) => serde_json::to_string(event)?,
        (OutputMode::LabeledText, Some(link)) => format!("[{link}] {event}"),
        (OutputMode::Text | OutputMode::LabeledText, _) => event.to_string(),
    })
}

/// Prints events and, when enabled, advances a bar of finished links.
pub(crate) struct ProgressPrinter {
    mode: OutputMode,
    bar: Option<ProgressBar>,
    use_bar: bool,
}

impl ProgressPrinter {
    pub(crate) fn new(mode: OutputMode, use_bar: bool) -> Self {
        Self {
            mode,
            bar: None,
            use_bar,
        }
    }

    pub(crate) fn handle(&mut self, event: &ProgressEvent) -> Result<()> {
        let line = render_event(self.mode, event)?;

        if self.use_bar
            && self.bar.is_none()
            && let Some(link) = event.link()
        {
            self.bar = Some(new_bar(link.total));
        }

        match &self.bar {
            Some(bar) => {
                bar.println(line);
                if event.finishes_link() {
                    bar.inc(1);
                }
            }
            None => {
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{line}")?;
            }
        }
        Ok(())
    }

    pub(crate) fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

fn new_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(u64::try_from(total).unwrap_or(u64::MAX));
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} products ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
