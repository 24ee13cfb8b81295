//! Live rendering of batch events.

use crossterm::cursor::MoveToColumn;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use modsync_schema::SyncEvent;
use std::io::{IsTerminal, Write};

use super::theme::{Theme, fit};

/// Render a bar of `width` cells, ▓ filled and ░ empty.
pub fn format_progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0)) * width as f64).round() as usize;
    format!("{}{}", "▓".repeat(filled), "░".repeat(width - filled))
}

/// Writes one line per finished job and redraws a single progress line in between.
#[derive(Debug)]
pub struct EventRenderer {
    theme: Theme,
    interactive: bool,
    line_open: bool,
}

impl Default for EventRenderer {
    fn default() -> Self {
        Self::new(std::io::stdout().is_terminal())
    }
}

impl EventRenderer {
    /// Progress lines are only drawn when `interactive`.
    pub fn new(interactive: bool) -> Self {
        Self {
            theme: Theme::default(),
            interactive,
            line_open: false,
        }
    }

    pub fn render(&mut self, event: &SyncEvent) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not worth failing a sync over.
        let _ = self.write_event(&mut out, event);
        let _ = out.flush();
    }

    fn clear_line(&mut self, out: &mut impl Write) -> std::io::Result<()> {
        if self.line_open {
            crossterm::queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            self.line_open = false;
        }
        Ok(())
    }

    fn write_event(&mut self, out: &mut impl Write, event: &SyncEvent) -> std::io::Result<()> {
        let theme = &self.theme;
        match event {
            SyncEvent::Progress {
                filename,
                progress,
                index,
                total,
                speed_label,
                ..
            } => {
                if !self.interactive {
                    return Ok(());
                }
                let line = format!(
                    "{} [{index}/{total}] {:<width$} {} {:>3}%  {speed_label}",
                    theme.icons.active,
                    fit(filename, theme.name_width),
                    format_progress_bar(*progress, theme.bar_width),
                    (progress * 100.0).round() as u32,
                    width = theme.name_width,
                );
                self.clear_line(out)?;
                write!(out, "{line}")?;
                self.line_open = true;
            }
            SyncEvent::Complete { filename } => {
                self.clear_line(out)?;
                writeln!(
                    out,
                    "{} {}",
                    self.theme.icons.success.with(self.theme.colors.success),
                    filename.as_str().with(self.theme.colors.name)
                )?;
            }
            SyncEvent::Error { filename, error } => {
                self.clear_line(out)?;
                writeln!(
                    out,
                    "{} {}  {}",
                    self.theme.icons.error.with(self.theme.colors.error),
                    filename.as_str().with(self.theme.colors.name),
                    error.as_str().with(self.theme.colors.error)
                )?;
            }
            SyncEvent::SyncComplete | SyncEvent::SyncCancelled => self.clear_line(out)?,
        }
        Ok(())
    }
}
