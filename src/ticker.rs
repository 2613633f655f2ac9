use crate::render::{Cell, Surface};
use crossterm::style::Color;

/// Blank columns appended to every card.
const CARD_GAP: usize = 4;

/// One `git log --pretty=format:%h%x09%an%x09%ar%x09%s` record. The short
/// hash is not shown, so it is not kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogEntry<'a> {
    pub(crate) author: &'a str,
    pub(crate) rel_time: &'a str,
    pub(crate) subject: &'a str,
}

impl<'a> LogEntry<'a> {
    /// `None` unless the line splits into exactly four tab-separated fields.
    /// The subject is the remainder, so it may itself contain tabs.
    pub(crate) fn parse(line: &'a str) -> Option<Self> {
        let mut parts = line.splitn(4, '\t');
        let _hash = parts.next()?;
        Some(Self {
            author: parts.next()?,
            rel_time: parts.next()?,
            subject: parts.next()?,
        })
    }

    pub(crate) fn message(&self) -> &'a str {
        self.subject
    }

    pub(crate) fn meta(&self) -> String {
        format!("by {} {}", self.author, self.rel_time)
    }
}

/// Parse up to `max_entries` well-formed records, newest first as git
/// prints them. Blank and malformed lines are skipped.
pub(crate) fn parse_log(text: &str, max_entries: usize) -> Vec<LogEntry<'_>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let entry = LogEntry::parse(line);
            if entry.is_none() {
                log::debug!("skipping malformed log line: {line:?}");
            }
            entry
        })
        .take(max_entries)
        .collect()
}

fn pad_right(s: &str, width: usize) -> impl Iterator<Item = char> + '_ {
    let len = s.chars().count();
    s.chars()
        .chain(std::iter::repeat(' ').take(width.saturating_sub(len)))
}

/// Two-lane scrolling marquee for the bottom rows: commit subjects on top,
/// "by AUTHOR WHEN" underneath. Each entry is a card as wide as the longer
/// of its two strings plus a gap, so cards line up column for column.
///
/// Both lanes share one cursor but wrap with their own length. With the
/// equal-width cards built here the lengths are always the same.
#[derive(Clone, Debug)]
pub(crate) struct Ticker {
    message: Vec<char>,
    meta: Vec<char>,
    offset: usize,
    cadence: u64,
}

impl Ticker {
    /// `None` means no ticker: nothing parsed, the fire gets the whole screen.
    pub(crate) fn build(log_text: &str, max_entries: usize, cadence: u64) -> Option<Self> {
        let entries = parse_log(log_text, max_entries);
        if entries.is_empty() {
            return None;
        }

        let mut message = Vec::new();
        let mut meta = Vec::new();
        for e in &entries {
            let (m, d) = (e.message(), e.meta());
            let card = m.chars().count().max(d.chars().count()) + CARD_GAP;
            message.extend(pad_right(m, card));
            meta.extend(pad_right(&d, card));
        }

        log::info!(
            "ticker built from {} entries ({} columns)",
            entries.len(),
            message.len()
        );
        Some(Self {
            message,
            meta,
            offset: 0,
            cadence: cadence.max(1),
        })
    }

    #[cfg(test)]
    pub(crate) fn message_lane(&self) -> String {
        self.message.iter().collect()
    }

    #[cfg(test)]
    pub(crate) fn meta_lane(&self) -> String {
        self.meta.iter().collect()
    }

    #[cfg(test)]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    /// Advance one column on every `cadence`-th frame.
    pub(crate) fn tick(&mut self, frame: u64) {
        if self.message.is_empty() || frame % self.cadence != 0 {
            return;
        }
        self.offset = (self.offset + 1) % self.message.len();
    }

    /// Draw both lanes across the bottom two rows.
    pub(crate) fn render<S: Surface>(&self, surface: &mut S) {
        let (cols, rows) = surface.size();
        if rows < 2 || self.message.is_empty() || self.meta.is_empty() {
            return;
        }
        let (msg_row, meta_row) = (rows - 2, rows - 1);
        for x in 0..cols {
            let i = self.offset + x as usize;
            let m = self.message[i % self.message.len()];
            let d = self.meta[i % self.meta.len()];
            surface.set_cell(x, msg_row, lane_cell(m));
            surface.set_cell(x, meta_row, lane_cell(d));
        }
    }
}

fn lane_cell(ch: char) -> Cell {
    Cell {
        ch,
        fg: Color::White,
        bold: false,
    }
}
