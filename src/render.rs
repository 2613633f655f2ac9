use crate::heat::HeatField;
use crate::palette::{Palette, Style};
use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

/// Rows at the bottom of the screen owned by the ticker.
pub(crate) const TICKER_ROWS: u16 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bold: bool,
}

impl Cell {
    pub(crate) fn styled(ch: char, style: Style) -> Self {
        Self {
            ch,
            fg: style.fg,
            bold: style.bold,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    w: u16,
    h: u16,
    cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
}

/// What the frame loop draws on. The terminal is one implementation; tests
/// use an in-memory one.
pub(crate) trait Surface {
    fn size(&self) -> (u16, u16);
    /// Reallocate for a new size. Contents are discarded.
    fn resize(&mut self, cols: u16, rows: u16);
    fn set_cell(&mut self, x: u16, y: u16, cell: Cell);
    fn present(&mut self) -> anyhow::Result<()>;
}

/// Crossterm-backed surface: alternate screen, raw mode, and a
/// double-buffered diff so only changed cells are written each frame.
pub(crate) struct Terminal {
    out: io::Stdout,
    cols: u16,
    rows: u16,
    prev: CellBuffer,
    cur: CellBuffer,
    // force a full repaint after (re)allocation
    dirty: bool,
}

impl Terminal {
    /// Everything that can fail without touching the screen runs first, so
    /// an error here leaves the user's terminal as it was.
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let (cols, rows) = terminal::size()?;
        log::info!("terminal is {cols}x{rows}");

        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = enter_screen(&mut out) {
            let _ = terminal::disable_raw_mode();
            return Err(e.into());
        }

        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
            dirty: true,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            SetAttribute(Attribute::Reset),
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }
}

/// Switch to the alternate screen. On failure, undo whatever part of it
/// reached the terminal before returning the error.
fn enter_screen<W: Write>(out: &mut W) -> io::Result<()> {
    let res = execute!(
        out,
        EnterAlternateScreen,
        cursor::Hide,
        DisableLineWrap,
        terminal::Clear(ClearType::All)
    );
    if res.is_err() {
        let _ = execute!(out, EnableLineWrap, cursor::Show, LeaveAlternateScreen);
    }
    res
}

impl Surface for Terminal {
    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.prev = CellBuffer::new(cols, rows);
        self.cur = CellBuffer::new(cols, rows);
        self.dirty = true;
    }

    fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
        self.cur.set(x, y, cell);
    }

    fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        if self.dirty {
            queue!(self.out, Clear(ClearType::All))?;
        }

        let mut last_fg = None;
        let mut last_bold = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if !self.dirty && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_bold != Some(c.bold) {
                    let attr = if c.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = Some(c.bold);
                    // NormalIntensity can reset colour on some terminals
                    last_fg = None;
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        self.dirty = false;
        Ok(())
    }
}

/// Paints the heat field, keeping off the rows the ticker owns.
pub(crate) struct FireRenderer {
    reserved_rows: u16,
}

impl FireRenderer {
    pub(crate) fn new(ticker_active: bool) -> Self {
        Self {
            reserved_rows: if ticker_active { TICKER_ROWS } else { 0 },
        }
    }

    /// True when `row` belongs to the ticker on a surface `rows` tall. Too
    /// short a surface has no ticker rows at all.
    pub(crate) fn is_reserved(&self, row: u16, rows: u16) -> bool {
        self.reserved_rows > 0 && rows >= self.reserved_rows && row >= rows - self.reserved_rows
    }

    pub(crate) fn paint_cell<S: Surface>(
        &self,
        surface: &mut S,
        palette: &Palette,
        col: u16,
        row: u16,
        intensity: u8,
    ) {
        let (_, rows) = surface.size();
        if self.is_reserved(row, rows) {
            return;
        }
        let cell = Cell::styled(palette.glyph_for(intensity), palette.style_for(intensity));
        surface.set_cell(col, row, cell);
    }

    pub(crate) fn paint_field<S: Surface>(&self, surface: &mut S, field: &HeatField, palette: &Palette) {
        let (cols, rows) = surface.size();
        let w = field.width().min(cols as usize) as u16;
        let h = field.height().min(rows as usize) as u16;
        for y in 0..h {
            for x in 0..w {
                let v = field.get(x as usize, y as usize);
                self.paint_cell(surface, palette, x, y, v);
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory surface that records every write.
    pub(crate) struct MockSurface {
        buf: CellBuffer,
        pub(crate) writes: Vec<(u16, u16, Cell)>,
        pub(crate) presents: usize,
        pub(crate) resizes: Vec<(u16, u16)>,
    }

    impl MockSurface {
        pub(crate) fn new(cols: u16, rows: u16) -> Self {
            Self {
                buf: CellBuffer::new(cols, rows),
                writes: Vec::new(),
                presents: 0,
                resizes: Vec::new(),
            }
        }

        pub(crate) fn cell(&self, x: u16, y: u16) -> Cell {
            self.buf.cells[self.buf.idx(x, y)]
        }

        pub(crate) fn row_text(&self, y: u16) -> String {
            (0..self.buf.w).map(|x| self.cell(x, y).ch).collect()
        }
    }

    impl Surface for MockSurface {
        fn size(&self) -> (u16, u16) {
            (self.buf.w, self.buf.h)
        }
        fn resize(&mut self, cols: u16, rows: u16) {
            self.buf = CellBuffer::new(cols, rows);
            self.resizes.push((cols, rows));
        }
        fn set_cell(&mut self, x: u16, y: u16, cell: Cell) {
            self.writes.push((x, y, cell));
            self.buf.set(x, y, cell);
        }
        fn present(&mut self) -> anyhow::Result<()> {
            self.presents += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockSurface;
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn hot_field(w: usize, h: usize) -> HeatField {
        let mut f = HeatField::new(w, h, StdRng::seed_from_u64(7));
        for _ in 0..h * 2 {
            f.inject(f.sparks_per_frame());
            f.step();
        }
        f
    }

    #[test]
    fn fire_never_paints_ticker_rows() {
        let mut s = MockSurface::new(40, 10);
        let f = hot_field(40, 10);
        FireRenderer::new(true).paint_field(&mut s, &f, &Palette::fire());
        assert!(!s.writes.is_empty());
        assert!(s.writes.iter().all(|&(_, y, _)| y < 8));
        assert_eq!(s.writes.len(), 40 * 8);
    }

    #[test]
    fn without_ticker_every_row_is_painted() {
        let mut s = MockSurface::new(40, 10);
        let f = hot_field(40, 10);
        FireRenderer::new(false).paint_field(&mut s, &f, &Palette::fire());
        assert_eq!(s.writes.len(), 400);
        assert!(s.writes.iter().any(|&(_, y, _)| y == 9));
    }

    #[test]
    fn paint_cell_uses_palette() {
        let mut s = MockSurface::new(4, 4);
        let p = Palette::fire();
        FireRenderer::new(true).paint_cell(&mut s, &p, 1, 1, 20);
        let c = s.cell(1, 1);
        assert_eq!(c.ch, '$');
        assert_eq!(c.fg, Color::Yellow);
        assert!(c.bold);

        FireRenderer::new(true).paint_cell(&mut s, &p, 1, 3, 20);
        assert_eq!(s.writes.len(), 1);
    }

    /// Accepts every write but fails the first flush.
    struct FlakyOut {
        bytes: Vec<u8>,
        flushes: usize,
    }

    impl Write for FlakyOut {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            if self.flushes == 1 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            Ok(())
        }
    }

    #[test]
    fn failed_screen_setup_is_undone() {
        let mut out = FlakyOut {
            bytes: Vec::new(),
            flushes: 0,
        };
        assert!(enter_screen(&mut out).is_err());
        assert_eq!(out.flushes, 2);

        let text = String::from_utf8_lossy(&out.bytes);
        let entered = text.find("\x1b[?1049h").unwrap();
        let left = text.rfind("\x1b[?1049l").unwrap();
        assert!(entered < left);
        assert!(text.rfind("\x1b[?25h").unwrap() > text.find("\x1b[?25l").unwrap());
    }

    #[test]
    fn screen_setup_succeeds_on_a_healthy_writer() {
        let mut out: Vec<u8> = Vec::new();
        enter_screen(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("\x1b[?1049h"));
        assert!(!text.contains("\x1b[?1049l"));
    }

    #[test]
    fn cell_buffer_drops_out_of_bounds_writes() {
        let mut b = CellBuffer::new(3, 2);
        let hot = Cell {
            ch: '$',
            fg: Color::Yellow,
            bold: true,
        };
        b.set(3, 0, hot);
        b.set(0, 2, hot);
        assert!(b.cells.iter().all(|&c| c == Cell::default()));
        b.set(2, 1, hot);
        assert_eq!(b.cells[5], hot);
    }

    #[test]
    fn one_row_surface_has_no_reserved_rows() {
        let r = FireRenderer::new(true);
        assert!(!r.is_reserved(0, 1));
        assert!(r.is_reserved(0, 2));
        assert!(r.is_reserved(1, 2));
        assert!(!r.is_reserved(2, 5));
        assert!(r.is_reserved(3, 5));
    }

    #[test]
    fn field_larger_than_surface_is_clipped() {
        let mut s = MockSurface::new(10, 4);
        let f = hot_field(20, 8);
        FireRenderer::new(false).paint_field(&mut s, &f, &Palette::fire());
        assert_eq!(s.writes.len(), 40);
        assert!(s.writes.iter().all(|&(x, y, _)| x < 10 && y < 4));
    }
}
