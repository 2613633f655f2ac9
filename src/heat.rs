use rand::{rngs::StdRng, Rng};

/// Intensity written into freshly ignited bottom-row cells. Averaging never
/// produces a value above its largest input, so this is also the cap.
pub(crate) const HEAT_MAX: u8 = 65;

/// One ignition per this many columns keeps the flame density independent of
/// terminal width.
const COLUMNS_PER_SPARK: usize = 9;

/// Row-major heat buffer with one trailing row plus one cell of zero padding,
/// so `i + 1`, `i + w` and `i + w + 1` are always in bounds for `i < w * h`.
pub(crate) struct HeatField {
    w: usize,
    h: usize,
    cells: Vec<u8>,
    rng: StdRng,
}

impl HeatField {
    pub(crate) fn new(w: usize, h: usize, rng: StdRng) -> Self {
        Self {
            w,
            h,
            cells: vec![0; padded_len(w, h)],
            rng,
        }
    }

    /// Cold restart at the new size; previous heat is discarded.
    pub(crate) fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.cells = vec![0; padded_len(w, h)];
    }

    pub(crate) fn width(&self) -> usize {
        self.w
    }

    pub(crate) fn height(&self) -> usize {
        self.h
    }

    pub(crate) fn sparks_per_frame(&self) -> usize {
        self.w / COLUMNS_PER_SPARK
    }

    /// Ignite `count` random bottom-row cells. The frame loop passes
    /// `sparks_per_frame()`.
    pub(crate) fn inject(&mut self, count: usize) {
        if self.w == 0 || self.h == 0 {
            return;
        }
        let base = self.w * (self.h - 1);
        for _ in 0..count {
            let i = base + self.rng.gen_range(0..self.w);
            self.cells[i] = HEAT_MAX;
        }
    }

    /// One in-place diffusion sweep, top-left to bottom-right. Each cell
    /// becomes the truncated mean of itself and its right, below and
    /// below-right neighbours, so heat drifts up and to the left while it
    /// cools.
    pub(crate) fn step(&mut self) {
        let w = self.w;
        let c = &mut self.cells;
        for i in 0..w * self.h {
            let sum = c[i] as u16 + c[i + 1] as u16 + c[i + w] as u16 + c[i + w + 1] as u16;
            c[i] = (sum / 4) as u8;
        }
    }

    pub(crate) fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.w || y >= self.h {
            return 0;
        }
        self.cells[y * self.w + x]
    }

    /// The logical grid, without padding.
    #[cfg(test)]
    pub(crate) fn values(&self) -> &[u8] {
        &self.cells[..self.w * self.h]
    }

    #[cfg(test)]
    fn padding(&self) -> &[u8] {
        &self.cells[self.w * self.h..]
    }

    #[cfg(test)]
    fn set(&mut self, x: usize, y: usize, v: u8) {
        let i = y * self.w + x;
        self.cells[i] = v;
    }
}

fn padded_len(w: usize, h: usize) -> usize {
    w * h + w + 1
}
