use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Style {
    pub(crate) fg: Color,
    pub(crate) bold: bool,
}

impl Style {
    const fn plain(fg: Color) -> Self {
        Self { fg, bold: false }
    }
    const fn bold(fg: Color) -> Self {
        Self { fg, bold: true }
    }
}

/// Values at or above `min` use `style`, unless a higher band matches.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Band {
    pub(crate) min: u8,
    pub(crate) style: Style,
}

pub(crate) const GLYPH_LEVELS: usize = 10;

/// Intensity -> (glyph, style). Fixed once built.
#[derive(Clone, Debug)]
pub(crate) struct Palette {
    glyphs: [char; GLYPH_LEVELS],
    // ascending by `min`, first band at 0
    bands: Vec<Band>,
}

const FIRE_GLYPHS: [char; GLYPH_LEVELS] = [' ', '.', ':', '^', '*', 'x', 's', 'S', '#', '$'];

const CONTRIB_GLYPHS: [char; GLYPH_LEVELS] = [' ', '·', '·', '▪', '▪', '▪', '■', '■', '■', '■'];

impl Palette {
    pub(crate) fn new(glyphs: [char; GLYPH_LEVELS], mut bands: Vec<Band>) -> Self {
        bands.sort_by_key(|b| b.min);
        Self { glyphs, bands }
    }

    /// Dark red embers up to bright yellow flame tips.
    pub(crate) fn fire() -> Self {
        Self::new(
            FIRE_GLYPHS,
            vec![
                Band {
                    min: 0,
                    style: Style::plain(Color::DarkRed),
                },
                Band {
                    min: 5,
                    style: Style::plain(Color::Red),
                },
                Band {
                    min: 10,
                    style: Style::plain(Color::Rgb {
                        r: 255,
                        g: 140,
                        b: 0,
                    }),
                },
                Band {
                    min: 16,
                    style: Style::bold(Color::Yellow),
                },
            ],
        )
    }

    /// The five greens of a GitHub contribution calendar.
    pub(crate) fn contributions() -> Self {
        let green = |r, g, b| Style::plain(Color::Rgb { r, g, b });
        Self::new(
            CONTRIB_GLYPHS,
            vec![
                Band {
                    min: 0,
                    style: green(22, 27, 34),
                },
                Band {
                    min: 2,
                    style: green(14, 68, 41),
                },
                Band {
                    min: 5,
                    style: green(0, 109, 50),
                },
                Band {
                    min: 10,
                    style: green(38, 166, 65),
                },
                Band {
                    min: 16,
                    style: green(57, 211, 83),
                },
            ],
        )
    }

    pub(crate) fn glyph_for(&self, v: u8) -> char {
        self.glyphs[(v as usize).min(GLYPH_LEVELS - 1)]
    }

    pub(crate) fn style_for(&self, v: u8) -> Style {
        self.bands
            .iter()
            .rev()
            .find(|b| b.min <= v)
            .or(self.bands.first())
            .map(|b| b.style)
            .unwrap_or(Style::plain(Color::White))
    }
}
