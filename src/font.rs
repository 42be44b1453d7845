//! Glyph table and text layout metrics.
//!
//! Glyphs are stored column-major: each glyph is `width` bytes, one per column, and bit `r`
//! of a column byte is the pixel in row `r` (LSB at the top). This is the classic layout of
//! 5×7 LCD fonts and is what
//! [`PanelBuffer::draw_character`](crate::panel::PanelBuffer::draw_character) consumes.

use embedded_graphics::prelude::Size;

/// Column-major ASCII 5×7 glyphs for `' '` (0x20) through `'~'` (0x7E).
#[rustfmt::skip]
const FONT_5X7_DATA: [u8; 95 * 5] = [
    0x00, 0x00, 0x00, 0x00, 0x00, // ' '
    0x00, 0x00, 0x5F, 0x00, 0x00, // '!'
    0x00, 0x07, 0x00, 0x07, 0x00, // '"'
    0x14, 0x7F, 0x14, 0x7F, 0x14, // '#'
    0x24, 0x2A, 0x7F, 0x2A, 0x12, // '$'
    0x23, 0x13, 0x08, 0x64, 0x62, // '%'
    0x36, 0x49, 0x55, 0x22, 0x50, // '&'
    0x00, 0x05, 0x03, 0x00, 0x00, // '\''
    0x00, 0x1C, 0x22, 0x41, 0x00, // '('
    0x00, 0x41, 0x22, 0x1C, 0x00, // ')'
    0x08, 0x2A, 0x1C, 0x2A, 0x08, // '*'
    0x08, 0x08, 0x3E, 0x08, 0x08, // '+'
    0x00, 0x50, 0x30, 0x00, 0x00, // ','
    0x08, 0x08, 0x08, 0x08, 0x08, // '-'
    0x00, 0x60, 0x60, 0x00, 0x00, // '.'
    0x20, 0x10, 0x08, 0x04, 0x02, // '/'
    0x3E, 0x51, 0x49, 0x45, 0x3E, // '0'
    0x00, 0x42, 0x7F, 0x40, 0x00, // '1'
    0x42, 0x61, 0x51, 0x49, 0x46, // '2'
    0x21, 0x41, 0x45, 0x4B, 0x31, // '3'
    0x18, 0x14, 0x12, 0x7F, 0x10, // '4'
    0x27, 0x45, 0x45, 0x45, 0x39, // '5'
    0x3C, 0x4A, 0x49, 0x49, 0x30, // '6'
    0x01, 0x71, 0x09, 0x05, 0x03, // '7'
    0x36, 0x49, 0x49, 0x49, 0x36, // '8'
    0x06, 0x49, 0x49, 0x29, 0x1E, // '9'
    0x00, 0x36, 0x36, 0x00, 0x00, // ':'
    0x00, 0x56, 0x36, 0x00, 0x00, // ';'
    0x08, 0x14, 0x22, 0x41, 0x00, // '<'
    0x14, 0x14, 0x14, 0x14, 0x14, // '='
    0x00, 0x41, 0x22, 0x14, 0x08, // '>'
    0x02, 0x01, 0x51, 0x09, 0x06, // '?'
    0x32, 0x49, 0x79, 0x41, 0x3E, // '@'
    0x7E, 0x11, 0x11, 0x11, 0x7E, // 'A'
    0x7F, 0x49, 0x49, 0x49, 0x36, // 'B'
    0x3E, 0x41, 0x41, 0x41, 0x22, // 'C'
    0x7F, 0x41, 0x41, 0x22, 0x1C, // 'D'
    0x7F, 0x49, 0x49, 0x49, 0x41, // 'E'
    0x7F, 0x09, 0x09, 0x09, 0x01, // 'F'
    0x3E, 0x41, 0x49, 0x49, 0x7A, // 'G'
    0x7F, 0x08, 0x08, 0x08, 0x7F, // 'H'
    0x00, 0x41, 0x7F, 0x41, 0x00, // 'I'
    0x20, 0x40, 0x41, 0x3F, 0x01, // 'J'
    0x7F, 0x08, 0x14, 0x22, 0x41, // 'K'
    0x7F, 0x40, 0x40, 0x40, 0x40, // 'L'
    0x7F, 0x02, 0x0C, 0x02, 0x7F, // 'M'
    0x7F, 0x04, 0x08, 0x10, 0x7F, // 'N'
    0x3E, 0x41, 0x41, 0x41, 0x3E, // 'O'
    0x7F, 0x09, 0x09, 0x09, 0x06, // 'P'
    0x3E, 0x41, 0x51, 0x21, 0x5E, // 'Q'
    0x7F, 0x09, 0x19, 0x29, 0x46, // 'R'
    0x46, 0x49, 0x49, 0x49, 0x31, // 'S'
    0x01, 0x01, 0x7F, 0x01, 0x01, // 'T'
    0x3F, 0x40, 0x40, 0x40, 0x3F, // 'U'
    0x1F, 0x20, 0x40, 0x20, 0x1F, // 'V'
    0x3F, 0x40, 0x38, 0x40, 0x3F, // 'W'
    0x63, 0x14, 0x08, 0x14, 0x63, // 'X'
    0x07, 0x08, 0x70, 0x08, 0x07, // 'Y'
    0x61, 0x51, 0x49, 0x45, 0x43, // 'Z'
    0x00, 0x7F, 0x41, 0x41, 0x00, // '['
    0x02, 0x04, 0x08, 0x10, 0x20, // '\\'
    0x00, 0x41, 0x41, 0x7F, 0x00, // ']'
    0x04, 0x02, 0x01, 0x02, 0x04, // '^'
    0x40, 0x40, 0x40, 0x40, 0x40, // '_'
    0x00, 0x01, 0x02, 0x04, 0x00, // '`'
    0x20, 0x54, 0x54, 0x54, 0x78, // 'a'
    0x7F, 0x48, 0x44, 0x44, 0x38, // 'b'
    0x38, 0x44, 0x44, 0x44, 0x20, // 'c'
    0x38, 0x44, 0x44, 0x48, 0x7F, // 'd'
    0x38, 0x54, 0x54, 0x54, 0x18, // 'e'
    0x08, 0x7E, 0x09, 0x01, 0x02, // 'f'
    0x0C, 0x52, 0x52, 0x52, 0x3E, // 'g'
    0x7F, 0x08, 0x04, 0x04, 0x78, // 'h'
    0x00, 0x44, 0x7D, 0x40, 0x00, // 'i'
    0x20, 0x40, 0x44, 0x3D, 0x00, // 'j'
    0x7F, 0x10, 0x28, 0x44, 0x00, // 'k'
    0x00, 0x41, 0x7F, 0x40, 0x00, // 'l'
    0x7C, 0x04, 0x18, 0x04, 0x78, // 'm'
    0x7C, 0x08, 0x04, 0x04, 0x78, // 'n'
    0x38, 0x44, 0x44, 0x44, 0x38, // 'o'
    0x7C, 0x14, 0x14, 0x14, 0x08, // 'p'
    0x08, 0x14, 0x14, 0x18, 0x7C, // 'q'
    0x7C, 0x08, 0x04, 0x04, 0x08, // 'r'
    0x48, 0x54, 0x54, 0x54, 0x20, // 's'
    0x04, 0x3F, 0x44, 0x40, 0x20, // 't'
    0x3C, 0x40, 0x40, 0x20, 0x7C, // 'u'
    0x1C, 0x20, 0x40, 0x20, 0x1C, // 'v'
    0x3C, 0x40, 0x30, 0x40, 0x3C, // 'w'
    0x44, 0x28, 0x10, 0x28, 0x44, // 'x'
    0x0C, 0x50, 0x50, 0x50, 0x3C, // 'y'
    0x44, 0x64, 0x54, 0x4C, 0x44, // 'z'
    0x00, 0x08, 0x36, 0x41, 0x00, // '{'
    0x00, 0x00, 0x7F, 0x00, 0x00, // '|'
    0x00, 0x41, 0x36, 0x08, 0x00, // '}'
    0x08, 0x04, 0x08, 0x10, 0x08, // '~'
];

/// Built-in 5×7 ASCII font covering `' '` through `'~'`.
pub const FONT_5X7: Font = Font::new(&FONT_5X7_DATA, b' ', Size::new(5, 7));

/// A read-only, fixed-cell, column-major glyph table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Font {
    data: &'static [u8],
    first_char: u8,
    character_size: Size,
}

impl Font {
    /// Describe a glyph table whose first glyph is `first_char`.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if the cell is empty, taller than one
    /// byte column, or `data` is not a whole number of glyphs.
    #[must_use]
    pub const fn new(data: &'static [u8], first_char: u8, character_size: Size) -> Self {
        assert!(
            character_size.width > 0 && character_size.height > 0,
            "character size must be positive"
        );
        assert!(character_size.height <= 8, "glyph columns are one byte tall");
        assert!(
            data.len() % character_size.width as usize == 0,
            "font data must be a whole number of glyphs"
        );
        Self {
            data,
            first_char,
            character_size,
        }
    }

    /// Width and height of one character cell, without tracking or leading.
    #[must_use]
    pub const fn character_size(&self) -> Size {
        self.character_size
    }

    /// Number of glyphs in the table.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len() / self.character_size.width as usize
    }

    /// Whether the table has no glyphs.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Look up `ch`. Characters outside the table return `None`.
    #[must_use]
    pub fn glyph(&self, ch: char) -> Option<Glyph<'static>> {
        let index = u32::from(ch).checked_sub(u32::from(self.first_char))?;
        let index = usize::try_from(index).ok()?;
        if index >= self.len() {
            return None;
        }
        let data: &'static [u8] = self.data;
        let width = self.character_size.width as usize;
        let start = index * width;
        let columns = data.get(start..start + width)?;
        Some(Glyph {
            columns,
            size: self.character_size,
        })
    }
}

/// One character's pixels, borrowed from a [`Font`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph<'a> {
    columns: &'a [u8],
    size: Size,
}

impl Glyph<'_> {
    /// Glyph cell size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Raw column bytes, LSB at the top.
    #[must_use]
    pub const fn columns(&self) -> &[u8] {
        self.columns
    }

    /// Whether the pixel at (`column`, `row`) is lit. Outside the cell is unlit.
    #[must_use]
    pub fn is_set(&self, column: u32, row: u32) -> bool {
        if row >= self.size.height {
            return false;
        }
        let Ok(column) = usize::try_from(column) else {
            return false;
        };
        self.columns
            .get(column)
            .is_some_and(|bits| bits >> row & 1 == 1)
    }
}

/// Text metrics used by both grids and panels: the font plus the gaps between cells.
///
/// Advances are `width + tracking` horizontally and `height + leading` vertically.
///
/// ```rust
/// use panel_grid::font::TextLayout;
/// use embedded_graphics::prelude::Size;
///
/// let layout = TextLayout::default();
/// assert_eq!(layout.advance(), Size::new(6, 8));
/// // "Hello" wrapped at 2 characters per line: 2 wide, 3 lines tall.
/// assert_eq!(layout.message_cells(5, 2), Size::new(2, 3));
/// assert_eq!(layout.message_size(5, 2), Size::new(12, 24));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextLayout {
    /// Glyph table.
    pub font: Font,
    /// Blank columns between adjacent characters.
    pub tracking: u32,
    /// Blank rows between lines.
    pub leading: u32,
}

impl TextLayout {
    /// Layout with the given font and gaps.
    #[must_use]
    pub const fn new(font: Font, tracking: u32, leading: u32) -> Self {
        Self {
            font,
            tracking,
            leading,
        }
    }

    /// Distance from one character cell to the next, horizontally and vertically.
    #[must_use]
    pub const fn advance(&self) -> Size {
        let character_size = self.font.character_size();
        Size::new(
            character_size.width + self.tracking,
            character_size.height + self.leading,
        )
    }

    /// Message size in character cells (columns, lines).
    ///
    /// With `line_length == 0` the text is a single unwrapped line.
    #[must_use]
    pub const fn message_cells(&self, char_count: usize, line_length: usize) -> Size {
        if char_count == 0 {
            return Size::zero();
        }
        let (columns, lines) = if line_length == 0 {
            (char_count, 1)
        } else {
            let columns = if line_length < char_count {
                line_length
            } else {
                char_count
            };
            (columns, char_count.div_ceil(line_length))
        };
        Size::new(saturate_u32(columns), saturate_u32(lines))
    }

    /// Message bounding box in pixels, including trailing tracking and leading.
    #[must_use]
    pub const fn message_size(&self, char_count: usize, line_length: usize) -> Size {
        let cells = self.message_cells(char_count, line_length);
        let advance = self.advance();
        Size::new(
            cells.width.saturating_mul(advance.width),
            cells.height.saturating_mul(advance.height),
        )
    }
}

impl Default for TextLayout {
    fn default() -> Self {
        Self::new(FONT_5X7, 1, 1)
    }
}

const fn saturate_u32(value: usize) -> u32 {
    if value > u32::MAX as usize {
        u32::MAX
    } else {
        value as u32
    }
}
