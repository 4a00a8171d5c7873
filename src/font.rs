use image::{Rgba, RgbaImage};

/// Horizontal advance per character: 5 glyph columns plus 1 spacing column
pub const CHAR_ADVANCE: i32 = 6;
/// Glyph cell height in rows
pub const CHAR_HEIGHT: i32 = 7;

/// 5x7 bitmap font covering printable ASCII (' ' through '~').
///
/// One entry per character starting at ASCII 32; each entry holds 7 rows
/// with the 5 glyph columns packed into the high bits of each byte.
pub static FONT_BITMAP: [[u8; 7]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x20, 0x20, 0x20, 0x20, 0x20, 0x00, 0x20], // '!'
    [0x50, 0x50, 0x50, 0x00, 0x00, 0x00, 0x00], // '"'
    [0x50, 0x50, 0xF8, 0x50, 0xF8, 0x50, 0x50], // '#'
    [0x20, 0x78, 0xA0, 0x70, 0x28, 0xF0, 0x20], // '$'
    [0xC0, 0xC8, 0x10, 0x20, 0x40, 0x98, 0x18], // '%'
    [0x60, 0x90, 0xA0, 0x40, 0xA8, 0x90, 0x68], // '&'
    [0x20, 0x20, 0x40, 0x00, 0x00, 0x00, 0x00], // '\''
    [0x10, 0x20, 0x40, 0x40, 0x40, 0x20, 0x10], // '('
    [0x40, 0x20, 0x10, 0x10, 0x10, 0x20, 0x40], // ')'
    [0x00, 0x20, 0xA8, 0x70, 0xA8, 0x20, 0x00], // '*'
    [0x00, 0x20, 0x20, 0xF8, 0x20, 0x20, 0x00], // '+'
    [0x00, 0x00, 0x00, 0x00, 0x60, 0x20, 0x40], // ','
    [0x00, 0x00, 0x00, 0xF8, 0x00, 0x00, 0x00], // '-'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x60, 0x60], // '.'
    [0x00, 0x08, 0x10, 0x20, 0x40, 0x80, 0x00], // '/'
    [0x70, 0x88, 0x98, 0xA8, 0xC8, 0x88, 0x70], // '0'
    [0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x70], // '1'
    [0x70, 0x88, 0x08, 0x10, 0x20, 0x40, 0xF8], // '2'
    [0xF8, 0x10, 0x20, 0x10, 0x08, 0x88, 0x70], // '3'
    [0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10], // '4'
    [0xF8, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70], // '5'
    [0x30, 0x40, 0x80, 0xF0, 0x88, 0x88, 0x70], // '6'
    [0xF8, 0x08, 0x10, 0x20, 0x40, 0x40, 0x40], // '7'
    [0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x70], // '8'
    [0x70, 0x88, 0x88, 0x78, 0x08, 0x10, 0x60], // '9'
    [0x00, 0x60, 0x60, 0x00, 0x60, 0x60, 0x00], // ':'
    [0x00, 0x60, 0x60, 0x00, 0x60, 0x20, 0x40], // ';'
    [0x10, 0x20, 0x40, 0x80, 0x40, 0x20, 0x10], // '<'
    [0x00, 0x00, 0xF8, 0x00, 0xF8, 0x00, 0x00], // '='
    [0x40, 0x20, 0x10, 0x08, 0x10, 0x20, 0x40], // '>'
    [0x70, 0x88, 0x08, 0x10, 0x20, 0x00, 0x20], // '?'
    [0x70, 0x88, 0x08, 0x68, 0xA8, 0xA8, 0x70], // '@'
    [0x70, 0x88, 0x88, 0xF8, 0x88, 0x88, 0x88], // 'A'
    [0xF0, 0x88, 0x88, 0xF0, 0x88, 0x88, 0xF0], // 'B'
    [0x70, 0x88, 0x80, 0x80, 0x80, 0x88, 0x70], // 'C'
    [0xE0, 0x90, 0x88, 0x88, 0x88, 0x90, 0xE0], // 'D'
    [0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0xF8], // 'E'
    [0xF8, 0x80, 0x80, 0xF0, 0x80, 0x80, 0x80], // 'F'
    [0x70, 0x88, 0x80, 0xB8, 0x88, 0x88, 0x78], // 'G'
    [0x88, 0x88, 0x88, 0xF8, 0x88, 0x88, 0x88], // 'H'
    [0x70, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70], // 'I'
    [0x38, 0x10, 0x10, 0x10, 0x10, 0x90, 0x60], // 'J'
    [0x88, 0x90, 0xA0, 0xC0, 0xA0, 0x90, 0x88], // 'K'
    [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0xF8], // 'L'
    [0x88, 0xD8, 0xA8, 0xA8, 0x88, 0x88, 0x88], // 'M'
    [0x88, 0x88, 0xC8, 0xA8, 0x98, 0x88, 0x88], // 'N'
    [0x70, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70], // 'O'
    [0xF0, 0x88, 0x88, 0xF0, 0x80, 0x80, 0x80], // 'P'
    [0x70, 0x88, 0x88, 0x88, 0xA8, 0x90, 0x68], // 'Q'
    [0xF0, 0x88, 0x88, 0xF0, 0xA0, 0x90, 0x88], // 'R'
    [0x78, 0x80, 0x80, 0x70, 0x08, 0x08, 0xF0], // 'S'
    [0xF8, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20], // 'T'
    [0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70], // 'U'
    [0x88, 0x88, 0x88, 0x88, 0x88, 0x50, 0x20], // 'V'
    [0x88, 0x88, 0x88, 0xA8, 0xA8, 0xA8, 0x50], // 'W'
    [0x88, 0x88, 0x50, 0x20, 0x50, 0x88, 0x88], // 'X'
    [0x88, 0x88, 0x88, 0x50, 0x20, 0x20, 0x20], // 'Y'
    [0xF8, 0x08, 0x10, 0x20, 0x40, 0x80, 0xF8], // 'Z'
    [0x70, 0x40, 0x40, 0x40, 0x40, 0x40, 0x70], // '['
    [0x00, 0x80, 0x40, 0x20, 0x10, 0x08, 0x00], // '\\'
    [0x70, 0x10, 0x10, 0x10, 0x10, 0x10, 0x70], // ']'
    [0x20, 0x50, 0x88, 0x00, 0x00, 0x00, 0x00], // '^'
    [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF8], // '_'
    [0x40, 0x20, 0x10, 0x00, 0x00, 0x00, 0x00], // '`'
    [0x00, 0x00, 0x70, 0x08, 0x78, 0x88, 0x78], // 'a'
    [0x80, 0x80, 0xB0, 0xC8, 0x88, 0x88, 0xF0], // 'b'
    [0x00, 0x00, 0x70, 0x80, 0x80, 0x88, 0x70], // 'c'
    [0x08, 0x08, 0x68, 0x98, 0x88, 0x88, 0x78], // 'd'
    [0x00, 0x00, 0x70, 0x88, 0xF8, 0x80, 0x70], // 'e'
    [0x30, 0x48, 0x40, 0xE0, 0x40, 0x40, 0x40], // 'f'
    [0x00, 0x78, 0x88, 0x88, 0x78, 0x08, 0x70], // 'g'
    [0x80, 0x80, 0xB0, 0xC8, 0x88, 0x88, 0x88], // 'h'
    [0x20, 0x00, 0x60, 0x20, 0x20, 0x20, 0x70], // 'i'
    [0x10, 0x00, 0x30, 0x10, 0x10, 0x90, 0x60], // 'j'
    [0x80, 0x80, 0x90, 0xA0, 0xC0, 0xA0, 0x90], // 'k'
    [0x60, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70], // 'l'
    [0x00, 0x00, 0xD0, 0xA8, 0xA8, 0xA8, 0xA8], // 'm'
    [0x00, 0x00, 0xB0, 0xC8, 0x88, 0x88, 0x88], // 'n'
    [0x00, 0x00, 0x70, 0x88, 0x88, 0x88, 0x70], // 'o'
    [0x00, 0x00, 0xF0, 0x88, 0xF0, 0x80, 0x80], // 'p'
    [0x00, 0x00, 0x68, 0x98, 0x78, 0x08, 0x08], // 'q'
    [0x00, 0x00, 0xB0, 0xC8, 0x80, 0x80, 0x80], // 'r'
    [0x00, 0x00, 0x70, 0x80, 0x70, 0x08, 0xF0], // 's'
    [0x40, 0x40, 0xE0, 0x40, 0x40, 0x48, 0x30], // 't'
    [0x00, 0x00, 0x88, 0x88, 0x88, 0x98, 0x68], // 'u'
    [0x00, 0x00, 0x88, 0x88, 0x88, 0x50, 0x20], // 'v'
    [0x00, 0x00, 0x88, 0x88, 0xA8, 0xA8, 0x50], // 'w'
    [0x00, 0x00, 0x88, 0x50, 0x20, 0x50, 0x88], // 'x'
    [0x00, 0x00, 0x88, 0x88, 0x78, 0x08, 0x70], // 'y'
    [0x00, 0x00, 0xF8, 0x10, 0x20, 0x40, 0xF8], // 'z'
    [0x10, 0x20, 0x20, 0x40, 0x20, 0x20, 0x10], // '{'
    [0x20, 0x20, 0x20, 0x20, 0x20, 0x20, 0x20], // '|'
    [0x40, 0x20, 0x20, 0x10, 0x20, 0x20, 0x40], // '}'
    [0x00, 0x00, 0x40, 0xA8, 0x10, 0x00, 0x00], // '~'
];

/// Draw text onto an RGBA image using the bitmap font.
///
/// The origin is the top-left corner of the first glyph cell; pixels
/// falling outside the image are clipped. Each glyph pixel becomes a
/// scale x scale block.
pub fn draw_text(image: &mut RgbaImage, text: &str, x: i32, y: i32, scale: u32, color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    let mut cursor_x = x;

    for c in text.chars() {
        if c >= ' ' && c <= '~' {
            let char_index = (c as usize) - 32;
            let bitmap = FONT_BITMAP[char_index];

            for row in 0..7 {
                for col in 0..5 {
                    if (bitmap[row] & (0b1000_0000 >> col)) != 0 {
                        for sy in 0..scale {
                            for sx in 0..scale {
                                let px = cursor_x + (col as i32) * scale as i32 + sx as i32;
                                let py = y + (row as i32) * scale as i32 + sy as i32;

                                if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height
                                {
                                    image.put_pixel(px as u32, py as u32, color);
                                }
                            }
                        }
                    }
                }
            }
        }

        cursor_x += CHAR_ADVANCE * scale as i32;
    }
}

/// Pixel width of a rendered string
pub fn text_width(text: &str, scale: u32) -> i32 {
    text.chars().count() as i32 * CHAR_ADVANCE * scale as i32
}
