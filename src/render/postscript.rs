//! Encapsulated PostScript output.
//!
//! Words are set in 10pt Courier on the same column grid the text diagram uses;
//! every column is 6pt wide and every arc row 12pt high.

use std::fmt::Write as _;

use super::layout::Layout;
use crate::{linkage::Linkage, options::ParseOptions};

const CHAR_WIDTH: usize = 6;
const ROW_HEIGHT: usize = 12;
const MARGIN: usize = 10;
/// Baseline of the word row
const WORD_Y: usize = MARGIN;
/// Where arcs leave the words
const STEM_Y: usize = WORD_Y + 10;

const PROLOGUE: &str = "\
/Courier findfont 10 scalefont setfont
0.5 setlinewidth
% word: (text) x y
/word { moveto show } def
% link: (label) x1 x2 y
/link {
  /ly exch def /lx2 exch def /lx1 exch def /lab exch def
  newpath lx1 STEM moveto lx1 ly lineto lx2 ly lineto lx2 STEM lineto stroke
  lx1 lx2 add 2 div lab stringwidth pop 2 div sub ly 2 add moveto lab show
} def
";

pub fn render(linkage: &Linkage, options: &ParseOptions) -> String {
    let layout = Layout::new(linkage, options.display_walls());
    let width = layout.width * CHAR_WIDTH + 2 * MARGIN;
    let height = STEM_Y + layout.max_height * ROW_HEIGHT + ROW_HEIGHT + MARGIN;
    let title: Vec<&str> = layout.words.iter().map(|w| w.text.as_str()).collect();

    let mut out = String::new();
    let _ = writeln!(out, "%!PS-Adobe-3.0 EPSF-3.0");
    let _ = writeln!(out, "%%BoundingBox: 0 0 {} {}", width, height);
    let _ = writeln!(out, "%%Creator: link-grammar {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(out, "%%Title: {}", escape(&title.join(" ")));
    let _ = writeln!(out, "%%Pages: 1");
    let _ = writeln!(out, "%%EndComments");
    let _ = writeln!(out, "%%BeginProlog");
    let _ = writeln!(out, "/STEM {} def", STEM_Y);
    out.push_str(PROLOGUE);
    let _ = writeln!(out, "%%EndProlog");
    let _ = writeln!(out, "%%Page: 1 1");

    for word in &layout.words {
        let _ = writeln!(
            out,
            "({}) {} {} word",
            escape(&word.text),
            MARGIN + word.start * CHAR_WIDTH,
            WORD_Y
        );
    }
    for link in &layout.links {
        let x = |i: usize| MARGIN + layout.words[i].anchor() * CHAR_WIDTH + CHAR_WIDTH / 2;
        let _ = writeln!(
            out,
            "({}) {} {} {} link",
            escape(&link.label),
            x(link.left),
            x(link.right),
            STEM_Y + link.height * ROW_HEIGHT
        );
    }

    let _ = writeln!(out, "showpage");
    let _ = writeln!(out, "%%EOF");
    out
}

/// Escape text for a PostScript string literal. Non-ASCII bytes of the UTF-8
/// encoding are written as octal escapes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push('\\');
                out.push(byte as char);
            }
            0x20..=0x7e => out.push(byte as char),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}
