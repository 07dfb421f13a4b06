//! Text diagrams of linkages.
//!
//! ```text
//!     +------------Xp-----------+
//!     +--Wd--+--S--+--MV-+-J-+  |
//!     |      |     |     |   |  |
//! LEFT-WALL  я  иду.v   по улице .
//! ```

use std::fmt::Write as _;

use super::layout::Layout;
use crate::{linkage::Linkage, options::ParseOptions};

pub fn render(linkage: &Linkage, options: &ParseOptions) -> String {
    let layout = Layout::new(linkage, options.display_walls());
    let mut out = String::new();

    for height in (1..=layout.max_height).rev() {
        out.push_str(&arc_row(&layout, height));
        out.push('\n');
    }
    if layout.max_height > 0 {
        out.push_str(&stem_row(&layout, 0));
        out.push('\n');
    }
    out.push_str(&word_row(&layout));
    out.push('\n');

    if options.verbosity() >= 1 {
        out.push('\n');
        out.push_str(&link_table(linkage));
    }
    if options.verbosity() >= 2 {
        out.push('\n');
        out.push_str(&disjunct_table(linkage));
    }
    out
}

fn blank_row(layout: &Layout) -> Vec<char> {
    vec![' '; layout.width + 1]
}

fn finish_row(row: Vec<char>) -> String {
    row.into_iter().collect::<String>().trim_end().to_string()
}

/// Stems of every link higher than `height`.
fn stem_row(layout: &Layout, height: usize) -> String {
    let mut row = blank_row(layout);
    draw_stems(layout, height, &mut row);
    finish_row(row)
}

fn draw_stems(layout: &Layout, height: usize, row: &mut [char]) {
    for link in layout.links.iter().filter(|l| l.height > height) {
        for word in [link.left, link.right] {
            let col = layout.words[word].anchor();
            if row[col] == ' ' {
                row[col] = '|';
            }
        }
    }
}

/// Arcs of height `height`, with the stems of higher links passing through.
fn arc_row(layout: &Layout, height: usize) -> String {
    let mut row = blank_row(layout);
    for link in layout.links.iter().filter(|l| l.height == height) {
        let from = layout.words[link.left].anchor();
        let to = layout.words[link.right].anchor();
        for cell in &mut row[from..=to] {
            *cell = '-';
        }
        row[from] = '+';
        row[to] = '+';

        let label: Vec<char> = link.label.chars().collect();
        let span = to - from - 1;
        if label.len() <= span {
            let at = from + 1 + (span - label.len()) / 2;
            row[at..at + label.len()].copy_from_slice(&label);
        }
    }
    draw_stems(layout, height, &mut row);
    finish_row(row)
}

fn word_row(layout: &Layout) -> String {
    let mut out = String::new();
    let mut col = 0;
    for word in &layout.words {
        while col < word.start {
            out.push(' ');
            col += 1;
        }
        out.push_str(&word.text);
        col += word.width;
    }
    out
}

fn link_table(linkage: &Linkage) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "cost vector = (UNUSED={} DIS={} LEN={})",
        linkage.null_count(),
        linkage.disjunct_cost(),
        linkage.link_cost()
    );
    let left_width = linkage
        .links()
        .iter()
        .filter_map(|l| linkage.word(l.left))
        .map(|w| w.text.chars().count())
        .max()
        .unwrap_or(0);
    for link in linkage.links() {
        let (Some(left), Some(right)) = (linkage.word(link.left), linkage.word(link.right)) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{:>lw$} {:>6} <---{}---> {:<6} {}",
            left.text,
            link.left_connector,
            link.label,
            link.right_connector,
            right.text,
            lw = left_width
        );
    }
    out
}

fn disjunct_table(linkage: &Linkage) -> String {
    let mut out = String::new();
    for word in linkage.words() {
        match &word.disjunct {
            Some(d) => {
                let _ = writeln!(out, "{:<16} {:<24} cost={}", word.text, d, word.cost);
            }
            None => {
                let _ = writeln!(out, "{:<16} (null)", word.text);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linkage::{Link, LinkageWord};

    fn sample() -> Linkage {
        let words = ["LEFT-WALL", "я", "иду.v"]
            .iter()
            .enumerate()
            .map(|(i, t)| LinkageWord {
                text: t.to_string(),
                is_wall: i == 0,
                is_null: false,
                disjunct: Some("S+".into()),
                cost: 0,
            })
            .collect();
        let link = |left, right, label: &str| Link {
            left,
            right,
            label: label.into(),
            left_connector: format!("{}+", label),
            right_connector: format!("{}-", label),
        };
        Linkage::new(words, vec![link(0, 1, "Wd"), link(1, 2, "S")])
    }

    #[test]
    fn draws_arcs_stems_and_words() {
        let text = render(&sample(), &ParseOptions::new());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Wd"));
        assert!(lines[0].contains('S'));
        assert!(lines[1].contains('|'));
        assert!(lines[2].starts_with("LEFT-WALL"));
        assert!(lines[2].ends_with("иду.v"));
    }

    #[test]
    fn hides_walls_on_request() {
        let mut options = ParseOptions::new();
        options.set_display_walls(false);
        let text = render(&sample(), &options);
        assert!(!text.contains("LEFT-WALL"));
        assert!(!text.contains("Wd"));
        assert!(text.contains("иду.v"));
    }

    #[test]
    fn verbosity_adds_tables() {
        let mut options = ParseOptions::new();
        options.set_verbosity(1);
        let text = render(&sample(), &options);
        assert!(text.contains("cost vector"));
        assert!(text.contains("<---S--->"));
        assert!(!text.contains("cost=0"));

        options.set_verbosity(2);
        assert!(render(&sample(), &options).contains("cost=0"));
    }
}
