use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::tabulate::PairwiseTable;

const STEPS: usize = 100;
const MAX_GRID_PX: f64 = 760.0;
const LABEL_CHAR_PX: f64 = 6.0;
const BAR_WIDTH: f64 = 20.0;

const VIRIDIS: [u32; 10] = [
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];
const INFERNO: [u32; 10] = [
    0x000004, 0x1b0c41, 0x4a0c6b, 0x781c6d, 0xa52c60, 0xcf4446, 0xed6925, 0xfb9b06, 0xf7d13d,
    0xfcffa4,
];
const MAGMA: [u32; 10] = [
    0x000004, 0x180f3d, 0x440f76, 0x721f81, 0x9e2f7f, 0xcd4071, 0xf1605d, 0xfd9668, 0xfeca8d,
    0xfcfdbf,
];
const PLASMA: [u32; 10] = [
    0x0d0887, 0x46039f, 0x7201a8, 0x9c179e, 0xbd3786, 0xd8576b, 0xed7953, 0xfb9f3a, 0xfdca26,
    0xf0f921,
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    #[default]
    Viridis,
    Inferno,
    Magma,
    Plasma,
}

impl Palette {
    pub const ALL: [Palette; 4] = [
        Palette::Viridis,
        Palette::Inferno,
        Palette::Magma,
        Palette::Plasma,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Palette::Viridis => "viridis",
            Palette::Inferno => "inferno",
            Palette::Magma => "magma",
            Palette::Plasma => "plasma",
        }
    }

    fn stops(self) -> &'static [u32; 10] {
        match self {
            Palette::Viridis => &VIRIDIS,
            Palette::Inferno => &INFERNO,
            Palette::Magma => &MAGMA,
            Palette::Plasma => &PLASMA,
        }
    }

    /// Colour for a score in percent. The palette runs reversed, so 0 % maps
    /// to the light end and 100 % to the dark end, in 100 discrete steps.
    pub fn color_for(self, score: f64) -> String {
        let step = ((score / 100.0) * STEPS as f64).floor();
        let step = step.clamp(0.0, (STEPS - 1) as f64) as usize;
        let position = 1.0 - step as f64 / (STEPS - 1) as f64;
        self.sample(position)
    }

    fn sample(self, position: f64) -> String {
        let stops = self.stops();
        let scaled = position.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
        let lower = scaled.floor() as usize;
        let upper = (lower + 1).min(stops.len() - 1);
        let frac = scaled - lower as f64;
        let mix = |shift: u32| {
            let a = ((stops[lower] >> shift) & 0xff) as f64;
            let b = ((stops[upper] >> shift) & 0xff) as f64;
            (a + (b - a) * frac).round() as u8
        };
        format!("#{:02x}{:02x}{:02x}", mix(16), mix(8), mix(0))
    }
}

impl FromStr for Palette {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_lowercase();
        if let Ok(index) = value.parse::<usize>() {
            return Self::from_index(index).ok_or(SimError::UnknownPalette(value));
        }
        Self::ALL
            .into_iter()
            .find(|p| p.label() == value)
            .ok_or(SimError::UnknownPalette(value))
    }
}

/// Standalone SVG heatmap of a pairwise table. Columns follow `files`, rows
/// run in reverse so the first document sits on top. Each cell carries a
/// `<title>` tooltip with the score and the pair.
pub fn render_svg(files: &[String], table: &PairwiseTable, palette: Palette) -> String {
    let n = files.len().max(1);
    let cell = (MAX_GRID_PX / n as f64).clamp(12.0, 60.0);
    let grid = cell * n as f64;
    let longest = files.iter().map(|f| f.chars().count()).max().unwrap_or(0) as f64;
    let label_px = (longest * LABEL_CHAR_PX + 12.0).min(240.0);
    let left = label_px;
    let top = label_px * 0.9;
    let bar_x = left + grid + 30.0;
    let width = bar_x + BAR_WIDTH + 50.0;
    let height = top + grid + 30.0;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}" font-family="sans-serif">"#
    );
    let _ = writeln!(svg, "<title>Similarity Heatmap</title>");

    let positions: HashMap<&str, usize> = files
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();
    let _ = writeln!(svg, r##"<g stroke="#ffffff" stroke-width="1">"##);
    for row in table.iter() {
        let (Some(&col), Some(&line)) = (
            positions.get(row.a.as_str()),
            positions.get(row.b.as_str()),
        ) else {
            continue;
        };
        let x = left + col as f64 * cell;
        let y = top + (n - 1 - line) as f64 * cell;
        let _ = writeln!(
            svg,
            r#"<rect x="{x:.2}" y="{y:.2}" width="{cell:.2}" height="{cell:.2}" fill="{}"><title>score: {}%&#10;{} &amp; {}</title></rect>"#,
            palette.color_for(row.score),
            row.score,
            escape(&row.a),
            escape(&row.b),
        );
    }
    let _ = writeln!(svg, "</g>");

    let _ = writeln!(svg, r##"<g font-size="8pt" fill="#333333">"##);
    for (idx, name) in files.iter().enumerate() {
        let cx = left + (idx as f64 + 0.5) * cell;
        let _ = writeln!(
            svg,
            r#"<text x="{cx:.2}" y="{:.2}" transform="rotate(-60 {cx:.2} {:.2})">{}</text>"#,
            top - 4.0,
            top - 4.0,
            escape(name),
        );
        let cy = top + (n - 1 - idx) as f64 * cell + cell * 0.5;
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{cy:.2}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            left - 4.0,
            escape(name),
        );
    }
    let _ = writeln!(svg, "</g>");

    let slice = grid / STEPS as f64;
    let _ = writeln!(svg, r#"<g shape-rendering="crispEdges">"#);
    for step in 0..STEPS {
        let score = step as f64;
        let y = top + grid - (step + 1) as f64 * slice;
        let _ = writeln!(
            svg,
            r#"<rect x="{bar_x:.2}" y="{y:.2}" width="{BAR_WIDTH:.0}" height="{:.2}" fill="{}"/>"#,
            slice + 0.5,
            palette.color_for(score),
        );
    }
    let _ = writeln!(svg, "</g>");
    let _ = writeln!(svg, r##"<g font-size="10pt" fill="#333333">"##);
    for tick in (0..=100).step_by(20) {
        let y = top + grid - grid * tick as f64 / 100.0;
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{y:.2}" dominant-baseline="middle">{tick}%</text>"#,
            bar_x + BAR_WIDTH + 10.0,
        );
    }
    let _ = writeln!(svg, "</g>");
    svg.push_str("</svg>\n");
    svg
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabulate::PairScore;

    fn table(files: &[&str], scores: &[f64]) -> (Vec<String>, PairwiseTable) {
        let names: Vec<String> = files.iter().map(|s| s.to_string()).collect();
        let mut rows = Vec::new();
        let mut k = 0;
        for a in &names {
            for b in &names {
                rows.push(PairScore {
                    a: a.clone(),
                    b: b.clone(),
                    score: scores[k],
                });
                k += 1;
            }
        }
        (names, PairwiseTable { rows })
    }

    #[test]
    fn palette_lookup() {
        assert_eq!(Palette::from_index(0), Some(Palette::Viridis));
        assert_eq!(Palette::from_index(3), Some(Palette::Plasma));
        assert_eq!(Palette::from_index(4), None);
        assert_eq!("magma".parse::<Palette>().unwrap(), Palette::Magma);
        assert_eq!("1".parse::<Palette>().unwrap(), Palette::Inferno);
        assert!("jet".parse::<Palette>().is_err());
    }

    #[test]
    fn palette_runs_reversed() {
        assert_eq!(Palette::Viridis.color_for(100.0), "#440154");
        assert_eq!(Palette::Viridis.color_for(0.0), "#fde725");
        assert_eq!(Palette::Inferno.color_for(150.0), "#000004");
        assert_eq!(Palette::Magma.color_for(-3.0), "#fcfdbf");
    }

    #[test]
    fn one_cell_per_row() {
        let (files, table) = table(&["a.txt", "b.txt"], &[100.0, 40.5, 40.5, 100.0]);
        let svg = render_svg(&files, &table, Palette::Plasma);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<title>score: ").count(), 4);
        assert!(svg.contains("score: 40.5%&#10;a.txt &amp; b.txt"));
        assert!(svg.contains(">100%</text>"));
    }

    #[test]
    fn cells_are_placed_by_file_position() {
        let files = vec!["a".to_string(), "b".to_string()];
        let table = PairwiseTable {
            rows: vec![
                PairScore {
                    a: "b".into(),
                    b: "a".into(),
                    score: 50.0,
                },
                PairScore {
                    a: "x".into(),
                    b: "a".into(),
                    score: 10.0,
                },
            ],
        };
        let svg = render_svg(&files, &table, Palette::Viridis);
        assert_eq!(svg.matches("<title>score: ").count(), 1);
        assert!(svg.contains(r#"<rect x="78.00" y="76.20" width="60.00""#));
    }

    #[test]
    fn labels_are_escaped() {
        let (files, table) = table(&["<r&d>.txt"], &[100.0]);
        let svg = render_svg(&files, &table, Palette::Viridis);
        assert!(svg.contains("&lt;r&amp;d&gt;.txt"));
        assert!(!svg.contains("<r&d>"));
    }
}
