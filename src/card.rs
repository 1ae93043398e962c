//! card.rs
//!
//! Renders the love-time card as SVG: the chosen photo (or a default
//! background) cropped to 16:9 on top, then a dotted table of the elapsed
//! fields and the one-line summary underneath.

use crate::elapsed::ElapsedBreakdown;
use crate::image::ImageReference;
use crate::start_date::StartDate;

const START_Y: i32 = 30;
const LINE_HEIGHT: i32 = 20;
const LEFT_PADDING: f32 = 15.0;
const RIGHT_PADDING: f32 = 30.0;
const CHAR_WIDTH: f32 = 9.6;
const MIN_COL_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#161b22",
                text: "#c9d1d9",
                key: "#ff7b9c",
                value: "#a5d6ff",
                cc: "#616e7f",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                text: "#24292f",
                key: "#d6336c",
                value: "#0366d6",
                cc: "#6a737d",
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Splits a row into (key, dot leader, value) padded to `align_width`.
pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> (String, String, String) {
    let key_part = format!("{key}: ");
    let base_len = key_part.len() + value.len();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => ".".repeat(n),
    };

    (key_part, dots, value.to_string())
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.len()) + 2;
    format!("{base}{}", "-".repeat(dash_count))
}

fn since_label(start: &StartDate) -> String {
    format!(
        "{}-{:02}-{:02} {:02}:{:02}",
        start.year(),
        start.month(),
        start.day(),
        start.hour(),
        start.minute()
    )
}

fn capitalize(unit: &str) -> String {
    let mut chars = unit.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

enum Line {
    Header(String),
    Blank,
    Stat { k: String, d: String, v: String },
    Summary(String),
}

// Returns (tspans, width, height) of the text block.
fn build_text_block(start: &StartDate, elapsed: &ElapsedBreakdown) -> (String, f32, f32) {
    let since_value = since_label(start);
    let field_rows: Vec<(String, String)> = elapsed
        .fields()
        .iter()
        .map(|(unit, n)| (format!("{}s", capitalize(unit)), n.to_string()))
        .collect();
    let summary = format!("Love Time: {elapsed}");

    let align_width = field_rows
        .iter()
        .map(|(k, v)| k.len() + 2 + v.len())
        .chain(["Since".len() + 2 + since_value.len()])
        .max()
        .unwrap_or(0)
        .max(MIN_COL_CHARS);

    let mut lines = vec![Line::Header(build_header_line("love@time", align_width))];
    let (k, d, v) = build_stat_row("Since", &since_value, align_width);
    lines.push(Line::Stat { k, d, v });
    lines.push(Line::Blank);
    for (key, value) in &field_rows {
        let (k, d, v) = build_stat_row(key, value, align_width);
        lines.push(Line::Stat { k, d, v });
    }
    lines.push(Line::Blank);
    lines.push(Line::Summary(summary.clone()));

    let mut tspans = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = START_Y + (i as i32) * LINE_HEIGHT;

        match line {
            Line::Blank => {}
            Line::Header(text) => {
                tspans.push_str(&format!(
                    r#"<tspan x="{LEFT_PADDING}" y="{y}">{}</tspan>
"#,
                    escape_xml(text)
                ));
            }
            Line::Stat { k, d, v } => {
                tspans.push_str(&format!(
                    r#"<tspan x="{LEFT_PADDING}" y="{y}" class="cc">. </tspan>
<tspan class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value">{}</tspan>
"#,
                    escape_xml(k),
                    escape_xml(d),
                    escape_xml(v)
                ));
            }
            Line::Summary(text) => {
                tspans.push_str(&format!(
                    r#"<tspan x="{LEFT_PADDING}" y="{y}" class="key">{}</tspan>
"#,
                    escape_xml(text)
                ));
            }
        }
    }

    let widest = align_width.max(summary.len() + 2);
    let width = LEFT_PADDING + (widest as f32) * CHAR_WIDTH + RIGHT_PADDING;
    let height = lines.len() as f32 * LINE_HEIGHT as f32 + START_Y as f32;

    (tspans, width, height)
}

fn build_picture(image: Option<&ImageReference>, width: f32, height: f32, theme: Theme) -> String {
    let colors = theme.colors();
    match image {
        Some(image) => format!(
            r#"<clipPath id="photo"><rect width="{width}" height="{height}" rx="15"/></clipPath>
<image href="{}" width="{width}" height="{height}" preserveAspectRatio="xMidYMid slice" clip-path="url(#photo)"/>"#,
            escape_xml(image.as_str())
        ),
        None => format!(
            r#"<rect width="{width}" height="{height}" fill="{cc}" rx="15"/>
<text x="{cx}" y="{cy}" fill="{key}" font-size="96px" text-anchor="middle" dominant-baseline="middle">&#9829;</text>"#,
            cc = colors.cc,
            key = colors.key,
            cx = width / 2.0,
            cy = height / 2.0
        ),
    }
}

/// Renders the full card.
pub fn render_card(
    image: Option<&ImageReference>,
    start: &StartDate,
    elapsed: &ElapsedBreakdown,
    theme: Theme,
) -> String {
    let colors = theme.colors();

    let (text_tspans, w, text_h) = build_text_block(start, elapsed);
    let picture_h = w * 9.0 / 16.0;
    let h = picture_h + text_h;
    let picture = build_picture(image, w, picture_h, theme);

    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{w}px" height="{h}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="16px">

<style>
.key      {{ fill: {key}; }}
.value    {{ fill: {value}; }}
.cc       {{ fill: {cc}; }}
</style>

<rect width="{w}px" height="{h}px" fill="{bg}" rx="15"/>

<!-- PICTURE -->
{picture}

<!-- LOVE TIME -->
<text fill="{text}" xml:space="preserve" transform="translate(0 {picture_h})">
{text_tspans}
</text>

</svg>
"#,
        bg = colors.bg,
        text = colors.text,
        key = colors.key,
        value = colors.value,
        cc = colors.cc,
    )
}
