//! Field text extraction from label-delimited regions
//!
//! A field's value is whatever text lies in the rectangle that starts at
//! its label and runs to the labels bounding it on the right and below.

use crate::extractor::TextFragment;
use crate::geometry::{intersect, Rectangle};
use crate::labels::{find_label, LabelEdge};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\s+").unwrap());

/// Collapse runs of two or more whitespace characters into one space
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN_RE.replace_all(text, " ").into_owned()
}

/// Text to the right of `top_left_label`, bounded by the left edge of
/// `right_label` and the top of `bottom_label` when those are found.
pub fn text_to_right_of(
    fragments: &[TextFragment],
    top_left_label: &str,
    right_label: Option<&str>,
    bottom_label: Option<&str>,
) -> Option<String> {
    let label = find_label(fragments, top_left_label, LabelEdge::Rightmost)?;
    let bounds = bounded_region(fragments, label.right(), label.y, right_label, bottom_label);
    text_within(fragments, &bounds)
}

/// Text below `top_label`, starting at its left edge, bounded by the left
/// edge of `right_label` and the top of `bottom_label` when those are
/// found.
pub fn text_below(
    fragments: &[TextFragment],
    top_label: &str,
    right_label: Option<&str>,
    bottom_label: Option<&str>,
) -> Option<String> {
    let label = find_label(fragments, top_label, LabelEdge::Rightmost)?;
    let bounds = bounded_region(fragments, label.x, label.y + label.height, right_label, bottom_label);
    text_within(fragments, &bounds)
}

fn bounded_region(
    fragments: &[TextFragment],
    x: f32,
    y: f32,
    right_label: Option<&str>,
    bottom_label: Option<&str>,
) -> Rectangle {
    let right = right_label.and_then(|text| find_label(fragments, text, LabelEdge::Leftmost));
    let bottom = bottom_label.and_then(|text| find_label(fragments, text, LabelEdge::Leftmost));
    Rectangle::new(
        x,
        y,
        right.map_or(f32::MAX, |f| f.x - x),
        bottom.map_or(f32::MAX, |f| f.y - y),
    )
}

/// Join, in reading order, every fragment more than half inside `bounds`.
fn text_within(fragments: &[TextFragment], bounds: &Rectangle) -> Option<String> {
    let mut inside: Vec<&TextFragment> = fragments
        .iter()
        .filter(|f| f.text != ":")
        .filter(|f| {
            let area = f.bounds().area();
            area > 0.0 && intersect(&f.bounds(), bounds).area() * 2.0 > area
        })
        .collect();

    if inside.is_empty() {
        return None;
    }

    inside.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
    let joined = inside
        .iter()
        .map(|f| f.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    Some(collapse_whitespace(joined.trim()))
}
