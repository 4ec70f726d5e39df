//! Label location
//!
//! Field labels are printed as several separate fragments ("Application",
//! "No") and are often misread ("N0"). A label is found by starting at
//! every fragment that begins with the right character, reading up to five
//! fragments to the right, and scoring the concatenation against the
//! target with edit distance.

use crate::extractor::TextFragment;
use crate::fuzzy;
use crate::geometry::{distance_squared, is_vertical_overlap, vertical_overlap_percentage};

/// Maximum number of fragments joined when reading a label
const MAX_CHAIN_LENGTH: usize = 5;

/// Largest horizontal gap between consecutive fragments of one label
const MAX_NEIGHBOR_GAP: f32 = 30.0;

/// Minimum vertical overlap (percent) for two fragments to share a line
const MIN_ROW_OVERLAP: f32 = 50.0;

/// Accepted difference between label length and joined text length
const LENGTH_TOLERANCE: usize = 2;

/// Worst edit distance accepted for a label
const MAX_THRESHOLD: usize = 2;

const ANCHOR_TEXT: &str = "applicationno";
const ANCHOR_MIN_LENGTH: usize = 13;
const ANCHOR_MAX_LENGTH: usize = 16;

/// Common misreadings of "no" in the "Application No" anchor
const ANCHOR_MISREADINGS: [&str; 6] = ["n0", "n°", "\"o", "\"0", "\"°", "“°"];

/// Which end of a matched label to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelEdge {
    /// The first fragment of the label
    Leftmost,
    /// The last fragment of the label
    Rightmost,
}

/// A candidate reading of a label
#[derive(Debug, Clone)]
pub struct LabelMatch<'a> {
    /// First fragment of the chain
    pub element: &'a TextFragment,
    /// Last fragment of the chain
    pub rightmost_element: &'a TextFragment,
    /// Normalized text read so far
    pub text: String,
    /// Edit distance from the target (0, 1 or 2)
    pub threshold: usize,
}

/// Strip whitespace, commas, hyphens and underscores; lowercase the rest
pub fn condense(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find the nearest fragment that continues `origin` on the same line.
///
/// Candidates must overlap `origin` vertically by more than half their own
/// height, start strictly right of its right edge and be less than 30
/// units away from it.
pub fn right_neighbor<'a>(fragments: &'a [TextFragment], origin: &TextFragment) -> Option<&'a TextFragment> {
    let origin_bounds = origin.bounds();
    let mut closest: Option<(&TextFragment, f32)> = None;

    for candidate in fragments {
        let bounds = candidate.bounds();
        if !is_vertical_overlap(&origin_bounds, &bounds)
            || vertical_overlap_percentage(&origin_bounds, &bounds) <= MIN_ROW_OVERLAP
        {
            continue;
        }
        if candidate.x <= origin.right() || candidate.x - origin.right() >= MAX_NEIGHBOR_GAP {
            continue;
        }
        let distance = distance_squared(&origin_bounds, &bounds);
        if closest.map_or(true, |(_, best)| distance < best) {
            closest = Some((candidate, distance));
        }
    }

    closest.map(|(fragment, _)| fragment)
}

/// Lazily walks rightward neighbors from a start fragment, yielding each
/// growing chain until [`MAX_CHAIN_LENGTH`] fragments have been read.
struct Chain<'a> {
    fragments: &'a [TextFragment],
    next: Option<&'a TextFragment>,
    chain: Vec<&'a TextFragment>,
}

impl<'a> Chain<'a> {
    fn new(fragments: &'a [TextFragment], start: &'a TextFragment) -> Self {
        Self {
            fragments,
            next: Some(start),
            chain: Vec::with_capacity(MAX_CHAIN_LENGTH),
        }
    }
}

impl<'a> Iterator for Chain<'a> {
    type Item = (&'a TextFragment, &'a TextFragment, String);

    fn next(&mut self) -> Option<Self::Item> {
        if self.chain.len() >= MAX_CHAIN_LENGTH {
            return None;
        }
        let current = self.next.take()?;
        self.chain.push(current);
        self.next = right_neighbor(self.fragments, current);
        let joined: String = self.chain.iter().map(|f| f.text.as_str()).collect();
        Some((self.chain[0], current, joined))
    }
}

fn starts_with_char(fragment: &TextFragment, first: char) -> bool {
    fragment.text.trim().to_lowercase().starts_with(first)
}

/// Edit distance of `text` from `target`, if within [`MAX_THRESHOLD`]
fn score(text: &str, target: &str) -> Option<usize> {
    if text == target {
        return Some(0);
    }
    fuzzy::closest_match(text, [target], MAX_THRESHOLD).map(|(_, distance)| distance)
}

/// Pick the lowest threshold, then the text length closest to the target.
/// Earlier matches win exact ties.
fn best_match<'a>(matches: Vec<LabelMatch<'a>>, target_len: usize) -> Option<LabelMatch<'a>> {
    matches.into_iter().reduce(|best, current| {
        let best_key = (best.threshold, best.text.chars().count().abs_diff(target_len));
        let current_key = (current.threshold, current.text.chars().count().abs_diff(target_len));
        if current_key < best_key {
            current
        } else {
            best
        }
    })
}

/// Find the best reading of `target` among the fragments
pub fn find_label_match<'a>(fragments: &'a [TextFragment], target: &str) -> Option<LabelMatch<'a>> {
    let condensed = condense(target);
    let first = condensed.chars().next()?;
    let target_len = target.chars().count();
    let mut matches = Vec::new();

    for start in fragments.iter().filter(|f| starts_with_char(f, first)) {
        for (element, rightmost_element, joined) in Chain::new(fragments, start) {
            let text = condense(&joined);
            let len = text.chars().count();
            if len > target_len + LENGTH_TOLERANCE {
                break;
            }
            if len + LENGTH_TOLERANCE < target_len {
                continue;
            }
            if let Some(threshold) = score(&text, &condensed) {
                matches.push(LabelMatch {
                    element,
                    rightmost_element,
                    text,
                    threshold,
                });
            }
        }
    }

    best_match(matches, condensed.chars().count())
}

/// Find the fragment where `target` starts or ends
pub fn find_label<'a>(
    fragments: &'a [TextFragment],
    target: &str,
    edge: LabelEdge,
) -> Option<&'a TextFragment> {
    find_label_match(fragments, target).map(|m| match edge {
        LabelEdge::Leftmost => m.element,
        LabelEdge::Rightmost => m.rightmost_element,
    })
}

fn condense_anchor(text: &str) -> String {
    ANCHOR_MISREADINGS
        .iter()
        .fold(condense(text), |text, misreading| text.replace(misreading, "no"))
}

/// Find every "Application No" label on a page, sorted top to bottom.
///
/// Each result is the rightmost fragment of the label.
pub fn find_record_anchors(fragments: &[TextFragment]) -> Vec<&TextFragment> {
    let mut anchors: Vec<&TextFragment> = Vec::new();

    for start in fragments.iter().filter(|f| starts_with_char(f, 'a')) {
        let mut matches = Vec::new();
        for (element, rightmost_element, joined) in Chain::new(fragments, start) {
            let text = condense_anchor(&joined);
            let len = text.chars().count();
            if len >= ANCHOR_MAX_LENGTH {
                break;
            }
            if len < ANCHOR_MIN_LENGTH {
                continue;
            }
            if let Some(threshold) = score(&text, ANCHOR_TEXT) {
                matches.push(LabelMatch {
                    element,
                    rightmost_element,
                    text,
                    threshold,
                });
            }
        }
        if let Some(best) = best_match(matches, ANCHOR_TEXT.len()) {
            // Chains from different starts can end on the same label
            if !anchors.iter().any(|a| std::ptr::eq(*a, best.rightmost_element)) {
                anchors.push(best.rightmost_element);
            }
        }
    }

    anchors.sort_by(|a, b| a.y.total_cmp(&b.y));
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, x, y, text.chars().count() as f32 * 6.0, 10.0)
    }

    #[test]
    fn test_condense() {
        assert_eq!(condense(" Property House-No, _x"), "propertyhousenox");
    }

    #[test]
    fn test_right_neighbor_picks_closest() {
        let fragments = vec![frag("Property", 0.0, 0.0), frag("Street", 60.0, 0.0), frag("Far", 100.0, 0.0)];
        let found = right_neighbor(&fragments, &fragments[0]);
        assert_eq!(found.map(|f| f.text.as_str()), Some("Street"));
    }

    #[test]
    fn test_right_neighbor_rejects_large_gap() {
        let fragments = vec![frag("Lot", 0.0, 0.0), frag("12", 60.0, 0.0)];
        assert!(right_neighbor(&fragments, &fragments[0]).is_none());
    }

    #[test]
    fn test_right_neighbor_rejects_other_rows_and_left() {
        let fragments = vec![
            frag("Lot", 50.0, 0.0),
            frag("below", 75.0, 20.0),
            frag("left", 0.0, 0.0),
            // Tall fragment: overlaps the row but mostly lies outside it
            TextFragment::new("tall", 75.0, -40.0, 10.0, 100.0),
        ];
        assert!(right_neighbor(&fragments, &fragments[0]).is_none());
    }

    #[test]
    fn test_right_neighbor_is_directional() {
        let fragments = vec![frag("Application", 0.0, 0.0), frag("No", 70.0, 0.0)];
        let right = right_neighbor(&fragments, &fragments[0]);
        assert_eq!(right, Some(&fragments[1]));
        assert!(right_neighbor(&fragments, &fragments[1]).is_none());
    }

    #[test]
    fn test_find_label_across_fragments() {
        let fragments = vec![
            frag("Property", 0.0, 0.0),
            frag("House", 52.0, 0.0),
            frag("No", 86.0, 0.0),
            frag("12", 120.0, 0.0),
        ];
        let left = find_label(&fragments, "Property House No", LabelEdge::Leftmost);
        let right = find_label(&fragments, "Property House No", LabelEdge::Rightmost);
        assert_eq!(left.map(|f| f.text.as_str()), Some("Property"));
        assert_eq!(right.map(|f| f.text.as_str()), Some("No"));
    }

    #[test]
    fn test_find_label_tolerates_misreading() {
        let fragments = vec![frag("Applicati0n", 0.0, 0.0), frag("N0", 70.0, 0.0)];
        let found = find_label_match(&fragments, "Application No").expect("label");
        assert_eq!(found.threshold, 2);
        assert_eq!(found.rightmost_element.text, "N0");
    }

    #[test]
    fn test_find_label_prefers_exact_match() {
        let fragments = vec![
            frag("Lodgment", 0.0, 0.0),
            frag("Lodgement", 0.0, 40.0),
            frag("Lodgemant", 0.0, 80.0),
        ];
        let found = find_label_match(&fragments, "Lodgement").expect("label");
        assert_eq!(found.threshold, 0);
        assert_eq!(found.element.y, 40.0);
    }

    #[test]
    fn test_find_label_missing() {
        let fragments = vec![frag("Title", 0.0, 0.0), frag("Lot", 0.0, 20.0)];
        assert!(find_label(&fragments, "Property Street", LabelEdge::Leftmost).is_none());
        assert!(find_label(&fragments, "", LabelEdge::Leftmost).is_none());
    }

    #[test]
    fn test_find_record_anchors_sorted_and_misread() {
        let fragments = vec![
            frag("Application", 0.0, 300.0),
            frag("N°", 70.0, 300.0),
            frag("Application", 0.0, 100.0),
            frag("No", 70.0, 100.0),
            frag("Applicants Name", 0.0, 140.0),
        ];
        let anchors = find_record_anchors(&fragments);
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors[0].y, 100.0);
        assert_eq!(anchors[0].text, "No");
        assert_eq!(anchors[1].y, 300.0);
        assert_eq!(anchors[1].text, "N°");
    }

    #[test]
    fn test_find_record_anchors_one_per_label() {
        // "A:" chains into the label and ends on the same fragment
        let fragments = vec![frag("A:", 0.0, 0.0), frag("Application No", 20.0, 0.0)];
        let anchors = find_record_anchors(&fragments);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].text, "Application No");
    }
}
