//! Splitting a page into per-record fragment groups
//!
//! A page holds one to three records, each starting on the row of its
//! "Application No" label. Every fragment from the top of that row down to
//! the top of the next record's row belongs to the record.

use crate::extractor::TextFragment;
use crate::geometry::{is_vertical_overlap, vertical_overlap_percentage, Rectangle};
use crate::labels::find_record_anchors;

/// Minimum vertical overlap (percent) for a fragment to count as part of an
/// anchor's row
const MIN_ROW_OVERLAP: f32 = 50.0;

/// The fragments of one record on a page
#[derive(Debug, Clone)]
pub struct RecordGroup {
    /// The "Application No" label fragment the record was found from
    pub start: TextFragment,
    /// Every fragment attributed to the record, in reading order
    pub fragments: Vec<TextFragment>,
}

impl RecordGroup {
    /// Compact `[text][text]...` rendering for diagnostics
    pub fn summary(&self) -> String {
        self.fragments
            .iter()
            .map(|f| format!("[{}]", f.text))
            .collect()
    }

    /// Whether any fragment's trimmed text is exactly `text`
    pub fn has_text(&self, text: &str) -> bool {
        self.fragments.iter().any(|f| f.text.trim() == text)
    }
}

/// Sort fragments top to bottom, then left to right
pub fn sort_reading_order(fragments: &mut [TextFragment]) {
    fragments.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
}

/// Topmost y of the fragments sharing a row with `anchor`.
///
/// Fragments overlapping less than half of their own height are ignored so
/// that very tall fragments cannot drag every row to the same top.
fn row_top(fragments: &[TextFragment], anchor: &Rectangle) -> f32 {
    fragments
        .iter()
        .map(TextFragment::bounds)
        .filter(|b| {
            is_vertical_overlap(anchor, b) && vertical_overlap_percentage(anchor, b) > MIN_ROW_OVERLAP
        })
        .map(|b| b.y)
        .fold(anchor.y, f32::min)
}

/// Partition a page's fragments into one group per record
pub fn segment_page(fragments: &[TextFragment]) -> Vec<RecordGroup> {
    let mut sorted = fragments.to_vec();
    sort_reading_order(&mut sorted);

    let anchors = find_record_anchors(&sorted);
    let row_tops: Vec<f32> = anchors
        .iter()
        .map(|anchor| {
            // Raised by half a line: a neighboring field can sit slightly
            // higher than the label itself
            let mut raised = anchor.bounds();
            raised.y -= raised.height / 2.0;
            row_top(&sorted, &raised)
        })
        .collect();

    anchors
        .iter()
        .enumerate()
        .map(|(index, anchor)| {
            let top = row_tops[index];
            let bottom = row_tops.get(index + 1).copied().unwrap_or(f32::MAX);
            RecordGroup {
                start: (*anchor).clone(),
                fragments: sorted
                    .iter()
                    .filter(|f| f.y >= top && f.y < bottom)
                    .cloned()
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, x: f32, y: f32) -> TextFragment {
        TextFragment::new(text, x, y, text.chars().count() as f32 * 6.0, 10.0)
    }

    #[test]
    fn test_page_without_anchor_has_no_groups() {
        let fragments = vec![frag("Development Register", 0.0, 0.0), frag("December 2018", 0.0, 20.0)];
        assert!(segment_page(&fragments).is_empty());
    }

    #[test]
    fn test_segments_two_records() {
        let fragments = vec![
            frag("Application No", 0.0, 200.0),
            frag("DA 2/2020", 100.0, 200.0),
            frag("Lodged", 300.0, 193.0),
            frag("Application No", 0.0, 100.0),
            frag("DA 1/2020", 100.0, 100.0),
            frag("Property Street", 0.0, 120.0),
            frag("Register", 0.0, 10.0),
        ];
        let groups = segment_page(&fragments);
        assert_eq!(groups.len(), 2);

        let first: Vec<&str> = groups[0].fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(first, ["Application No", "DA 1/2020", "Property Street"]);
        assert_eq!(groups[0].start.y, 100.0);

        // "Lodged" sits slightly above the label but shares its row
        let second: Vec<&str> = groups[1].fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(second, ["Lodged", "Application No", "DA 2/2020"]);
    }

    #[test]
    fn test_tall_fragment_does_not_move_row_top() {
        let fragments = vec![
            frag("Application No", 0.0, 100.0),
            TextFragment::new("|", 400.0, 0.0, 2.0, 400.0),
            frag("DA 1/2020", 100.0, 100.0),
        ];
        let groups = segment_page(&fragments);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].fragments.iter().all(|f| f.text != "|"));
    }

    #[test]
    fn test_label_reached_from_two_starts_gives_one_group() {
        let fragments = vec![
            frag("A:", 0.0, 100.0),
            frag("Application No", 20.0, 100.0),
            frag("DA 1/2020", 120.0, 100.0),
        ];
        let groups = segment_page(&fragments);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].fragments.len(), 3);
    }

    #[test]
    fn test_summary_and_has_text() {
        let group = RecordGroup {
            start: frag("Application No", 0.0, 0.0),
            fragments: vec![frag("Application No", 0.0, 0.0), frag(" Application Received ", 0.0, 20.0)],
        };
        assert_eq!(group.summary(), "[Application No][ Application Received ]");
        assert!(group.has_text("Application Received"));
        assert!(!group.has_text("Application received"));
    }
}
