//! Projection of page boundaries into pixel-space spacers for a continuous
//! scroll surface.
//!
//! A host rendering the document as one tall column inserts these spacers so
//! each page's first block lands at the top of that page's content area.
//! Pure function over the model and layout parameters.

use crate::model::PaginationModel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacerParams {
    /// Visual gap between page cards, pixels.
    pub page_gap_px: f32,
    /// Leading offset above the first page, pixels.
    pub top_margin_px: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacer {
    /// Document position the spacer precedes.
    pub at_pos: usize,
    pub height_px: f32,
    /// Page above the spacer; 0 for the leading spacer.
    pub page_number_before: u32,
}

/// One spacer before the first page, then one per page transition sized to
/// the previous page's unused content height plus the gap.
pub fn build_spacers(
    model: &PaginationModel,
    pixels_per_point: f32,
    params: &SpacerParams,
) -> Vec<Spacer> {
    let mut spacers = Vec::new();
    let Some(first) = model.pages.first() else {
        return spacers;
    };
    if params.top_margin_px > 0.0 {
        spacers.push(Spacer {
            at_pos: first.start_pos,
            height_px: params.top_margin_px,
            page_number_before: 0,
        });
    }
    for pair in model.pages.windows(2) {
        let unused_pt = (model.dimensions.content_height - pair[0].content_height).max(0.0);
        spacers.push(Spacer {
            at_pos: pair[1].start_pos,
            height_px: unused_pt * pixels_per_point + params.page_gap_px,
            page_number_before: pair[0].page_number,
        });
    }
    spacers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageBoundary, PaginationModel};
    use quire_types::{Margins, Orientation, PageDimensions, PageSize};

    fn model(content_heights: &[f32]) -> PaginationModel {
        let dimensions = PageDimensions::compute(
            PageSize::A4,
            Orientation::Portrait,
            &Margins::all(72.0),
            0.0,
            0.0,
        )
        .unwrap();
        let pages = content_heights
            .iter()
            .enumerate()
            .map(|(index, &content_height)| PageBoundary {
                page_number: index as u32 + 1,
                start_pos: index * 100,
                end_pos: (index + 1) * 100,
                content_height,
                forced_break: false,
                node_positions: Vec::new(),
            })
            .collect();
        PaginationModel {
            pages,
            dimensions,
            total_content_height: content_heights.iter().sum(),
        }
    }

    #[test]
    fn empty_model_has_no_spacers() {
        let params = SpacerParams {
            page_gap_px: 10.0,
            top_margin_px: 20.0,
        };
        assert!(build_spacers(&model(&[]), 1.0, &params).is_empty());
    }

    #[test]
    fn single_page_gets_only_the_leading_spacer() {
        let spacers = build_spacers(
            &model(&[500.0]),
            1.0,
            &SpacerParams {
                page_gap_px: 24.0,
                top_margin_px: 40.0,
            },
        );
        assert_eq!(spacers.len(), 1);
        assert_eq!(spacers[0].page_number_before, 0);
        assert_eq!(spacers[0].height_px, 40.0);
    }

    #[test]
    fn transitions_absorb_unused_page_space() {
        let spacers = build_spacers(
            &model(&[600.0, 300.0]),
            96.0 / 72.0,
            &SpacerParams {
                page_gap_px: 24.0,
                top_margin_px: 0.0,
            },
        );
        assert_eq!(spacers.len(), 1);
        let spacer = &spacers[0];
        assert_eq!(spacer.page_number_before, 1);
        assert_eq!(spacer.at_pos, 100);
        let unused = 697.89 - 600.0;
        assert!((spacer.height_px - (unused * 96.0 / 72.0 + 24.0)).abs() < 0.01);
    }

    #[test]
    fn overfull_pages_still_get_the_bare_gap() {
        let spacers = build_spacers(
            &model(&[900.0, 100.0]),
            1.0,
            &SpacerParams {
                page_gap_px: 24.0,
                top_margin_px: 0.0,
            },
        );
        assert_eq!(spacers[0].height_px, 24.0);
    }
}
