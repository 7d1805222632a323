//! UI rendering system for the voxel engine.
//!
//! The HUD is a fixed set of flat rectangles drawn over the world: a crosshair in the
//! middle of the screen, a row of inventory cells along the bottom and a row of hearts
//! above them. Sizes are given in screen heights and divided by the aspect ratio
//! horizontally, so squares stay square at any window shape.

mod rectangle;

pub use rectangle::UiRectangle;

/// Number of inventory cells.
pub const INVENTORY_CELLS: usize = 8;
/// Number of hearts.
pub const HEARTS: usize = 8;

const CROSSHAIR_LENGTH: f32 = 0.06;
const CROSSHAIR_THICKNESS: f32 = 0.008;
const CELL_SIZE: f32 = 0.14;
const CELL_GAP: f32 = 0.015;
const CELL_BOTTOM: f32 = -0.97;
const HEART_SIZE: f32 = 0.05;
const HEART_GAP: f32 = 0.01;
const MAX_ROW_WIDTH: f32 = 1.9;

const CROSSHAIR_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
const CELL_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 0.6];
const HEART_COLOR: [f32; 4] = [0.85, 0.1, 0.15, 1.0];

/// Lays out the HUD for a window of the given aspect ratio (width / height).
///
/// # Returns
/// Crosshair bars first, then the inventory cells left to right, then the hearts
pub fn hud_layout(aspect: f32) -> Vec<UiRectangle> {
    let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
    let mut rectangles = Vec::with_capacity(2 + INVENTORY_CELLS + HEARTS);

    rectangles.push(UiRectangle::new(
        (0.0, 0.0),
        (CROSSHAIR_LENGTH / aspect, CROSSHAIR_THICKNESS),
        CROSSHAIR_COLOR,
    ));
    rectangles.push(UiRectangle::new(
        (0.0, 0.0),
        (CROSSHAIR_THICKNESS / aspect, CROSSHAIR_LENGTH),
        CROSSHAIR_COLOR,
    ));

    // Narrow windows shrink the rows so they still fit across the screen.
    let row_span = (CELL_SIZE + CELL_GAP) * INVENTORY_CELLS as f32 - CELL_GAP;
    let fit = (MAX_ROW_WIDTH * aspect / row_span).min(1.0);
    let cell_size = CELL_SIZE * fit;
    let cell_gap = CELL_GAP * fit;

    let cell_width = cell_size / aspect;
    let cell_step = (cell_size + cell_gap) / aspect;
    let row_left = -(row_span * fit / aspect) / 2.0;
    let cell_center_y = CELL_BOTTOM + cell_size / 2.0;

    for cell in 0..INVENTORY_CELLS {
        let x = row_left + cell_step * cell as f32 + cell_width / 2.0;
        rectangles.push(UiRectangle::new(
            (x, cell_center_y),
            (cell_width, cell_size),
            CELL_COLOR,
        ));
    }

    let heart_size = HEART_SIZE * fit;
    let heart_width = heart_size / aspect;
    let heart_step = (heart_size + HEART_GAP * fit) / aspect;
    let heart_center_y = CELL_BOTTOM + cell_size + cell_gap + heart_size / 2.0;

    for heart in 0..HEARTS {
        let x = row_left + heart_step * heart as f32 + heart_width / 2.0;
        rectangles.push(UiRectangle::new(
            (x, heart_center_y),
            (heart_width, heart_size),
            HEART_COLOR,
        ));
    }

    rectangles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_element_counts() {
        let hud = hud_layout(16.0 / 9.0);
        assert_eq!(hud.len(), 2 + INVENTORY_CELLS + HEARTS);
        assert!(hud[..2].iter().all(|bar| bar.position == (0.0, 0.0)));
    }

    #[test]
    fn test_hud_stays_on_screen() {
        for aspect in [0.5, 1.0, 16.0 / 9.0, 3.0] {
            for rectangle in hud_layout(aspect) {
                let quad = rectangle.instance();
                assert!(quad.min[0] >= -1.0 && quad.min[0] + quad.size[0] <= 1.0);
                assert!(quad.min[1] >= -1.0 && quad.min[1] + quad.size[1] <= 1.0);
            }
        }
    }

    #[test]
    fn test_bad_aspect_falls_back_to_square() {
        assert_eq!(hud_layout(0.0), hud_layout(1.0));
    }
}
