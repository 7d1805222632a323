//! Rectangle UI primitive element.

use crate::engine_state::rendering::vertex::UiQuadInstance;

/// A flat-coloured rectangle positioned in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiRectangle {
    /// Position of the rectangle center in normalized device coordinates (-1 to 1)
    pub position: (f32, f32),
    /// Size of the rectangle in normalized device coordinates (0 to 2)
    pub size: (f32, f32),
    /// RGBA colour
    pub color: [f32; 4],
}

impl UiRectangle {
    /// Creates a new rectangle.
    ///
    /// # Arguments
    /// * `position` - Center of the rectangle in normalized device coordinates
    /// * `size` - Width and height in normalized device coordinates
    /// * `color` - RGBA colour
    pub fn new(position: (f32, f32), size: (f32, f32), color: [f32; 4]) -> Self {
        Self {
            position,
            size,
            color,
        }
    }

    /// Creates a rectangle centered on screen with the specified relative size.
    ///
    /// # Arguments
    /// * `relative_size` - Size as a fraction of the screen (0.0 to 1.0)
    /// * `color` - RGBA colour
    pub fn centered(relative_size: (f32, f32), color: [f32; 4]) -> Self {
        Self::new((0.0, 0.0), (relative_size.0 * 2.0, relative_size.1 * 2.0), color)
    }

    /// The GPU instance drawing this rectangle.
    pub fn instance(&self) -> UiQuadInstance {
        UiQuadInstance {
            min: [
                self.position.0 - self.size.0 / 2.0,
                self.position.1 - self.size.1 / 2.0,
            ],
            size: [self.size.0, self.size.1],
            color: self.color,
        }
    }
}
