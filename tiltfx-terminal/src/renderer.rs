/// ASCII canvas that draws each layer as a projected outline
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Point3, Vector4};
use std::io::Write;
use tiltfx_core::LayerTransform;

/// Approximate pixel size of one terminal cell. Layer movement is
/// configured in pixels, so geometry is built in pixel space and mapped back.
pub const CELL_WIDTH: f64 = 8.0;
pub const CELL_HEIGHT: f64 = 16.0;

/// Fraction of the container covered by each layer's outline
const LAYER_SCALE: f64 = 0.6;

/// Glyph ramp for front layers, innermost first
pub const FRONT_GLYPHS: &[char] = &['+', '*', '#', '%', '@'];
pub const BACK_GLYPH: char = '.';

/// Character buffer the size of the container
pub struct Canvas {
    width: usize,
    height: usize,
    glyphs: Vec<char>,
    colors: Vec<Color>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            glyphs: vec![' '; size],
            colors: vec![Color::Reset; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.glyphs.fill(' ');
        self.colors.fill(Color::Reset);
    }

    pub fn glyph(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.glyphs[y * self.width + x])
    }

    /// Project a point given in pixels relative to the container center
    /// through `transform`. Returns cell coordinates, or `None` when the
    /// point falls behind the viewer.
    pub fn project(&self, transform: &LayerTransform, point: &Point3<f64>) -> Option<(f64, f64)> {
        let clip = transform.to_matrix() * Vector4::new(point.x, point.y, point.z, 1.0);

        // Prevent division by near-zero depth values
        if clip.w < 1e-6 {
            return None;
        }

        let x = clip.x / clip.w;
        let y = clip.y / clip.w;
        let center_x = self.width as f64 * CELL_WIDTH / 2.0;
        let center_y = self.height as f64 * CELL_HEIGHT / 2.0;

        Some(((x + center_x) / CELL_WIDTH, (y + center_y) / CELL_HEIGHT))
    }

    /// Draw one layer's outline, transformed about the container center.
    pub fn draw_layer(&mut self, transform: &LayerTransform, glyph: char, color: Color) {
        let half_w = self.width as f64 * CELL_WIDTH * LAYER_SCALE / 2.0;
        let half_h = self.height as f64 * CELL_HEIGHT * LAYER_SCALE / 2.0;
        let corners = [
            Point3::new(-half_w, -half_h, 0.0),
            Point3::new(half_w, -half_h, 0.0),
            Point3::new(half_w, half_h, 0.0),
            Point3::new(-half_w, half_h, 0.0),
        ];

        let mut projected = Vec::with_capacity(4);
        for corner in &corners {
            match self.project(transform, corner) {
                Some(p) => projected.push(p),
                None => return, // Layer is clipped
            }
        }

        for i in 0..projected.len() {
            let from = projected[i];
            let to = projected[(i + 1) % projected.len()];
            self.draw_line(from, to, glyph, color);
        }
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), glyph: char, color: Color) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            let x = (from.0 + dx * t).floor();
            let y = (from.1 + dy * t).floor();
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x < self.width && y < self.height {
                let idx = y * self.width + x;
                self.glyphs[idx] = glyph;
                self.colors[idx] = color;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.colors[idx]))?;
                writer.queue(Print(self.glyphs[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Color for a glyph, brighter towards the outermost layer
pub fn glyph_color(glyph: char) -> Color {
    match glyph {
        '.' => Color::DarkGrey,
        '+' | '*' => Color::Grey,
        '#' => Color::White,
        '%' | '@' => Color::Cyan,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_rest_projects_to_center() {
        let canvas = Canvas::new(80, 24);
        let (x, y) = canvas
            .project(&LayerTransform::rest(1500.0), &Point3::origin())
            .unwrap();
        assert!((x - 40.0).abs() < 1e-9);
        assert!((y - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_translation_moves_in_cells() {
        let canvas = Canvas::new(80, 24);
        let transform = LayerTransform {
            perspective: 0.0,
            translate: Vector3::new(16.0, 32.0, 0.0),
            rotate: Vector3::zeros(),
        };
        let (x, y) = canvas.project(&transform, &Point3::origin()).unwrap();
        assert!((x - 42.0).abs() < 1e-9);
        assert!((y - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_behind_viewer_is_clipped() {
        let canvas = Canvas::new(80, 24);
        let transform = LayerTransform {
            perspective: 100.0,
            translate: Vector3::new(0.0, 0.0, 200.0),
            rotate: Vector3::zeros(),
        };
        assert!(canvas.project(&transform, &Point3::origin()).is_none());
    }

    #[test]
    fn test_rest_outline_is_centered() {
        let mut canvas = Canvas::new(20, 10);
        canvas.draw_layer(&LayerTransform::rest(0.0), '#', Color::White);

        // 60% of 20x10 cells, centered: columns 4..=16, rows 2..=8
        assert_eq!(canvas.glyph(4, 2), Some('#'));
        assert_eq!(canvas.glyph(16, 8), Some('#'));
        assert_eq!(canvas.glyph(10, 2), Some('#'));
        assert_eq!(canvas.glyph(10, 5), Some(' '));
        assert_eq!(canvas.glyph(0, 0), Some(' '));

        canvas.clear();
        assert_eq!(canvas.glyph(4, 2), Some(' '));
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let canvas = Canvas::new(3, 2);
        let mut out = Vec::new();
        canvas.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\r\n"));
    }
}
