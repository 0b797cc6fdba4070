use palette::Srgb;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use super::surface::PixelCanvas;

/// Shows a [`PixelCanvas`] in the terminal, two canvas rows per cell using
/// the upper half block (foreground = top, background = bottom).
pub struct CanvasView<'a> {
    canvas: &'a PixelCanvas,
}

impl<'a> CanvasView<'a> {
    pub fn new(canvas: &'a PixelCanvas) -> Self {
        Self { canvas }
    }
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let (width, height) = self.canvas.dimensions();
        let rows = area.height as u32 * 2;
        let cols = area.width as u32;

        for cell_y in 0..area.height {
            for cell_x in 0..area.width {
                let x0 = cell_x as u32 * width / cols;
                let x1 = ((cell_x as u32 + 1) * width / cols).max(x0 + 1);
                let top_row = cell_y as u32 * 2;
                let top = Self::average(
                    self.canvas,
                    x0,
                    x1,
                    top_row * height / rows,
                    (top_row + 1) * height / rows,
                );
                let bottom = Self::average(
                    self.canvas,
                    x0,
                    x1,
                    (top_row + 1) * height / rows,
                    (top_row + 2) * height / rows,
                );

                if let Some(cell) = buf.cell_mut((area.x + cell_x, area.y + cell_y)) {
                    cell.set_char('▀');
                    cell.set_style(Style::default().fg(top).bg(bottom));
                }
            }
        }
    }
}

impl CanvasView<'_> {
    /// Box-filters the canvas region `[x0, x1) x [y0, y1)`.
    fn average(canvas: &PixelCanvas, x0: u32, x1: u32, y0: u32, y1: u32) -> Color {
        let y1 = y1.max(y0 + 1);
        let (mut r, mut g, mut b, mut count) = (0u32, 0u32, 0u32, 0u32);
        for y in y0..y1 {
            for x in x0..x1 {
                if let Some(Srgb { red, green, blue, .. }) = canvas.pixel(x, y) {
                    r += red as u32;
                    g += green as u32;
                    b += blue as u32;
                    count += 1;
                }
            }
        }
        if count == 0 {
            return Color::Black;
        }
        Color::Rgb((r / count) as u8, (g / count) as u8, (b / count) as u8)
    }
}
