//! Drawing surface for the render loop.
//!
//! [`Surface`] is the small slice of a 2D canvas the visualizations need:
//! a background fill, stroked segments and filled circles, each with an
//! optional glow. [`PixelCanvas`] rasterizes into an RGB buffer.

use palette::{Srgb, Srgba};

use crate::colors::ThemeColor;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Ordered colour stops over `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient {
    stops: Vec<(f32, ThemeColor)>,
}

impl Gradient {
    pub fn new(stops: Vec<(f32, ThemeColor)>) -> Self {
        let mut stops = stops;
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { stops }
    }

    pub fn stops(&self) -> &[(f32, ThemeColor)] {
        &self.stops
    }

    pub fn color_at(&self, offset: f32) -> Srgba<f32> {
        let Some(&(first_offset, first)) = self.stops.first() else {
            return Srgba::new(0.0, 0.0, 0.0, 0.0);
        };
        if offset <= first_offset {
            return first.to_float();
        }
        for pair in self.stops.windows(2) {
            let (start, from) = pair[0];
            let (end, to) = pair[1];
            if offset <= end {
                let span = end - start;
                let factor = if span > 0.0 { (offset - start) / span } else { 1.0 };
                return from.mix(to, factor);
            }
        }
        self.stops[self.stops.len() - 1].1.to_float()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(ThemeColor),
    /// Gradient along the radius between two circles sharing `center`.
    Radial {
        center: Point,
        inner: f32,
        outer: f32,
        gradient: Gradient,
    },
    /// Gradient along the x axis.
    Linear { from_x: f32, to_x: f32, gradient: Gradient },
}

impl Paint {
    pub fn color_at(&self, point: Point) -> Srgba<f32> {
        match self {
            Paint::Solid(color) => color.to_float(),
            Paint::Radial {
                center,
                inner,
                outer,
                gradient,
            } => {
                let span = outer - inner;
                let offset = if span > 0.0 {
                    (point.distance(*center) - inner) / span
                } else {
                    1.0
                };
                gradient.color_at(offset)
            }
            Paint::Linear {
                from_x,
                to_x,
                gradient,
            } => {
                let span = to_x - from_x;
                let offset = if span != 0.0 {
                    (point.x - from_x) / span
                } else {
                    0.0
                };
                gradient.color_at(offset)
            }
        }
    }
}

/// Soft halo drawn under a shape, like a canvas shadow with zero offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glow {
    pub color: ThemeColor,
    pub blur: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f32,
    pub glow: Option<Glow>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
}

/// Upper bound of chords per flattened quadratic curve.
const QUAD_STEPS: usize = 8;
/// Target chord length when flattening, in surface units.
const QUAD_STEP_LENGTH: f32 = 2.0;
/// Raster points closer than this to the previous kept point are merged.
const MIN_SEGMENT_PX: f32 = 0.5;
/// Glow radius cap in raster pixels.
const MAX_GLOW_PX: f32 = 8.0;

pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn fill_background(&mut self, color: ThemeColor);
    fn stroke_segment(&mut self, from: Point, to: Point, stroke: &Stroke);
    fn fill_circle(&mut self, center: Point, radius: f32, paint: &Paint, glow: Option<Glow>);

    /// Strokes connected segments through `points` as one shape.
    fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], stroke);
        }
    }

    /// Strokes a path, flattening quadratic curves into chords. Each
    /// sub-path is handed to [`Surface::stroke_polyline`] in one piece.
    fn stroke_path(&mut self, path: &[PathSegment], stroke: &Stroke) {
        let mut polyline: Vec<Point> = Vec::new();
        for segment in path {
            match *segment {
                PathSegment::MoveTo(point) => {
                    if polyline.len() > 1 {
                        self.stroke_polyline(&polyline, stroke);
                    }
                    polyline.clear();
                    polyline.push(point);
                }
                PathSegment::LineTo(point) => polyline.push(point),
                PathSegment::QuadTo { control, to } => {
                    let Some(&from) = polyline.last() else {
                        polyline.push(to);
                        continue;
                    };
                    let steps = quad_steps(from, control, to);
                    polyline.extend((1..=steps).map(|step| {
                        quadratic_point(from, control, to, step as f32 / steps as f32)
                    }));
                }
            }
        }
        if polyline.len() > 1 {
            self.stroke_polyline(&polyline, stroke);
        }
    }
}

/// Chords needed for a curve, from the length of its control polygon.
fn quad_steps(from: Point, control: Point, to: Point) -> usize {
    let length = from.distance(control) + control.distance(to);
    ((length / QUAD_STEP_LENGTH).ceil() as usize).clamp(1, QUAD_STEPS)
}

fn quadratic_point(from: Point, control: Point, to: Point, t: f32) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
        u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
    )
}

fn distance_to_segment(point: Point, from: Point, to: Point) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return point.distance(from);
    }
    let t = (((point.x - from.x) * dx + (point.y - from.y) * dy) / length_sq).clamp(0.0, 1.0);
    point.distance(Point::new(from.x + t * dx, from.y + t * dy))
}

/// Fraction of the glow colour applied at `distance` past the shape edge.
fn glow_falloff(distance: f32, blur: f32) -> f32 {
    if blur <= 0.0 || distance >= blur {
        return 0.0;
    }
    let remaining = 1.0 - distance / blur;
    0.5 * remaining * remaining
}

type PixelBounds = (u32, u32, u32, u32);

/// RGB raster with source-over alpha blending.
///
/// Shapes are given in surface units (`surface_width` x `surface_height`)
/// and scaled onto however many pixels the raster has, so the same frame
/// can be drawn at the terminal's resolution.
pub struct PixelCanvas {
    width: u32,
    height: u32,
    surface_width: f32,
    surface_height: f32,
    scale_x: f32,
    scale_y: f32,
    pixels: Vec<Srgb<u8>>,
    distances: Vec<f32>,
    visits: u64,
}

impl PixelCanvas {
    /// Canvas whose surface units are its pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self::scaled(width as f32, height as f32, width, height)
    }

    pub fn scaled(surface_width: f32, surface_height: f32, width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width: 0,
            height: 0,
            surface_width,
            surface_height,
            scale_x: 1.0,
            scale_y: 1.0,
            pixels: Vec::new(),
            distances: Vec::new(),
            visits: 0,
        };
        canvas.resize(width, height);
        canvas
    }

    /// Changes the raster resolution and clears it to black. Surface units
    /// stay the same. Returns whether the size changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if !self.pixels.is_empty() && (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        self.scale_x = scale(width, self.surface_width);
        self.scale_y = scale(height, self.surface_height);
        self.pixels = vec![Srgb::new(0, 0, 0); (width * height) as usize];
        true
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Srgb<u8>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn pixels(&self) -> &[Srgb<u8>] {
        &self.pixels
    }

    /// Raster size in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixels examined since the last call.
    pub fn take_visits(&mut self) -> u64 {
        std::mem::take(&mut self.visits)
    }

    fn to_raster(&self, point: Point) -> Point {
        Point::new(point.x * self.scale_x, point.y * self.scale_y)
    }

    fn to_surface(&self, x: u32, y: u32) -> Point {
        Point::new(
            (x as f32 + 0.5) / self.scale_x,
            (y as f32 + 0.5) / self.scale_y,
        )
    }

    fn length_scale(&self) -> f32 {
        (self.scale_x + self.scale_y) / 2.0
    }

    fn raster_glow(&self, glow: Option<Glow>) -> Option<Glow> {
        glow.map(|glow| Glow {
            color: glow.color,
            blur: (glow.blur * self.length_scale()).min(MAX_GLOW_PX),
        })
    }

    /// Maps `points` to raster space, dropping points that would make
    /// sub-pixel segments. The last point is always kept.
    fn raster_spine(&self, points: &[Point]) -> Vec<Point> {
        let mut spine: Vec<Point> = Vec::with_capacity(points.len());
        for (i, &point) in points.iter().enumerate() {
            let point = self.to_raster(point);
            match spine.last() {
                Some(&last) if i + 1 < points.len() && last.distance(point) < MIN_SEGMENT_PX => {}
                _ => spine.push(point),
            }
        }
        spine
    }

    fn blend(&mut self, x: u32, y: u32, color: Srgba<f32>, coverage: f32) {
        let alpha = (color.alpha * coverage).clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let index = (y * self.width + x) as usize;
        let dst: Srgb<f32> = self.pixels[index].into_format();
        let mixed = Srgb::new(
            color.red * alpha + dst.red * (1.0 - alpha),
            color.green * alpha + dst.green * (1.0 - alpha),
            color.blue * alpha + dst.blue * (1.0 - alpha),
        );
        self.pixels[index] = mixed.into_format();
    }

    /// Pixel rows and columns touched by a shape extending `reach` around
    /// the given raster box, clipped to the canvas.
    fn bounds(&self, min: Point, max: Point, reach: f32) -> Option<PixelBounds> {
        let x0 = (min.x - reach).floor().max(0.0);
        let y0 = (min.y - reach).floor().max(0.0);
        let x1 = (max.x + reach).ceil().min(self.width as f32 - 1.0);
        let y1 = (max.y + reach).ceil().min(self.height as f32 - 1.0);
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Paints one pixel `d` raster pixels away from a shape's spine.
    fn shade(&mut self, x: u32, y: u32, d: f32, half_width: f32, paint: &Paint, glow: Option<Glow>) {
        let coverage = (half_width + 0.5 - d).clamp(0.0, 1.0);
        if let Some(glow) = glow {
            let halo = glow_falloff((d - half_width).max(0.0), glow.blur);
            if halo > 0.0 && coverage < 1.0 {
                self.blend(x, y, glow.color.to_float(), halo * (1.0 - coverage));
            }
        }
        if coverage > 0.0 {
            let color = paint.color_at(self.to_surface(x, y));
            self.blend(x, y, color, coverage);
        }
    }

    /// Single-pass rasterizer: `distance` measures how far a pixel centre is
    /// from the shape's spine, `half_width` is the solid part around it.
    fn rasterize<F>(
        &mut self,
        bounds: PixelBounds,
        half_width: f32,
        paint: &Paint,
        glow: Option<Glow>,
        distance: F,
    ) where
        F: Fn(Point) -> f32,
    {
        let (x0, y0, x1, y1) = bounds;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = distance(Point::new(x as f32 + 0.5, y as f32 + 0.5));
                self.shade(x, y, d, half_width, paint, glow);
            }
        }
        self.visits += area(bounds);
    }
}

fn scale(pixels: u32, units: f32) -> f32 {
    if units > 0.0 && pixels > 0 {
        pixels as f32 / units
    } else {
        1.0
    }
}

fn area((x0, y0, x1, y1): PixelBounds) -> u64 {
    (x1 - x0 + 1) as u64 * (y1 - y0 + 1) as u64
}

fn extent(points: &[Point]) -> Option<(Point, Point)> {
    let &first = points.first()?;
    Some(points.iter().fold((first, first), |(min, max), p| {
        (
            Point::new(min.x.min(p.x), min.y.min(p.y)),
            Point::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

impl Surface for PixelCanvas {
    fn width(&self) -> f32 {
        self.surface_width
    }

    fn height(&self) -> f32 {
        self.surface_height
    }

    fn fill_background(&mut self, color: ThemeColor) {
        let color = color.to_float();
        for y in 0..self.height {
            for x in 0..self.width {
                self.blend(x, y, color, 1.0);
            }
        }
        self.visits += self.pixels.len() as u64;
    }

    fn stroke_segment(&mut self, from: Point, to: Point, stroke: &Stroke) {
        self.stroke_polyline(&[from, to], stroke);
    }

    /// Builds a distance field over the polyline's bounding box, one
    /// segment at a time, then shades each pixel once. Overlapping joints
    /// and glows are not blended twice.
    fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke) {
        let spine = self.raster_spine(points);
        let Some((min, max)) = extent(&spine) else {
            return;
        };
        let half_width = (stroke.width * self.length_scale()).max(1.0) / 2.0;
        let glow = self.raster_glow(stroke.glow);
        let reach = half_width + 1.0 + glow.map_or(0.0, |g| g.blur);
        let Some(bounds) = self.bounds(min, max, reach) else {
            return;
        };

        if spine.len() <= 2 {
            let (from, to) = (spine[0], spine[spine.len() - 1]);
            self.rasterize(bounds, half_width, &stroke.paint, glow, |p| {
                distance_to_segment(p, from, to)
            });
            return;
        }

        let (x0, y0, x1, y1) = bounds;
        let columns = (x1 - x0 + 1) as usize;
        let mut distances = std::mem::take(&mut self.distances);
        distances.clear();
        distances.resize(area(bounds) as usize, f32::INFINITY);

        for pair in spine.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let min = Point::new(from.x.min(to.x), from.y.min(to.y));
            let max = Point::new(from.x.max(to.x), from.y.max(to.y));
            let Some(segment_bounds) = self.bounds(min, max, reach) else {
                continue;
            };
            let (sx0, sy0, sx1, sy1) = segment_bounds;
            for y in sy0..=sy1 {
                for x in sx0..=sx1 {
                    let d = distance_to_segment(Point::new(x as f32 + 0.5, y as f32 + 0.5), from, to);
                    let slot = &mut distances[(y - y0) as usize * columns + (x - x0) as usize];
                    if d < *slot {
                        *slot = d;
                    }
                }
            }
            self.visits += area(segment_bounds);
        }

        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = distances[(y - y0) as usize * columns + (x - x0) as usize];
                if d.is_finite() {
                    self.shade(x, y, d, half_width, &stroke.paint, glow);
                }
            }
        }
        self.visits += area(bounds);
        self.distances = distances;
    }

    fn fill_circle(&mut self, center: Point, radius: f32, paint: &Paint, glow: Option<Glow>) {
        let center = self.to_raster(center);
        let radius = radius * self.length_scale();
        let glow = self.raster_glow(glow);
        let reach = radius + 1.0 + glow.map_or(0.0, |g| g.blur);
        let Some(bounds) = self.bounds(center, center, reach) else {
            return;
        };
        // A filled disc is a zero-length stroke whose half width is the radius.
        self.rasterize(bounds, radius, paint, glow, |p| p.distance(center));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: ThemeColor = ThemeColor::rgb(255, 255, 255);
    const RED: ThemeColor = ThemeColor::rgb(255, 0, 0);
    const BLUE: ThemeColor = ThemeColor::rgb(0, 0, 255);

    #[test]
    fn test_gradient_interpolates_between_stops() {
        let gradient = Gradient::new(vec![(1.0, BLUE), (0.0, RED)]);
        assert_eq!(gradient.stops()[0].0, 0.0);
        let mid = gradient.color_at(0.5);
        assert!((mid.red - 0.5).abs() < 1e-4);
        assert!((mid.blue - 0.5).abs() < 1e-4);
        assert_eq!(gradient.color_at(-1.0), RED.to_float());
        assert_eq!(gradient.color_at(2.0), BLUE.to_float());
    }

    #[test]
    fn test_radial_paint_uses_distance_from_center() {
        let paint = Paint::Radial {
            center: Point::new(0.0, 0.0),
            inner: 10.0,
            outer: 20.0,
            gradient: Gradient::new(vec![(0.0, RED), (1.0, BLUE)]),
        };
        assert_eq!(paint.color_at(Point::new(10.0, 0.0)), RED.to_float());
        assert_eq!(paint.color_at(Point::new(0.0, 20.0)), BLUE.to_float());
    }

    #[test]
    fn test_background_fill_blends_alpha() {
        let mut canvas = PixelCanvas::new(4, 2);
        canvas.fill_background(ThemeColor::rgba(200, 100, 0, 128));
        let pixel = canvas.pixel(3, 1).unwrap();
        assert!((99..=101).contains(&pixel.red));
        assert!((49..=51).contains(&pixel.green));
        assert_eq!(pixel.blue, 0);
    }

    #[test]
    fn test_stroke_segment_covers_its_pixels_only() {
        let mut canvas = PixelCanvas::new(20, 20);
        let stroke = Stroke {
            paint: Paint::Solid(WHITE),
            width: 2.0,
            glow: None,
        };
        canvas.stroke_segment(Point::new(2.0, 10.0), Point::new(18.0, 10.0), &stroke);
        assert_eq!(canvas.pixel(10, 9).unwrap(), Srgb::new(255, 255, 255));
        assert_eq!(canvas.pixel(10, 2).unwrap(), Srgb::new(0, 0, 0));
    }

    #[test]
    fn test_glow_reaches_beyond_the_stroke() {
        let mut canvas = PixelCanvas::new(40, 40);
        let stroke = Stroke {
            paint: Paint::Solid(WHITE),
            width: 2.0,
            glow: Some(Glow {
                color: RED,
                blur: 10.0,
            }),
        };
        canvas.stroke_segment(Point::new(5.0, 20.0), Point::new(35.0, 20.0), &stroke);
        let halo = canvas.pixel(20, 24).unwrap();
        assert!(halo.red > 0);
        assert_eq!(halo.blue, 0);
        assert_eq!(canvas.pixel(20, 35).unwrap(), Srgb::new(0, 0, 0));
    }

    #[test]
    fn test_shapes_outside_canvas_are_clipped() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.fill_circle(Point::new(-50.0, -50.0), 3.0, &Paint::Solid(WHITE), None);
        assert!(canvas.pixels().iter().all(|p| *p == Srgb::new(0, 0, 0)));
    }

    #[derive(Default)]
    struct SegmentCounter {
        segments: Vec<(Point, Point)>,
    }

    impl Surface for SegmentCounter {
        fn width(&self) -> f32 {
            100.0
        }
        fn height(&self) -> f32 {
            100.0
        }
        fn fill_background(&mut self, _color: ThemeColor) {}
        fn stroke_segment(&mut self, from: Point, to: Point, _stroke: &Stroke) {
            self.segments.push((from, to));
        }
        fn fill_circle(&mut self, _c: Point, _r: f32, _p: &Paint, _g: Option<Glow>) {}
    }

    #[test]
    fn test_stroke_path_flattens_quadratics() {
        let mut surface = SegmentCounter::default();
        let stroke = Stroke {
            paint: Paint::Solid(WHITE),
            width: 1.0,
            glow: None,
        };
        let path = [
            PathSegment::MoveTo(Point::new(0.0, 0.0)),
            PathSegment::QuadTo {
                control: Point::new(5.0, 10.0),
                to: Point::new(10.0, 0.0),
            },
            PathSegment::LineTo(Point::new(20.0, 0.0)),
        ];
        surface.stroke_path(&path, &stroke);
        assert_eq!(surface.segments.len(), QUAD_STEPS + 1);
        assert_eq!(surface.segments[QUAD_STEPS - 1].1, Point::new(10.0, 0.0));
        let apex = surface.segments[QUAD_STEPS / 2 - 1].1;
        assert!((apex.y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_short_quadratics_become_one_chord() {
        let mut surface = SegmentCounter::default();
        let stroke = Stroke {
            paint: Paint::Solid(WHITE),
            width: 1.0,
            glow: None,
        };
        let path = [
            PathSegment::MoveTo(Point::new(0.0, 0.0)),
            PathSegment::QuadTo {
                control: Point::new(0.5, 0.2),
                to: Point::new(1.0, 0.0),
            },
            PathSegment::QuadTo {
                control: Point::new(1.5, -0.2),
                to: Point::new(2.0, 0.0),
            },
        ];
        surface.stroke_path(&path, &stroke);
        assert_eq!(surface.segments.len(), 2);
        assert_eq!(surface.segments[1].1, Point::new(2.0, 0.0));
    }

    #[test]
    fn test_scaled_canvas_maps_surface_units() {
        let mut canvas = PixelCanvas::scaled(800.0, 400.0, 80, 40);
        assert_eq!(canvas.width(), 800.0);
        assert_eq!(canvas.dimensions(), (80, 40));
        let stroke = Stroke {
            paint: Paint::Solid(WHITE),
            width: 20.0,
            glow: None,
        };
        canvas.stroke_segment(Point::new(0.0, 200.0), Point::new(800.0, 200.0), &stroke);
        assert_eq!(canvas.pixel(40, 19).unwrap(), Srgb::new(255, 255, 255));
        assert_eq!(canvas.pixel(40, 30).unwrap(), Srgb::new(0, 0, 0));

        assert!(canvas.resize(20, 10));
        assert!(!canvas.resize(20, 10));
        assert_eq!(canvas.width(), 800.0);
        assert!(canvas.pixels().iter().all(|p| *p == Srgb::new(0, 0, 0)));
    }

    #[test]
    fn test_polyline_joints_blend_once() {
        let mut canvas = PixelCanvas::new(20, 20);
        let stroke = Stroke {
            paint: Paint::Solid(ThemeColor::rgba(255, 255, 255, 128)),
            width: 2.0,
            glow: None,
        };
        let points = [
            Point::new(2.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 18.0),
        ];
        canvas.stroke_polyline(&points, &stroke);
        // a double blend at the corner would reach about 191
        let corner = canvas.pixel(9, 9).unwrap();
        assert!((127..=129).contains(&corner.red), "corner was {:?}", corner);
    }

    #[test]
    fn test_sub_pixel_points_are_merged() {
        let mut canvas = PixelCanvas::scaled(800.0, 400.0, 80, 40);
        let stroke = Stroke {
            paint: Paint::Solid(WHITE),
            width: 20.0,
            glow: None,
        };
        let dense: Vec<Point> = (0..=800).map(|x| Point::new(x as f32, 200.0)).collect();
        canvas.stroke_polyline(&dense, &stroke);
        let visits = canvas.take_visits();
        // 801 points collapse to about 160 raster segments
        assert!(visits < 10_000, "visited {} pixels", visits);
        assert_eq!(canvas.pixel(79, 20).unwrap(), Srgb::new(255, 255, 255));
    }
}
