use super::surface::{Glow, Gradient, Paint, PathSegment, Point, Stroke, Surface};
use crate::colors::Theme;

const LAYERS: usize = 3;
const PARTICLE_STRIDE: usize = 8;
const PARTICLE_THRESHOLD: u8 = 128;

/// Vertical position of sample `i` on `layer` at time `time` (seconds).
///
/// An amplitude term driven by the bin magnitude is modulated by a spatial
/// sine, and two time-driven sines keep the line moving when the audio is
/// quiet.
pub fn sample_y(x: f32, magnitude: u8, layer: usize, time: f64, height: f32) -> f32 {
    let time = time as f32;
    let layer = layer as f32;
    let y_offset = height / 2.0 + layer * 20.0;
    let amplitude = magnitude as f32 / 255.0 * (height * 0.3);

    let wave1 = (x * 0.01 + time * 2.0 + layer).sin() * 20.0;
    let wave2 = (x * 0.005 + time * 1.5).sin() * 15.0;
    y_offset + amplitude * (x * 0.02 + time + layer * 0.5).sin() + wave1 + wave2
}

/// Liquid plasma waveform: three overlapping glowing layers joined with
/// quadratic curves, with particles on loud bins.
pub fn draw(surface: &mut dyn Surface, bins: &[u8], theme: &Theme, time: f64) {
    if bins.is_empty() {
        return;
    }
    let colors = &theme.colors;
    let width = surface.width();
    let height = surface.height();
    let slice_width = width / bins.len() as f32;

    for layer in 0..LAYERS {
        let layer_opacity = 1.0 - layer as f32 * 0.3;

        let points: Vec<Point> = bins
            .iter()
            .enumerate()
            .map(|(i, &magnitude)| {
                let x = i as f32 * slice_width;
                Point::new(x, sample_y(x, magnitude, layer, time, height))
            })
            .collect();

        let stroke = Stroke {
            paint: Paint::Linear {
                from_x: 0.0,
                to_x: width,
                gradient: Gradient::new(vec![
                    (0.0, colors.primary.scaled_alpha(layer_opacity, 255.0)),
                    (0.3, colors.secondary.scaled_alpha(layer_opacity, 200.0)),
                    (0.7, colors.accent.scaled_alpha(layer_opacity, 200.0)),
                    (1.0, colors.primary.scaled_alpha(layer_opacity, 255.0)),
                ]),
            },
            width: (6 - layer * 2) as f32,
            glow: Some(Glow {
                color: colors.primary,
                blur: 25.0 * layer_opacity,
            }),
        };
        surface.stroke_path(&smooth_path(&points), &stroke);

        for i in (0..bins.len()).step_by(PARTICLE_STRIDE) {
            let magnitude = bins[i];
            if magnitude <= PARTICLE_THRESHOLD {
                continue;
            }
            surface.fill_circle(
                points[i],
                magnitude as f32 / 255.0 * 3.0,
                &Paint::Solid(colors.accent.scaled_alpha(layer_opacity, 150.0)),
                Some(Glow {
                    color: colors.primary,
                    blur: 20.0,
                }),
            );
        }
    }
}

/// Quadratic curves through each point towards the midpoint of the next
/// pair, which keeps the line smooth while passing close to every sample.
pub fn smooth_path(points: &[Point]) -> Vec<PathSegment> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut path = Vec::with_capacity(points.len());
    path.push(PathSegment::MoveTo(first));
    for pair in points.windows(2).skip(1) {
        let (current, next) = (pair[0], pair[1]);
        path.push(PathSegment::QuadTo {
            control: current,
            to: current.midpoint(next),
        });
    }
    path
}
