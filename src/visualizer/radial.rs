use std::f32::consts::TAU;

use super::surface::{Glow, Gradient, Paint, Point, Stroke, Surface};
use crate::colors::Theme;

const RINGS: usize = 3;

/// Circular radial frequency visualizer: one spoke per bin on each of three
/// concentric rings, fading and thinning outward.
pub fn draw(surface: &mut dyn Surface, bins: &[u8], theme: &Theme) {
    if bins.is_empty() {
        return;
    }
    let colors = &theme.colors;
    let center = Point::new(surface.width() / 2.0, surface.height() / 2.0);
    let base_radius = center.x.min(center.y) * 0.3;

    for ring in 0..RINGS {
        let ring_radius = base_radius * (1.0 + ring as f32 * 0.4);
        let ring_opacity = 1.0 - ring as f32 * 0.3;

        for (i, &magnitude) in bins.iter().enumerate() {
            let angle = i as f32 / bins.len() as f32 * TAU;
            let bar_height = magnitude as f32 / 255.0 * ring_radius * 0.8;
            let (sin, cos) = angle.sin_cos();

            let base = Point::new(center.x + cos * ring_radius, center.y + sin * ring_radius);
            let tip = Point::new(
                center.x + cos * (ring_radius + bar_height),
                center.y + sin * (ring_radius + bar_height),
            );

            let stroke = Stroke {
                paint: Paint::Radial {
                    center,
                    inner: ring_radius,
                    outer: ring_radius + bar_height,
                    gradient: Gradient::new(vec![
                        (0.0, colors.primary.scaled_alpha(ring_opacity, 255.0)),
                        (0.5, colors.secondary.scaled_alpha(ring_opacity, 200.0)),
                        (1.0, colors.accent.scaled_alpha(ring_opacity, 100.0)),
                    ]),
                },
                width: (4 - ring) as f32,
                glow: Some(Glow {
                    color: colors.primary,
                    blur: 20.0 * ring_opacity,
                }),
            };
            surface.stroke_segment(base, tip, &stroke);

            // Particle at the tip of tall bars
            if bar_height > ring_radius * 0.3 {
                surface.fill_circle(
                    tip,
                    2.0,
                    &Paint::Solid(colors.accent),
                    Some(Glow {
                        color: colors.primary,
                        blur: 15.0,
                    }),
                );
            }
        }
    }

    let glow_radius = base_radius * 0.5;
    surface.fill_circle(
        center,
        glow_radius,
        &Paint::Radial {
            center,
            inner: 0.0,
            outer: glow_radius,
            gradient: Gradient::new(vec![
                (0.0, colors.primary.with_alpha(0x30)),
                (1.0, colors.primary.with_alpha(0)),
            ]),
        },
        None,
    );
}
