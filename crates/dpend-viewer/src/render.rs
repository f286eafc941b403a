//! Software rasterization of frame geometry into an RGBA image.

use dpend_sim::{dot_radius, Color, FrameGeometry, ScreenPoint, SimConfig, Trail};
use image::{ImageBuffer, Rgba};
use imageproc::drawing::{
    draw_antialiased_line_segment_mut, draw_filled_circle_mut, draw_line_segment_mut,
};
use imageproc::pixelops::interpolate;

pub type Img = ImageBuffer<Rgba<u8>, Vec<u8>>;

const ROD_THICKNESS: i32 = 5;
const BOB_RADIUS: i32 = 10;

fn rgba(c: Color) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}

/// Draw a thick segment as a fan of parallel 1-px segments offset along the
/// perpendicular. Keeps both endpoints exact so rods stay attached to bobs.
fn draw_thick_segment(img: &mut Img, start: ScreenPoint, end: ScreenPoint, thickness: i32, color: Rgba<u8>) {
    let (x0, y0) = (start.x as f32, start.y as f32);
    let (x1, y1) = (end.x as f32, end.y as f32);

    let dx = x1 - x0;
    let dy = y1 - y0;
    let len = (dx * dx + dy * dy).sqrt();
    if len < 1e-3 {
        return;
    }

    let nx = -dy / len;
    let ny = dx / len;
    let half = thickness.max(1) / 2;

    for k in -half..=half {
        let off = k as f32;
        draw_line_segment_mut(
            img,
            (x0 + nx * off, y0 + ny * off),
            (x1 + nx * off, y1 + ny * off),
            color,
        );
    }
}

/// Rasterize one frame: clear, trail, rods, pivot and bobs.
pub fn draw_frame(config: &SimConfig, geometry: &FrameGeometry, trail: &Trail) -> Img {
    let mut img: Img =
        ImageBuffer::from_pixel(config.width as u32, config.height as u32, rgba(config.background));

    let trail_color = rgba(config.trail_color);
    match trail {
        Trail::Lines(points) => {
            for pair in points.windows(2) {
                draw_antialiased_line_segment_mut(
                    &mut img,
                    (pair[0].x, pair[0].y),
                    (pair[1].x, pair[1].y),
                    trail_color,
                    interpolate,
                );
            }
        }
        Trail::Dots(ring) => {
            let count = ring.len();
            for (i, point) in ring.iter().enumerate() {
                // Oldest-first iteration; age counts back from the newest.
                let age = count - 1 - i;
                draw_filled_circle_mut(
                    &mut img,
                    (point.x, point.y),
                    dot_radius(config.dot_radius, age),
                    trail_color,
                );
            }
        }
    }

    let rod = rgba(config.rod_color);
    draw_thick_segment(&mut img, geometry.pivot, geometry.bob1, ROD_THICKNESS, rod);
    draw_thick_segment(&mut img, geometry.bob1, geometry.bob2, ROD_THICKNESS, rod);

    draw_filled_circle_mut(
        &mut img,
        (geometry.pivot.x, geometry.pivot.y),
        BOB_RADIUS,
        rgba(config.pivot_color),
    );
    draw_filled_circle_mut(
        &mut img,
        (geometry.bob1.x, geometry.bob1.y),
        BOB_RADIUS,
        rgba(config.bob1_color),
    );
    draw_filled_circle_mut(
        &mut img,
        (geometry.bob2.x, geometry.bob2.y),
        BOB_RADIUS,
        rgba(config.bob2_color),
    );

    img
}

/// Convert an RGBA image to the 0RGB u32 buffer minifb presents.
pub fn to_argb_buffer(img: &Img) -> Vec<u32> {
    let mut out = vec![0u32; (img.width() * img.height()) as usize];
    for (i, p) in img.pixels().enumerate() {
        let r = p[0] as u32;
        let g = p[1] as u32;
        let b = p[2] as u32;
        out[i] = (255u32 << 24) | (r << 16) | (g << 8) | b;
    }
    out
}
