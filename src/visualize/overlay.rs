extern crate image as image_rs;

use image_rs::{Rgb,RgbImage};
use crate::Float;
use crate::projection::ProjectedPoint;
use crate::visualize::{Channel,color_map::ColorMapper};

/**
 * Draws every point as a filled disc of `radius` pixels. Discs are clipped to
 * the image, `alpha` blends them over the existing pixels.
 */
pub fn draw_projection(image: &mut RgbImage, points: &[ProjectedPoint], channel: Channel, mapper: &ColorMapper, radius: u32, alpha: Float) -> () {
    for point in points {
        let color = mapper.color(channel.value(point));
        draw_disc(image, point.u, point.v, radius, color, alpha);
    }
}

pub fn draw_disc(image: &mut RgbImage, u: Float, v: Float, radius: u32, color: Rgb<u8>, alpha: Float) -> () {
    let reach = radius as Float;
    let inside = |c: Float, extent: u32| c.is_finite() && c >= -reach && c <= extent as Float + reach;
    if !inside(u, image.width()) || !inside(v, image.height()) {
        return;
    }

    let width = image.width() as i64;
    let height = image.height() as i64;
    let center_x = u.round() as i64;
    let center_y = v.round() as i64;
    let r = radius as i64;
    let alpha = alpha.max(0.0).min(1.0);

    for dy in -r..=r {
        for dx in -r..=r {
            if dx*dx + dy*dy > r*r {
                continue;
            }
            let x = center_x + dx;
            let y = center_y + dy;
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let pixel = image.get_pixel_mut(x as u32, y as u32);
            *pixel = blend(pixel, &color, alpha);
        }
    }
}

fn blend(background: &Rgb<u8>, foreground: &Rgb<u8>, alpha: Float) -> Rgb<u8> {
    let mut out = [0u8; 3];
    for i in 0..3 {
        let mixed = alpha*(foreground[i] as Float) + (1.0-alpha)*(background[i] as Float);
        out[i] = mixed.round().max(0.0).min(255.0) as u8;
    }
    Rgb(out)
}
