extern crate plotters;

use std::path::Path;
use plotters::prelude::*;

use crate::projection::{Canvas,ProjectedPoint};
use crate::visualize::{Channel,color_map::ColorMapper};

const POINT_OPACITY: f64 = 0.5;

/**
 * Scatter chart of a projection over its canvas, pixel rows growing downwards
 * like in the image. Points off the canvas are left out. Nothing but the
 * points is drawn, so no font backend is needed.
 */
pub fn draw_projection_scatter(points: &[ProjectedPoint], canvas: &Canvas, channel: Channel, mapper: &ColorMapper, path: &Path, size: (u32,u32), radius: u32) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(5)
        .build_cartesian_2d(0.0..canvas.width, 0.0..canvas.height)?;

    chart.draw_series(
        points.iter().filter(|p| canvas.contains(p.u, p.v)).map(|p| {
            let rgb = mapper.color(channel.value(p));
            let style = RGBColor(rgb[0], rgb[1], rgb[2]).mix(POINT_OPACITY).filled();
            Circle::new((p.u, canvas.height - p.v), radius as i32, style)
        })
    )?;

    root.present()?;
    Ok(())
}
