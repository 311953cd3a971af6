extern crate image as image_rs;
extern crate nalgebra as na;

use tempfile::tempdir;
use image_rs::{Rgb,RgbImage};

use na::Matrix4;

use lidarcam::{float,Float};
use lidarcam::projection::{project,Canvas,ProjectedPoint};
use lidarcam::point_cloud::{Point,PointCloud};
use lidarcam::sensors::camera::pinhole::Pinhole;
use lidarcam::extrinsics::SourceExtrinsic;
use lidarcam::extrinsics::frame_converter::AxisConvention;
use lidarcam::visualize::Channel;
use lidarcam::visualize::color_map::{ColorMap,ColorMapper,NEUTRAL_COLOR};
use lidarcam::visualize::overlay::{draw_disc,draw_projection};
use lidarcam::visualize::plot::draw_projection_scatter;

fn point(u: Float, v: Float, depth: Float, reflectance: Float) -> ProjectedPoint {
    ProjectedPoint{u,v,depth,reflectance}
}

#[test]
fn zero_maximum_gives_neutral_color() {
    let mapper = ColorMapper::fit(ColorMap::Rainbow, vec![0.0, 0.0, -1.0]);
    assert_eq!(mapper.max(), None);
    assert_eq!(mapper.color(0.0), NEUTRAL_COLOR);
    assert_eq!(mapper.color(5.0), NEUTRAL_COLOR);

    let empty = ColorMapper::fit(ColorMap::Intensity, Vec::<Float>::new());
    assert_eq!(empty.color(1.0), NEUTRAL_COLOR);
}

#[test]
fn intensity_map_scales_by_observed_maximum() {
    let mapper = ColorMapper::fit(ColorMap::Intensity, vec![1.0, float::NAN, 4.0, 2.0]);
    assert_eq!(mapper.max(), Some(4.0));
    assert_eq!(mapper.color(4.0), Rgb([0,0,255]));
    assert_eq!(mapper.color(2.0), Rgb([0,0,128]));
    assert_eq!(mapper.color(8.0), Rgb([0,0,255]));
    assert_eq!(mapper.color(-1.0), Rgb([0,0,0]));
}

#[test]
fn rainbow_runs_from_red_to_violet() {
    assert_eq!(ColorMap::Rainbow.color(0.0), Rgb([255,0,0]));
    assert_eq!(ColorMap::Rainbow.color(1.0), Rgb([128,0,255]));
}

#[test]
fn channel_mappers() {
    let points = vec![point(0.0, 0.0, 10.0, 0.25), point(1.0, 1.0, 20.0, 1.0)];
    let depth = ColorMapper::for_channel(ColorMap::Intensity, Channel::Depth, &points);
    let reflectance = ColorMapper::for_channel(ColorMap::Intensity, Channel::Reflectance, &points);

    assert_eq!(depth.max(), Some(20.0));
    assert_eq!(reflectance.max(), Some(1.0));
    assert_eq!(depth.normalize(Channel::Depth.value(&points[0])), Some(0.5));
    assert_eq!(reflectance.normalize(Channel::Reflectance.value(&points[0])), Some(0.25));
}

#[test]
fn discs_are_clipped_and_blended() {
    let mut image = RgbImage::new(5, 5);
    draw_disc(&mut image, 2.0, 2.0, 1, Rgb([255,255,255]), 1.0);

    assert_eq!(*image.get_pixel(2,2), Rgb([255,255,255]));
    assert_eq!(*image.get_pixel(1,2), Rgb([255,255,255]));
    assert_eq!(*image.get_pixel(1,1), Rgb([0,0,0]));

    draw_disc(&mut image, 0.0, 4.0, 0, Rgb([200,100,0]), 0.5);
    assert_eq!(*image.get_pixel(0,4), Rgb([100,50,0]));

    // off image and non finite centers leave the image alone
    let before = image.clone();
    draw_disc(&mut image, -10.0, -10.0, 3, Rgb([255,0,0]), 1.0);
    draw_disc(&mut image, float::NAN, 1.0, 3, Rgb([255,0,0]), 1.0);
    assert_eq!(image, before);
}

#[test]
fn projection_overlay_colors_points() {
    let mut image = RgbImage::new(8, 8);
    let points = vec![point(1.0, 1.0, 5.0, 1.0), point(6.0, 6.0, 10.0, 0.0)];
    let mapper = ColorMapper::for_channel(ColorMap::Intensity, Channel::Depth, &points);

    draw_projection(&mut image, &points, Channel::Depth, &mapper, 0, 1.0);

    assert_eq!(*image.get_pixel(1,1), Rgb([0,0,128]));
    assert_eq!(*image.get_pixel(6,6), Rgb([0,0,255]));
    assert_eq!(*image.get_pixel(3,3), Rgb([0,0,0]));
}

#[test]
fn scatter_plot_is_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scatter.png");
    let canvas = Canvas::new(64.0, 48.0);
    let points = vec![point(10.0, 10.0, 3.0, 0.5), point(60.0, 40.0, 6.0, 0.9)];
    let mapper = ColorMapper::for_channel(ColorMap::Rainbow, Channel::Reflectance, &points);

    draw_projection_scatter(&points, &canvas, Channel::Reflectance, &mapper, &path, (64,48), 2).unwrap();

    let written = image_rs::open(&path).unwrap();
    assert_eq!((written.width(), written.height()), (64,48));
}

#[test]
fn points_near_the_image_plane_are_skipped() {
    let camera = Pinhole::new(1000.0, 1000.0, 320.0, 240.0);
    let extrinsic = SourceExtrinsic::new(Matrix4::<Float>::identity()).into_canonical(AxisConvention::Canonical);
    let cloud = PointCloud::from_points(vec![Point::new(10.0, 0.0, 1e-16, 0.5), Point::new(0.0, 0.0, 5.0, 0.5)]);

    let projection = project(&camera, &extrinsic, &cloud, None);
    assert_eq!(projection.points.len(), 2);

    let mut image = RgbImage::new(640, 480);
    let mapper = ColorMapper::for_channel(ColorMap::Intensity, Channel::Depth, &projection.points);
    draw_projection(&mut image, &projection.points, Channel::Depth, &mapper, 2, 1.0);

    assert_eq!(*image.get_pixel(320,240), Rgb([0,0,255]));
    assert_eq!(*image.get_pixel(639,240), Rgb([0,0,0]));

    // a disc centred just off the image still reaches into it
    draw_disc(&mut image, -1.0, 10.0, 2, Rgb([255,0,0]), 1.0);
    assert_eq!(*image.get_pixel(0,10), Rgb([255,0,0]));
}

#[test]
fn scatter_plot_skips_points_off_the_canvas() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scatter.png");
    let canvas = Canvas::new(640.0, 480.0);
    let points = vec![point(1e11, 10.0, 1e-8, 0.5), point(100.0, 100.0, 4.0, 0.5)];
    let mapper = ColorMapper::for_channel(ColorMap::Rainbow, Channel::Depth, &points);

    draw_projection_scatter(&points, &canvas, Channel::Depth, &mapper, &path, (640,480), 2).unwrap();
    assert!(path.is_file());
}
