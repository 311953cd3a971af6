extern crate image as image_rs;

use image_rs::Rgb;
use crate::Float;
use crate::projection::ProjectedPoint;
use crate::visualize::Channel;

/// Returned whenever there is no usable maximum to normalize by.
pub const NEUTRAL_COLOR: Rgb<u8> = Rgb([128,128,128]);

/// Hue of the far end of the rainbow map, in degrees.
const RAINBOW_HUE_SPAN: Float = 270.0;

#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum ColorMap {
    /// Single blue channel.
    Intensity,
    /// Reversed rainbow: low values red, high values violet.
    Rainbow
}

impl ColorMap {
    pub fn color(&self, normalized: Float) -> Rgb<u8> {
        match self {
            ColorMap::Intensity => Rgb([0, 0, to_u8(normalized)]),
            ColorMap::Rainbow => hue_to_rgb(normalized*RAINBOW_HUE_SPAN)
        }
    }
}

#[derive(Debug,Copy,Clone,PartialEq)]
pub struct ColorMapper {
    map: ColorMap,
    max: Option<Float>
}

impl ColorMapper {
    /// Normalizes by the largest finite value observed in `values`.
    pub fn fit<I>(map: ColorMap, values: I) -> ColorMapper where I: IntoIterator<Item = Float> {
        let max = values.into_iter().filter(|v| v.is_finite()).fold(None, |acc: Option<Float>, v| match acc {
            Some(m) if m >= v => Some(m),
            _ => Some(v)
        });
        let max = match max {
            Some(m) if m > 0.0 => Some(m),
            _ => None
        };
        ColorMapper{map,max}
    }

    /// For scalars that are already in [0,1]; they are only clamped.
    pub fn normalized(map: ColorMap) -> ColorMapper {
        ColorMapper{map, max: Some(1.0)}
    }

    /// Depth is fitted to the batch maximum, reflectance is already normalized.
    pub fn for_channel(map: ColorMap, channel: Channel, points: &[ProjectedPoint]) -> ColorMapper {
        match channel {
            Channel::Depth => ColorMapper::fit(map, points.iter().map(|p| p.depth)),
            Channel::Reflectance => ColorMapper::normalized(map)
        }
    }

    pub fn max(&self) -> Option<Float> {
        self.max
    }

    pub fn normalize(&self, value: Float) -> Option<Float> {
        self.max.map(|m| (value/m).max(0.0).min(1.0))
    }

    pub fn color(&self, value: Float) -> Rgb<u8> {
        match self.normalize(value) {
            Some(t) => self.map.color(t),
            None => NEUTRAL_COLOR
        }
    }
}

fn to_u8(normalized: Float) -> u8 {
    (normalized.max(0.0).min(1.0)*255.0).round() as u8
}

fn hue_to_rgb(hue: Float) -> Rgb<u8> {
    let h = (hue.max(0.0) % 360.0)/60.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x)
    };
    Rgb([to_u8(r), to_u8(g), to_u8(b)])
}
