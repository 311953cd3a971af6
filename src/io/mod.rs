use crate::{float,Float};

pub mod pcd_loader;
pub mod calibration;
pub mod frame_pairing;
pub mod runtime_conf;

/**
 * Index of the timestamp in `list` closest to `ts`.
 * `list` has to be sorted ascending, the scan stops once the distance grows.
 * Ties resolve to the earlier entry.
 */
pub fn closest_ts_index(ts: Float, list: &[Float]) -> Option<usize> {
    let mut min_delta = float::MAX;
    let mut min_idx = None;

    for (idx, target_ts) in list.iter().enumerate() {
        let delta = (ts-target_ts).abs();

        if delta < min_delta {
            min_delta = delta;
            min_idx = Some(idx);
        } else if delta > min_delta {
            break;
        }
    }

    min_idx
}
