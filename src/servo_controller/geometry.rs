//! Detection geometry: bounding box to target point

use super::types::{BoundingBox, ImageSize, TargetPoint};
use crate::error::{Error, Result};

/// Center of `bb`, optionally re-based onto a bottom-up vertical axis.
///
/// The flip is applied to the raw box (`y' = image_height - (y + height)`)
/// before the center is taken. A center that overflows `f64` is rejected.
pub fn bounding_box_to_target(
    bb: &BoundingBox,
    image_height: f64,
    flip_vertical: bool,
) -> Result<TargetPoint> {
    if bb.width < 0.0 || bb.height < 0.0 {
        return Err(Error::MalformedDetection {
            width: bb.width,
            height: bb.height,
        });
    }

    let top = if flip_vertical {
        image_height - (bb.y + bb.height)
    } else {
        bb.y
    };

    let target = TargetPoint {
        x: bb.x + bb.width / 2.0,
        y: top + bb.height / 2.0,
    };
    if !(target.x.is_finite() && target.y.is_finite()) {
        return Err(Error::NonFiniteDetection {
            x: target.x,
            y: target.y,
        });
    }

    Ok(target)
}

/// Image center, with the vertical flip applied once
pub fn setpoint(image: ImageSize, flip_vertical: bool) -> TargetPoint {
    let width = image.width as f64;
    let height = image.height as f64;
    let center_y = height / 2.0;

    TargetPoint {
        x: width / 2.0,
        y: if flip_vertical {
            height - center_y
        } else {
            center_y
        },
    }
}
