//! Corner sampling for the background check.

use super::PixelFrame;

/// Mean of the RGB channels of each corner pixel.
///
/// Order: top-left, top-right, bottom-left, bottom-right. `None` for an empty frame.
/// Only meaningful for a full frame, where the background occupies the corners.
#[must_use]
pub fn corner_brightness(frame: &PixelFrame) -> Option<[f64; 4]> {
    if frame.width() == 0 || frame.height() == 0 {
        return None;
    }
    let (right, bottom) = (frame.width() - 1, frame.height() - 1);
    let mut out = [0.0; 4];
    for (slot, (x, y)) in out
        .iter_mut()
        .zip([(0, 0), (right, 0), (0, bottom), (right, bottom)])
    {
        let [r, g, b, _] = frame.pixel(x, y)?;
        *slot = (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0;
    }
    Some(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_corner_order() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        img.put_pixel(0, 0, Rgba([30, 30, 30, 255]));
        img.put_pixel(3, 0, Rgba([60, 60, 60, 255]));
        img.put_pixel(0, 3, Rgba([90, 90, 90, 255]));
        img.put_pixel(3, 3, Rgba([90, 120, 150, 255]));
        let corners = corner_brightness(&PixelFrame::from_rgba(img)).unwrap();
        assert_eq!(corners, [30.0, 60.0, 90.0, 120.0]);
    }

    #[test]
    fn test_single_pixel_frame() {
        let frame = PixelFrame::from_raw(1, 1, vec![200, 200, 200, 255]).unwrap();
        assert_eq!(corner_brightness(&frame).unwrap(), [200.0; 4]);
    }

    #[test]
    fn test_empty_frame() {
        let frame = PixelFrame::from_raw(0, 0, vec![]).unwrap();
        assert!(corner_brightness(&frame).is_none());
    }
}
