//! Rasterise a module matrix into a greyscale image.

use crate::models::BitMatrix;
use image::{GrayImage, Luma};

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Render `matrix` with `module_px` pixels per module and `quiet_zone`
/// light modules on every side
pub fn to_image(matrix: &BitMatrix, module_px: u32, quiet_zone: u32) -> GrayImage {
    let module_px = module_px.max(1);
    let w = (matrix.width() as u32 + 2 * quiet_zone) * module_px;
    let h = (matrix.height() as u32 + 2 * quiet_zone) * module_px;
    let mut img = GrayImage::from_pixel(w, h, LIGHT);

    for y in 0..matrix.height() {
        for x in 0..matrix.width() {
            if !matrix.get(x, y) {
                continue;
            }
            let px = (x as u32 + quiet_zone) * module_px;
            let py = (y as u32 + quiet_zone) * module_px;
            for dy in 0..module_px {
                for dx in 0..module_px {
                    img.put_pixel(px + dx, py + dy, DARK);
                }
            }
        }
    }
    img
}
