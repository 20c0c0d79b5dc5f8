use image::{GrayImage, Luma, RgbImage};
use imageproc::morphology::{Mask, grayscale_erode};

/// Per-pixel minimum across the three color channels.
pub fn min_channel(img: &RgbImage) -> GrayImage {
    let (width, height) = img.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let [r, g, b] = img.get_pixel(x, y).0;
        Luma([r.min(g).min(b)])
    })
}

/// Largest supported structuring element side.
pub const MAX_PATCH_SIZE: u32 = 511;

/// Grayscale erosion with a `size x size` square structuring element.
///
/// The square is applied as a row pass then a column pass, each anchored at
/// `size / 2`. Pixels outside the image are ignored, which for a minimum
/// filter is the same as replicating the edge.
pub fn erode(img: &GrayImage, size: u32) -> GrayImage {
    if size <= 1 || img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    let size = size.min(MAX_PATCH_SIZE);
    let anchor = (size / 2) as u8;
    let row = Mask::from_image(&GrayImage::from_pixel(size, 1, Luma([255])), anchor, 0);
    let column = Mask::from_image(&GrayImage::from_pixel(1, size, Luma([255])), 0, anchor);
    grayscale_erode(&grayscale_erode(img, &row), &column)
}

/// Dark channel of an image: eroded per-pixel channel minimum.
pub fn dark_channel(img: &RgbImage, patch_size: u32) -> GrayImage {
    erode(&min_channel(img), patch_size)
}
