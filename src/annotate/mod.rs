//! Burns detection boxes and labels into an image.

pub mod font;

use crate::config::AnnotationStyle;
use crate::models::Detection;
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut},
    rect::Rect,
};

/// Draw every detection onto `image` and return it.
///
/// Detections are drawn in the order given, so later labels may cover
/// earlier ones. Image dimensions never change.
pub fn annotate(mut image: RgbImage, detections: &[Detection], style: &AnnotationStyle) -> RgbImage {
    annotate_in_place(&mut image, detections, style);
    image
}

pub fn annotate_in_place(image: &mut RgbImage, detections: &[Detection], style: &AnnotationStyle) {
    let color = Rgb(style.color);
    for detection in detections {
        draw_box(image, detection, style, color);
        draw_label(image, detection, style, color);
    }
}

fn draw_box(image: &mut RgbImage, detection: &Detection, style: &AnnotationStyle, color: Rgb<u8>) {
    let bbox = detection.bbox;
    let (x1, x2) = (bbox.x1.min(bbox.x2), bbox.x1.max(bbox.x2));
    let (y1, y2) = (bbox.y1.min(bbox.y2), bbox.y1.max(bbox.y2));

    // Strokes are centred on the box edge: thickness 2 adds one ring outside.
    let thickness = style.thickness.max(1) as i32;
    let inner = (thickness - 1) / 2;
    for grow in -inner..(thickness - inner) {
        let width = x2 - x1 + 2 * grow + 1;
        let height = y2 - y1 + 2 * grow + 1;
        if width <= 0 || height <= 0 {
            continue;
        }
        let rect = Rect::at(x1 - grow, y1 - grow).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Label goes above the box's top-left corner, or just inside it when there
/// is no room above.
fn draw_label(image: &mut RgbImage, detection: &Detection, style: &AnnotationStyle, color: Rgb<u8>) {
    if detection.label.is_empty() {
        return;
    }
    let scale = style.font_scale.max(1);
    let text_height = (font::GLYPH_HEIGHT * scale) as i32;
    let x = detection.bbox.x1.min(detection.bbox.x2);
    let top = detection.bbox.y1.min(detection.bbox.y2);

    let above = top - style.label_offset as i32 - text_height + 1;
    let y = if above >= 0 {
        above
    } else {
        top + style.thickness.max(1) as i32 + 1
    };
    draw_text(image, &detection.label, x, y, scale, color);
}

/// Render `text` with its top-left corner at (`x`, `y`). Off-image parts are clipped.
pub fn draw_text(image: &mut RgbImage, text: &str, x: i32, y: i32, scale: u32, color: Rgb<u8>) {
    let scale = scale.max(1);
    let mut cursor = x;
    for ch in text.chars() {
        let rows = font::glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..font::GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let px = cursor + (col * scale) as i32;
                let py = y + (row as u32 * scale) as i32;
                draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), color);
            }
        }
        cursor += (font::ADVANCE * scale) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;

    #[test]
    fn label_moves_inside_when_box_touches_top() {
        let mut image = RgbImage::new(60, 40);
        let detection = Detection {
            bbox: BoundingBox::new(2, 0, 50, 30),
            confidence: 0.9,
            label: "l".into(),
        };
        let style = AnnotationStyle::default();
        draw_label(&mut image, &detection, &style, Rgb([255, 255, 255]));
        // 'l' has its top row at columns 1-2 of the glyph; y = 0 + thickness + 1.
        assert_eq!(image.get_pixel(3, 3).0, [255, 255, 255]);
        assert_eq!(image.get_pixel(3, 2).0, [0, 0, 0]);
    }

    #[test]
    fn thick_box_stays_clipped_to_image() {
        let image = RgbImage::new(8, 8);
        let detection = Detection {
            bbox: BoundingBox::new(-5, -5, 20, 20),
            confidence: 0.9,
            label: String::new(),
        };
        let style = AnnotationStyle {
            thickness: 4,
            ..AnnotationStyle::default()
        };
        let out = annotate(image, &[detection], &style);
        assert_eq!(out.dimensions(), (8, 8));
    }
}
