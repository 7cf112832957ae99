//! Contact sheets of rendered frames

use image::{imageops, RgbaImage};

use crate::render::{RenderError, RenderResult};

/// Tile equally sized images row by row into a grid with `columns` columns.
///
/// Unused cells of the last row stay transparent.
///
/// # Errors
/// `InvalidInput` for no images, zero columns, or images of differing sizes.
pub fn compose_grid(images: &[&RgbaImage], columns: u32) -> RenderResult<RgbaImage> {
    let first = images
        .first()
        .ok_or_else(|| RenderError::InvalidInput("no images to compose".to_string()))?;
    if columns == 0 {
        return Err(RenderError::InvalidInput("grid needs at least one column".to_string()));
    }

    let (width, height) = first.dimensions();
    if let Some(odd) = images.iter().find(|img| img.dimensions() != (width, height)) {
        return Err(RenderError::InvalidInput(format!(
            "cannot tile a {:?} image into a grid of {:?} cells",
            odd.dimensions(),
            (width, height)
        )));
    }

    let count = images.len() as u32;
    let columns = columns.min(count);
    let rows = count.div_ceil(columns);
    let mut sheet = RgbaImage::new(width * columns, height * rows);

    for (index, image) in (0_u32..).zip(images) {
        let x = i64::from((index % columns) * width);
        let y = i64::from((index / columns) * height);
        imageops::replace(&mut sheet, *image, x, y);
    }
    Ok(sheet)
}
