//! Outline cleanup for rasterized sprite images.
//!
//! Glyph rasterizers on some platforms draw a thick black rim around every shape.
//! [`reduce_edges`] flood fills inwards from a transparent seed pixel and fades that
//! rim out, and [`find_edges`] locates the visible part of the image so it can be cropped.

use smallvec::SmallVec;
use tracing::warn;

use crate::constants::{FILL_QUEUE_CAPACITY, OUTLINE_BRIGHTNESS};
use crate::error::{QueueError, TextureError};
use crate::queue::Queue;

/// An 8-bit RGBA image, row-major, four bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Inclusive bounds of the visible pixels in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl RgbaImage {
    /// Creates a fully transparent image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * 4],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, TextureError> {
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(TextureError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// The pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        let at = self.offset(x, y)?;
        self.data.get(at..at + 4)?.try_into().ok()
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) -> Result<(), TextureError> {
        let at = self.offset(x, y).ok_or(TextureError::OutOfBounds { x, y })?;
        self.data[at..at + 4].copy_from_slice(&rgba);
        Ok(())
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) * 4)
    }
}

/// Perceived brightness of a colour, rounded to an integer.
pub fn brightness(red: u8, green: u8, blue: u8) -> f64 {
    let (r, g, b) = (red as f64, green as f64, blue as f64);
    (r * r * 0.241 + g * g * 0.691 + b * b * 0.068).sqrt().round()
}

/// Fades out dark outline pixels reachable from `(start_x, start_y)`.
///
/// The fill spreads through transparent, pure black and dark pixels. Pure black pixels
/// become transparent; dark ones get an alpha proportional to their brightness.
/// Brighter pixels stop the fill.
///
/// The image is only modified when the fill completes. If the work queue overflows the
/// fill is abandoned, a warning is logged and the image is left exactly as it was.
pub fn reduce_edges(image: &mut RgbaImage, start_x: usize, start_y: usize) -> Result<(), TextureError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 || start_x >= width || start_y >= height {
        return Ok(());
    }
    if width > u16::MAX as usize || height > u16::MAX as usize {
        return Err(TextureError::ImageTooLarge { width, height });
    }

    let alpha = match flood(image, start_x, start_y) {
        Ok(alpha) => alpha,
        Err(e) => {
            warn!(width, height, error = %e, "Outline fill aborted, image left untouched");
            return Err(e.into());
        }
    };

    for (px, a) in image.data.chunks_exact_mut(4).zip(alpha) {
        px[3] = a;
    }
    Ok(())
}

/// Runs the fill and returns the new alpha channel, without touching the image.
fn flood(image: &RgbaImage, start_x: usize, start_y: usize) -> Result<Vec<u8>, QueueError> {
    let (width, height) = (image.width, image.height);
    let mut alpha: Vec<u8> = image.data.chunks_exact(4).map(|px| px[3]).collect();
    let mut visited = vec![false; width * height];
    let mut queue = Queue::<FILL_QUEUE_CAPACITY>::new();

    visited[start_y * width + start_x] = true;
    queue.enqueue(start_x as u16)?;
    queue.enqueue(start_y as u16)?;

    while !queue.is_empty() {
        let x = queue.dequeue()? as usize;
        let y = queue.dequeue()? as usize;
        let Some([red, green, blue, a]) = image.pixel(x, y) else {
            continue;
        };
        let shade = brightness(red, green, blue);

        let spread = if a == 0 {
            true
        } else if red == 0 && green == 0 && blue == 0 {
            alpha[y * width + x] = 0;
            true
        } else if shade < OUTLINE_BRIGHTNESS {
            alpha[y * width + x] = (shade * (255.0 / OUTLINE_BRIGHTNESS)).round() as u8;
            true
        } else {
            false
        };

        if !spread {
            continue;
        }

        let mut neighbours = SmallVec::<[(usize, usize); 4]>::new();
        if x > 0 {
            neighbours.push((x - 1, y));
        }
        if x < width - 1 {
            neighbours.push((x + 1, y));
        }
        if y > 0 {
            neighbours.push((x, y - 1));
        }
        if y < height - 1 {
            neighbours.push((x, y + 1));
        }

        for (nx, ny) in neighbours {
            let seen = &mut visited[ny * width + nx];
            if !*seen {
                *seen = true;
                queue.enqueue(nx as u16)?;
                queue.enqueue(ny as u16)?;
            }
        }
    }

    Ok(alpha)
}

/// Finds the bounds of all pixels with a non-zero alpha, or `None` for a fully transparent image.
pub fn find_edges(image: &RgbaImage) -> Option<PixelBounds> {
    let mut bounds: Option<PixelBounds> = None;

    for y in 0..image.height {
        for x in 0..image.width {
            if matches!(image.pixel(x, y), None | Some([.., 0])) {
                continue;
            }
            let b = bounds.get_or_insert(PixelBounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            });
            b.min_x = b.min_x.min(x);
            b.max_x = b.max_x.max(x);
            b.min_y = b.min_y.min(y);
            b.max_y = b.max_y.max(y);
        }
    }

    bounds
}
