//! Region extraction - materializing line records as image and text files.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::alto::LineRecord;
use crate::error::{AltoError, Result};

/// Writes one cropped image and one transcription file per line record.
///
/// The source image is decoded once and reused across all crops.
pub struct RegionExtractor {
    image: DynamicImage,
    output_dir: PathBuf,
}

impl RegionExtractor {
    /// Open the source image and create the output directory.
    pub fn new(image_path: &Path, output_dir: &Path) -> Result<Self> {
        let image = image::open(image_path)?;
        fs::create_dir_all(output_dir)?;
        debug!(
            "Opened {} ({}x{})",
            image_path.display(),
            image.width(),
            image.height()
        );
        Ok(Self {
            image,
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Extract every record in arrival order, returning the number written.
    ///
    /// The first failed record (or parse error from the sequence) aborts
    /// the whole document.
    pub fn extract_all<I>(&self, lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = std::result::Result<LineRecord, AltoError>>,
    {
        let mut count = 0;
        for (index, line) in lines.into_iter().enumerate() {
            self.extract(index, &line?)?;
            count += 1;
        }
        Ok(count)
    }

    /// Write `line_<index>.png` and `line_<index>.txt` for one record.
    pub fn extract(&self, index: usize, line: &LineRecord) -> Result<()> {
        let cropped = crop_region(&self.image, line);
        cropped.save(self.output_dir.join(format!("line_{}.png", index)))?;
        fs::write(
            self.output_dir.join(format!("line_{}.txt", index)),
            &line.text,
        )?;
        debug!(
            "Wrote line_{} ({}x{}, {:?})",
            index,
            cropped.width(),
            cropped.height(),
            line.text
        );
        Ok(())
    }

    /// The per-document output directory this extractor writes into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// Crop a line's bounding box out of the page image.
///
/// The box `(hpos, vpos, hpos + width, vpos + height)` is half-open and
/// clipped to the image bounds, so an overhanging line yields a smaller
/// crop. A box lying entirely outside the image collapses to a 1x1 crop at
/// the nearest edge.
pub fn crop_region(image: &DynamicImage, line: &LineRecord) -> DynamicImage {
    let (img_width, img_height) = image.dimensions();

    let min_x = line.hpos.min(img_width.saturating_sub(1));
    let min_y = line.vpos.min(img_height.saturating_sub(1));
    let max_x = line.hpos.saturating_add(line.width).min(img_width);
    let max_y = line.vpos.saturating_add(line.height).min(img_height);

    let width = max_x.saturating_sub(min_x).max(1);
    let height = max_y.saturating_sub(min_y).max(1);

    image.crop_imm(min_x, min_y, width, height)
}
