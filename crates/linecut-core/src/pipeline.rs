//! End-to-end conversion of matched document pairs.

use std::path::Path;

use tracing::info;

use crate::alto::AltoReader;
use crate::crop::RegionExtractor;
use crate::error::Result;
use crate::pairs::DocumentPair;

/// Convert one document pair into per-line crops and transcriptions.
///
/// Creates `output_root/<name>/line_<i>.png` and `line_<i>.txt` for every
/// `TextLine` in the ALTO document, in document order. Returns the number
/// of lines written. Any parse, image, or write error aborts the pair.
pub fn process_pair(pair: &DocumentPair, output_root: &Path) -> Result<usize> {
    let reader = AltoReader::open(&pair.xml_path)?;

    let sub_dir = output_root.join(pair.output_name());
    let extractor = RegionExtractor::new(&pair.image_path, &sub_dir)?;
    let count = extractor.extract_all(reader.lines())?;

    info!(
        "Extracted {} lines from {} into {}",
        count,
        pair.xml_path.display(),
        sub_dir.display()
    );

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use image::{DynamicImage, GenericImageView};

    const ALTO_NS: &str = "http://www.loc.gov/standards/alto/ns-v4#";

    fn write_document(dir: &Path) -> DocumentPair {
        let xml_path = dir.join("doc.xml");
        fs::write(
            &xml_path,
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<alto xmlns="{ALTO_NS}">
  <Layout>
    <Page>
      <TextLine HPOS="10" VPOS="20" WIDTH="100" HEIGHT="30">
        <String CONTENT="Test"/>
      </TextLine>
    </Page>
  </Layout>
</alto>"#
            ),
        )
        .unwrap();

        let image_path = dir.join("doc.png");
        DynamicImage::new_rgba8(200, 200).save(&image_path).unwrap();

        DocumentPair {
            xml_path,
            image_path,
        }
    }

    #[test]
    fn test_process_pair_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let pair = write_document(dir.path());
        let output = dir.path().join("output");

        let count = process_pair(&pair, &output).unwrap();
        assert_eq!(count, 1);

        let crop = image::open(output.join("doc").join("line_0.png")).unwrap();
        assert_eq!(crop.dimensions(), (100, 30));
        assert_eq!(
            fs::read_to_string(output.join("doc").join("line_0.txt")).unwrap(),
            "Test"
        );
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let pair = write_document(dir.path());
        let output = dir.path().join("output");

        process_pair(&pair, &output).unwrap();
        let first = fs::read_to_string(output.join("doc").join("line_0.txt")).unwrap();

        process_pair(&pair, &output).unwrap();
        let second = fs::read_to_string(output.join("doc").join("line_0.txt")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_malformed_document_aborts_pair() {
        let dir = tempfile::tempdir().unwrap();
        let xml_path = dir.path().join("doc.xml");
        fs::write(&xml_path, "<alto><TextLine/></alto>").unwrap();

        let image_path = dir.path().join("doc.png");
        DynamicImage::new_rgba8(10, 10).save(&image_path).unwrap();

        let pair = DocumentPair {
            xml_path,
            image_path,
        };
        let output = dir.path().join("output");
        assert!(process_pair(&pair, &output).is_err());
    }

    #[test]
    fn test_unreadable_image_aborts_pair() {
        let dir = tempfile::tempdir().unwrap();
        let pair = write_document(dir.path());
        fs::write(&pair.image_path, b"not an image").unwrap();

        let output = dir.path().join("output");
        assert!(process_pair(&pair, &output).is_err());
    }
}
