//! Parsing of the IDX binary format used by MNIST and its derivatives
//! (Fashion-MNIST, EMNIST, ...).
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use std::path::Path;

use ndarray::Array2;
use tracing::debug;

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

/// Parses an image/label IDX pair into a `Dataset`.
///
/// Each image becomes one feature row of length `rows * cols`, every pixel
/// divided by 255.0 so values lie in `[0.0, 1.0]`. Labels are kept as raw
/// class indices.
pub fn parse_idx_pair(image_bytes: &[u8], label_bytes: &[u8]) -> Result<Dataset> {
    // ── Image file validation ───────────────────────────────────────────────

    check_magic("image", image_bytes, IMAGE_HEADER_LEN, 3)?;

    let n_items = read_be_u32(image_bytes, 4);
    let rows = read_be_u32(image_bytes, 8);
    let cols = read_be_u32(image_bytes, 12);

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        NetError::DataFormat(format!(
            "IDX image file: rows * cols overflows usize (rows={rows}, cols={cols})."
        ))
    })?;
    let required_image_len = n_items
        .checked_mul(n_pixels)
        .and_then(|len| len.checked_add(IMAGE_HEADER_LEN))
        .ok_or_else(|| {
            NetError::DataFormat(format!(
                "IDX image file: data length overflows usize (n_items={n_items}, n_pixels={n_pixels})."
            ))
        })?;

    if image_bytes.len() < required_image_len {
        return Err(NetError::DataFormat(format!(
            "IDX image file too short: header declares {n_items} items of {rows}×{cols} pixels, \
             but file is only {} bytes total (need {required_image_len}).",
            image_bytes.len()
        )));
    }
    if n_pixels == 0 {
        return Err(NetError::DataFormat(
            "IDX image file declares zero-sized images.".to_owned(),
        ));
    }

    // ── Label file validation ───────────────────────────────────────────────

    check_magic("label", label_bytes, LABEL_HEADER_LEN, 1)?;

    let label_count = read_be_u32(label_bytes, 4);
    if label_count != n_items {
        return Err(NetError::DataFormat(format!(
            "IDX file mismatch: image file declares {n_items} items but label file declares {label_count}."
        )));
    }

    let required_label_len = LABEL_HEADER_LEN + n_items;
    if label_bytes.len() < required_label_len {
        return Err(NetError::DataFormat(format!(
            "IDX label file too short: header declares {n_items} labels but file is only {} bytes \
             (need at least {required_label_len}).",
            label_bytes.len()
        )));
    }

    // ── Build dataset ───────────────────────────────────────────────────────

    let pixels = &image_bytes[IMAGE_HEADER_LEN..required_image_len];
    let features = Array2::from_shape_vec(
        (n_items, n_pixels),
        pixels.iter().map(|&px| px as f64 / 255.0).collect(),
    )?;
    let labels = label_bytes[LABEL_HEADER_LEN..required_label_len]
        .iter()
        .map(|&class| class as usize)
        .collect();

    debug!(n_items, rows, cols, "parsed IDX pair");
    Dataset::new(features, labels)
}

/// Reads and parses an IDX image file and its label file from disk.
pub fn load_idx_pair(image_path: impl AsRef<Path>, label_path: impl AsRef<Path>) -> Result<Dataset> {
    let image_bytes = std::fs::read(image_path)?;
    let label_bytes = std::fs::read(label_path)?;
    parse_idx_pair(&image_bytes, &label_bytes)
}

fn check_magic(kind: &str, bytes: &[u8], header_len: usize, dims: u8) -> Result<()> {
    if bytes.len() < header_len {
        return Err(NetError::DataFormat(format!(
            "IDX {kind} file too short: expected at least {header_len} header bytes, got {}.",
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(NetError::DataFormat(format!(
            "IDX {kind} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(NetError::DataFormat(format!(
            "IDX {kind} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(NetError::DataFormat(format!(
            "IDX {kind} file: byte 3 (dimensions) must be {dims}, got {}.",
            bytes[3]
        )));
    }
    Ok(())
}

fn read_be_u32(bytes: &[u8], at: usize) -> usize {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]) as usize
}
