//! Digit corpus loading, generation, and flattening.
use std::path::Path;

use ndarray::{Array2, Array3, ArrayViewMut2, Axis};

use crate::error::{Error, Result};
use crate::utils::{argmax, one_hot};

pub const IMAGE_WIDTH: usize = 28;
pub const IMAGE_HEIGHT: usize = 28;
pub const IMAGE_SIZE: usize = IMAGE_WIDTH * IMAGE_HEIGHT;
pub const NUM_CLASSES: usize = 10;

/// Named dataset split, selecting the backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    fn file_name(&self) -> &'static str {
        match self {
            Split::Train => "digits-train.csv",
            Split::Test => "digits-test.csv",
        }
    }
}

/// In-memory digit dataset: images as an (n, 28, 28) stack of intensities in
/// [0, 1], labels as an (n, 10) one-hot matrix, index-aligned with the images.
#[derive(Debug, Clone)]
pub struct DigitsDataset {
    pub images: Array3<f32>,
    pub labels: Array2<f32>,
}

impl DigitsDataset {
    /// Reads a split from `dir`. Each CSV record is an integer class label
    /// followed by 784 row-major pixel values in [0, 1].
    pub fn load(dir: &Path, split: Split) -> Result<Self> {
        let path = dir.join(split.file_name());
        if !path.exists() {
            return Err(Error::DataUnavailable(format!(
                "dataset file not found: {}",
                path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&path)?;

        let mut pixels = Vec::new();
        let mut classes = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() != IMAGE_SIZE + 1 {
                return Err(Error::DataUnavailable(format!(
                    "malformed record in {}: expected {} fields, found {}",
                    path.display(),
                    IMAGE_SIZE + 1,
                    record.len()
                )));
            }
            let class: usize = record[0].trim().parse().map_err(|_| {
                Error::DataUnavailable(format!("unparsable label in {}", path.display()))
            })?;
            if class >= NUM_CLASSES {
                return Err(Error::DataUnavailable(format!(
                    "label {} out of range in {}",
                    class,
                    path.display()
                )));
            }
            classes.push(class);
            for field in record.iter().skip(1) {
                let value: f32 = field.trim().parse().map_err(|_| {
                    Error::DataUnavailable(format!("unparsable pixel in {}", path.display()))
                })?;
                pixels.push(value);
            }
        }

        let count = classes.len();
        let images = Array3::from_shape_vec((count, IMAGE_HEIGHT, IMAGE_WIDTH), pixels)
            .map_err(|e| Error::DataUnavailable(e.to_string()))?;
        Ok(DigitsDataset {
            images,
            labels: one_hot(NUM_CLASSES, &classes),
        })
    }

    /// Writes the split in the format `load` reads, so a generated corpus
    /// can be materialized once and reused as the fixed backing resource.
    pub fn save(&self, dir: &Path, split: Split) -> Result<()> {
        let path = dir.join(split.file_name());
        let mut writer = csv::Writer::from_path(&path)?;
        for (image, label) in self.images.outer_iter().zip(self.labels.outer_iter()) {
            let mut record = Vec::with_capacity(IMAGE_SIZE + 1);
            record.push(argmax(label).to_string());
            for &pixel in image.iter() {
                record.push(pixel.to_string());
            }
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Deterministic synthetic corpus: seven-segment digit glyphs jittered
    /// by up to two pixels and perturbed with uniform pixel noise, all
    /// derived from the explicit seed. `synthetic(500, seed)` produces the
    /// fixed 5,000-example split used by the walkthrough.
    pub fn synthetic(per_class: usize, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let count = per_class * NUM_CLASSES;
        let mut images = Array3::zeros((count, IMAGE_HEIGHT, IMAGE_WIDTH));
        let mut classes = Vec::with_capacity(count);

        let mut index = 0;
        for digit in 0..NUM_CLASSES {
            for _ in 0..per_class {
                let dx = rng.i32(-2..=2);
                let dy = rng.i32(-2..=2);
                let mut view = images.index_axis_mut(Axis(0), index);
                draw_glyph(digit, dx, dy, &mut view);
                for value in view.iter_mut() {
                    let noise = (rng.f32() - 0.5) * 0.2;
                    *value = (*value + noise).clamp(0.0, 1.0);
                }
                classes.push(digit);
                index += 1;
            }
        }

        DigitsDataset {
            images,
            labels: one_hot(NUM_CLASSES, &classes),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens each 28x28 image into a 784-wide row. The ordering is
    /// row-major: pixel (r, c) lands at column `r * IMAGE_WIDTH + c`. Every
    /// stage of the pipeline relies on this fixed ordering to keep weight
    /// dimensions consistent.
    pub fn flattened(&self) -> Array2<f32> {
        Array2::from_shape_fn((self.len(), IMAGE_SIZE), |(i, k)| {
            self.images[[i, k / IMAGE_WIDTH, k % IMAGE_WIDTH]]
        })
    }
}

// Segment extents as (row0, row1, col0, col1), half-open.
const SEGMENTS: [(usize, usize, usize, usize); 7] = [
    (4, 7, 8, 20),    // top
    (4, 14, 17, 20),  // upper right
    (14, 24, 17, 20), // lower right
    (21, 24, 8, 20),  // bottom
    (14, 24, 8, 11),  // lower left
    (4, 14, 8, 11),   // upper left
    (13, 16, 8, 20),  // middle
];

const DIGIT_SEGMENTS: [[bool; 7]; 10] = [
    [true, true, true, true, true, true, false],    // 0
    [false, true, true, false, false, false, false], // 1
    [true, true, false, true, true, false, true],   // 2
    [true, true, true, true, false, false, true],   // 3
    [false, true, true, false, false, true, true],  // 4
    [true, false, true, true, false, true, true],   // 5
    [true, false, true, true, true, true, true],    // 6
    [true, true, true, false, false, false, false], // 7
    [true, true, true, true, true, true, true],     // 8
    [true, true, true, true, false, true, true],    // 9
];

fn draw_glyph(digit: usize, dx: i32, dy: i32, image: &mut ArrayViewMut2<f32>) {
    for (segment, &on) in DIGIT_SEGMENTS[digit].iter().enumerate() {
        if !on {
            continue;
        }
        let (r0, r1, c0, c1) = SEGMENTS[segment];
        for row in r0..r1 {
            for col in c0..c1 {
                let r = row as i32 + dy;
                let c = col as i32 + dx;
                if (0..IMAGE_HEIGHT as i32).contains(&r) && (0..IMAGE_WIDTH as i32).contains(&c) {
                    image[[r as usize, c as usize]] = 1.0;
                }
            }
        }
    }
}
