#![cfg(feature = "backend-darknet")]

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use opencv::core::{Mat, Scalar, Size, Vector, CV_32F};
use opencv::dnn;
use opencv::prelude::*;

use crate::detect::assets::ModelAssets;
use crate::detect::result::RawCandidate;
use crate::detect::Detector;

/// Fixed network input geometry. Frames of any size are resized into this
/// square by `blob_from_image`; boxes are decoded back into source pixels.
const INPUT_SIZE: i32 = 416;

/// Darknet-format detector running on the OpenCV dnn module.
///
/// Loads the weights/config pair once at startup and keeps the resolved
/// output layer names for the forward pass. Load failures are fatal; the
/// process must not start without a usable network.
pub struct DarknetDetector {
    net: dnn::Net,
    output_names: Vector<String>,
    num_classes: usize,
}

impl DarknetDetector {
    pub fn load(assets: &ModelAssets) -> Result<Self> {
        let config = assets.config.to_string_lossy().into_owned();
        let weights = assets.weights.to_string_lossy().into_owned();

        let mut net = dnn::read_net_from_darknet(&config, &weights)
            .with_context(|| format!("failed to load darknet network from {}", config))?;
        net.set_preferable_backend(dnn::DNN_BACKEND_OPENCV)
            .context("failed to select dnn backend")?;
        net.set_preferable_target(dnn::DNN_TARGET_CPU)
            .context("failed to select dnn target")?;
        let output_names = net
            .get_unconnected_out_layers_names()
            .context("failed to resolve network output layers")?;

        Ok(Self {
            net,
            output_names,
            num_classes: assets.class_names.len(),
        })
    }

    /// Collapse one output row to a candidate in source-pixel space.
    ///
    /// Row layout is `[cx, cy, w, h, objectness, class scores...]` with
    /// geometry normalized to the source frame. The per-class score vector
    /// collapses to the maximum-confidence class, ties to the lowest index.
    fn decode_row(&self, row: &[f32], width: f32, height: f32) -> RawCandidate {
        let mut class_id = 0;
        let mut confidence = row[5];
        for (index, score) in row[5..].iter().enumerate().skip(1) {
            if *score > confidence {
                confidence = *score;
                class_id = index;
            }
        }
        RawCandidate {
            class_id,
            confidence,
            cx: row[0] * width,
            cy: row[1] * height,
            w: row[2] * width,
            h: row[3] * height,
        }
    }
}

impl Detector for DarknetDetector {
    fn infer(&mut self, frame: &RgbImage) -> Result<Vec<RawCandidate>> {
        let (width, height) = frame.dimensions();
        let flat = Mat::from_slice(frame.as_raw()).context("failed to wrap frame pixels")?;
        let pixels = flat
            .reshape(3, height as i32)
            .context("failed to shape frame matrix")?;

        // Frames are already RGB, so no channel swap on blob conversion.
        let blob = dnn::blob_from_image(
            &pixels,
            1.0 / 255.0,
            Size::new(INPUT_SIZE, INPUT_SIZE),
            Scalar::default(),
            false,
            false,
            CV_32F,
        )
        .context("failed to build network input blob")?;
        self.net
            .set_input(&blob, "", 1.0, Scalar::default())
            .context("failed to set network input")?;

        let mut outputs = Vector::<Mat>::new();
        self.net
            .forward(&mut outputs, &self.output_names)
            .context("network forward pass failed")?;

        let expected_cols = 5 + self.num_classes;
        let mut candidates = Vec::new();
        for output in outputs.iter() {
            if output.cols() as usize != expected_cols {
                return Err(anyhow!(
                    "network output has {} columns, expected {} for the loaded class table",
                    output.cols(),
                    expected_cols
                ));
            }
            for row_index in 0..output.rows() {
                let row = output
                    .at_row::<f32>(row_index)
                    .context("network output tensor was not f32")?;
                candidates.push(self.decode_row(row, width as f32, height as f32));
            }
        }
        Ok(candidates)
    }
}
