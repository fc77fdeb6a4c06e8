/// One raw detector output before filtering and suppression.
///
/// Geometry is a center-point box in source-image pixel units; the adapter
/// decodes model-relative coordinates using the original frame dimensions,
/// so boxes are comparable regardless of the model's fixed input size.
/// Transient: exists only within one post-processing pass.
#[derive(Clone, Copy, Debug)]
pub struct RawCandidate {
    /// Index into the loaded class-name table.
    pub class_id: usize,
    /// Confidence of the winning class at this position.
    pub confidence: f32,
    /// Box center, x.
    pub cx: f32,
    /// Box center, y.
    pub cy: f32,
    /// Box width.
    pub w: f32,
    /// Box height.
    pub h: f32,
}

/// The single best detection of one cycle.
///
/// Immutable once constructed; produced fresh each cycle, never mutated.
/// `x`/`y` are the top-left corner in source-image pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub score: f32,
}
