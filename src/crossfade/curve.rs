use serde::{Deserialize, Serialize};

/// A single `(input, output)` key of a [`ResponseCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Input position (0.0 - 1.0)
    pub input: f32,
    /// Motor response at `input`
    pub output: f32,
}

impl CurveKey {
    /// Create a curve key.
    pub fn new(input: f32, output: f32) -> Self {
        Self { input, output }
    }
}

/// Piecewise-linear motor response curve.
///
/// Keys are kept sorted by input. Evaluation clamps to the first and last
/// key outside their range; an empty curve is the identity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct ResponseCurve {
    keys: Vec<CurveKey>,
}

impl ResponseCurve {
    /// Build a curve from keys in any order. Non-finite keys are discarded.
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.retain(|k| k.input.is_finite() && k.output.is_finite());
        keys.sort_by(|a, b| a.input.total_cmp(&b.input));
        Self { keys }
    }

    /// Sorted keys.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `x`, clamping the result to `[0, 1]`.
    pub fn evaluate(&self, x: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return x.clamp(0.0, 1.0);
        };

        let y = if x <= first.input {
            first.output
        } else if x >= last.input {
            last.output
        } else {
            // `partition_point` finds the first key strictly right of x.
            let upper = self.keys.partition_point(|k| k.input <= x);
            let (a, b) = (self.keys[upper - 1], self.keys[upper]);
            let span = b.input - a.input;
            if span <= f32::EPSILON {
                b.output
            } else {
                a.output + (b.output - a.output) * ((x - a.input) / span)
            }
        };
        y.clamp(0.0, 1.0)
    }
}

impl From<Vec<CurveKey>> for ResponseCurve {
    fn from(keys: Vec<CurveKey>) -> Self {
        Self::new(keys)
    }
}

impl From<ResponseCurve> for Vec<CurveKey> {
    fn from(curve: ResponseCurve) -> Self {
        curve.keys
    }
}
