/// Guards against division by zero for all-zero vectors
pub const EPSILON: f32 = 1e-8;

/// Compute cosine similarity between two vectors of equal length.
///
/// Returns a value in [-1, 1] where 1 means identical direction. A zero
/// vector scores 0 against everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot / (norm_a * norm_b + EPSILON)
}
