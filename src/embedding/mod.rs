// Sentence embedding — turning messages into vectors.

pub mod download;
pub mod onnx;
pub mod traits;
