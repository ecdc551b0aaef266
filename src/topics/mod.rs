// Topic extraction — clustering, class TF-IDF, and label selection.

pub mod cluster;
pub mod ctfidf;
pub mod label;
pub mod pipeline;
