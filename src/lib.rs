// Banter: topic extraction for chat logs.
//
// This is the library root. The pipeline answers one question about a
// batch of messages: what are people talking about?

pub mod config;
pub mod embedding;
pub mod output;
pub mod topics;
