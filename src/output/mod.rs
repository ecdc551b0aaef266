// Output formatting for extraction results.

pub mod terminal;
