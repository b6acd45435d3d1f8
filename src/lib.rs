//! ragchat library exports for testing

pub mod core;
pub mod generation;
pub mod tui;

#[cfg(test)]
mod test_support;
