pub mod annotator;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod layout;
pub mod replace;
pub mod restore;
pub mod scanner;
pub mod session;
pub mod tooltip;
pub mod vocabulary;
pub mod watcher;

#[cfg(test)]
mod tests;
