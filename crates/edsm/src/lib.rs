pub mod client;
pub mod retry;

pub use client::EdsmClient;
