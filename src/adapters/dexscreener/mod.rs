//! DexScreener market-data adapter

pub mod client;
pub mod types;

pub use client::{DexScreenerClient, DexScreenerConfig};
