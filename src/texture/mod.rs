//! Pixel-level helpers for sprite images. Rasterization itself lives outside the core.

pub mod outline;
