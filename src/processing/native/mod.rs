//! In-process image processing via the `image` crate.
//!
//! - [`NativeCompressor`]: the [`Compressor`](crate::processing::Compressor) backend.
//! - `resize`: fits images within the configured max dimension.
//! - `formats`: maps the quality setting to per-format encoder options.

mod executor;
mod formats;
mod resize;

pub use executor::NativeCompressor;
