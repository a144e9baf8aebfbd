//! Core type definitions used across the FileRepo workspace.

pub mod stream;

pub use stream::{ByteStream, byte_stream_from};
