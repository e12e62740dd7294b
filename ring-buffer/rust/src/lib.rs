pub mod ring_buffer;
pub mod storage;
pub mod terminal;

pub use ring_buffer::{RingBuffer, RingBufferError};
