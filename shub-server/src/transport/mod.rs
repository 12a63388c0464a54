mod room_index;

pub use room_index::*;
