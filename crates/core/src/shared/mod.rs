pub mod constants;
pub mod frame;
pub mod frame_slot;
