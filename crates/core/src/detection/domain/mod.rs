pub mod detection;
pub mod detector;
