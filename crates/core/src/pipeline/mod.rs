pub mod annotate_stream_use_case;
pub mod config;
pub mod frame_processor;
pub mod infrastructure;
pub mod pipeline_observer;
