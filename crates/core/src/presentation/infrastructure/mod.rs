pub mod image_sequence_renderer;
