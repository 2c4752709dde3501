pub mod capture_loop;
pub mod presentation_loop;
