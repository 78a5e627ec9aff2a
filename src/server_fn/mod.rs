mod generation_mode;

pub use generation_mode::*;
