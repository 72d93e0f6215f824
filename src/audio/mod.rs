pub mod source;
pub mod time_range;
pub mod trimmer;
