pub mod cli;
pub mod credentials;
