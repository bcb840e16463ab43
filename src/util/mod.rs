pub mod cli;
pub mod random;
pub mod url;
