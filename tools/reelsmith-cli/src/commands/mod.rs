pub mod captions;
pub mod check;
pub mod generate;
