pub mod builders;

pub use builders::{ProjectBuilder, TestProject};
