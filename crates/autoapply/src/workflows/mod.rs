pub mod automation;
pub mod matching;
