pub mod vocabulary;
pub mod frequency;
pub mod accumulator;
pub mod pruned;
pub mod options;
pub mod builder;
pub mod parallel;
