pub mod labels;
pub mod streak;
