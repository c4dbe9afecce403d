pub mod category;
pub mod entry;
pub mod mood;
pub mod profile;
pub mod streak;
pub mod tag;
