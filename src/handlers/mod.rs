pub mod analytics;
pub mod categories;
pub mod entries;
pub mod health;
pub mod moods;
pub mod search;
pub mod settings;
pub mod streaks;
pub mod tags;
