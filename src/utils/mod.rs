pub mod csvio;
pub mod username_lookup;
