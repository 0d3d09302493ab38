// Domain layer - Core clip and playback logic

pub mod errors;
pub mod model;
pub mod rules;
