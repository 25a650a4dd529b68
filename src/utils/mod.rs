pub mod clock;
pub mod geo;
pub mod lateness;
