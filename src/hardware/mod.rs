pub mod indicator;

pub use indicator::RgbIndicator;
