pub mod context;
pub mod extrema;
pub mod levels;
pub mod risk;
pub mod sessions;
