pub mod blur;
pub mod draw;
pub mod surface;
