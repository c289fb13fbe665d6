pub mod camera;
pub mod math;
pub mod postprocess;
pub mod raster;
pub mod scene;
pub mod solver;
pub mod spectrum;
pub mod transfer;
