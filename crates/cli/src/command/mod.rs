pub mod references;
pub mod render;
