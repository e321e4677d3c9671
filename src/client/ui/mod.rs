//! Client screens.

mod chat;
mod landing;
mod quiz;
mod render;
mod results;
mod summary;
mod upload;

pub use render::render;
