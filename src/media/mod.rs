pub mod index;
pub mod mime;
pub mod upload;
