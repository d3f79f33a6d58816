//! Layer compositing, the drawing surface and image encoding.

pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod encode;
pub(crate) mod surface;
