pub(crate) mod exif;
pub(crate) mod jpeg;
pub(crate) mod splice;
