pub(crate) mod blur;
pub(crate) mod color;
pub(crate) mod comments;
pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod surface;
pub(crate) mod text;
