pub(crate) mod composite;
pub(crate) mod placement;
pub(crate) mod sticker;
pub(crate) mod surface;
