pub(crate) mod decode;
pub(crate) mod palette;
pub(crate) mod store;
