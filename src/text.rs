pub(crate) mod builtin;
pub(crate) mod fonts;
pub(crate) mod shape;
