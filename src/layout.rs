pub(crate) mod band;
