pub(crate) mod decode;
pub(crate) mod font;
pub(crate) mod source;
pub(crate) mod text;
