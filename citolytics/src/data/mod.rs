pub mod document;
pub mod pair;
pub mod scored;
