mod utils;

pub(crate) use self::utils::{document, read_fixture};
