mod parse;
mod types;
mod validate;
mod yaml_decode;

pub use types::*;

pub(crate) use parse::parse_config;
pub(crate) use validate::validate_config;

use std::path::{Path, PathBuf};

pub fn resolve_local_path(config_dir: &Path, raw_path: &str) -> PathBuf {
    let path = Path::new(raw_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}
