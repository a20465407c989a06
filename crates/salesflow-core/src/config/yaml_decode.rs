use std::path::Path;

use yaml_rust2::yaml::Hash;
use yaml_rust2::{Yaml, YamlLoader};

use crate::{ConfigError, SalesflowResult};

pub(crate) fn load_yaml(path: &Path) -> SalesflowResult<Vec<Yaml>> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        Box::new(ConfigError(format!(
            "failed to read config at {}: {err}",
            path.display()
        )))
    })?;
    let docs = YamlLoader::load_from_str(&contents)?;
    Ok(docs)
}

pub(crate) fn yaml_hash<'a>(value: &'a Yaml, ctx: &str) -> SalesflowResult<&'a Hash> {
    match value {
        Yaml::Hash(hash) => Ok(hash),
        _ => Err(Box::new(ConfigError(format!("expected map at {ctx}")))),
    }
}

pub(crate) fn yaml_string(value: &Yaml, ctx: &str) -> SalesflowResult<String> {
    match value {
        Yaml::String(value) => Ok(value.clone()),
        Yaml::Integer(value) => Ok(value.to_string()),
        Yaml::Real(value) => Ok(value.clone()),
        _ => Err(Box::new(ConfigError(format!("expected string at {ctx}")))),
    }
}

pub(crate) fn hash_get<'a>(hash: &'a Hash, key: &str) -> Option<&'a Yaml> {
    hash.get(&Yaml::String(key.to_string()))
}

pub(crate) fn validate_known_keys(hash: &Hash, ctx: &str, allowed: &[&str]) -> SalesflowResult<()> {
    for key in hash.keys() {
        let name = match key {
            Yaml::String(name) => name.as_str(),
            _ => {
                return Err(Box::new(ConfigError(format!(
                    "expected string keys at {ctx}"
                ))))
            }
        };
        if !allowed.contains(&name) {
            return Err(Box::new(ConfigError(format!(
                "unknown field {ctx}.{name} (allowed: {})",
                allowed.join(", ")
            ))));
        }
    }
    Ok(())
}
