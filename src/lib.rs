pub mod config;
pub mod ir;
pub mod mangle;
pub mod relationship;
pub mod schema;
pub mod serializer;
pub mod sql;

use wasm_bindgen::prelude::*;

use config::Config;
use ir::GenerationIR;
use sql::{Dialect, LoadError, load_schema};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Load a schema dump and build the generation IR for it.
///
/// An `Auto` dialect in `config` is resolved against `source` first.
pub fn generate(source: &str, config: &mut Config) -> Result<GenerationIR, LoadError> {
    config.dialect = config.dialect.resolve(source);
    let schema = load_schema(source, config.dialect)?;
    Ok(GenerationIR::from_schema(&schema, config)?)
}

/// Describe the code generation facts for a SQL schema dump
#[wasm_bindgen(js_name = "describeSchema")]
pub fn describe_schema(source: &str, dialect: Option<String>) -> Result<String, String> {
    let dialect = match dialect.as_deref() {
        Some(name) => Dialect::from_str(name).ok_or_else(|| format!("Unknown dialect: {}", name))?,
        None => Dialect::Auto,
    };
    let mut config = Config {
        dialect,
        ..Config::default()
    };

    let ir = generate(source, &mut config).map_err(|e| e.to_string())?;
    Ok(serializer::serialize(&ir))
}
