//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the `/dfysign` check-in routes so the
//! front-end can be built against it without a running server.
//!
//! Usage: `openapi [OUTPUT]`, writing `openapi.json` when no path is given.

use api_lib::{error::ApiError, web::rest::ApiDoc};
use std::path::{Path, PathBuf};
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

/// Writes the document to `path` and returns how many routes it describes.
fn write_document(path: &Path) -> Result<usize, ApiError> {
    let doc = ApiDoc::openapi();
    let json = doc.to_pretty_json().map_err(std::io::Error::from)?;
    std::fs::write(path, json)?;
    Ok(doc.paths.paths.len())
}

fn main() -> Result<(), ApiError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let routes = write_document(&path)?;
    println!("OpenAPI document for {} check-in routes written to {}", routes, path.display());
    Ok(())
}
