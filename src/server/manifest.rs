//! Stremio addon manifest
//!
//! Static JSON descriptor telling the Stremio client which resource types
//! and catalogs this addon provides.

use serde::Serialize;

use crate::resolver::ID_PREFIX;

#[derive(Debug, Serialize)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub catalogs: Vec<Catalog>,
    #[serde(rename = "idPrefixes")]
    pub id_prefixes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Catalog {
    pub r#type: String,
    pub id: String,
    pub name: String,
}

/// Catalog id used in addon routes
pub const CATALOG_ID: &str = "seedr-cloud";

pub fn get_manifest() -> Manifest {
    Manifest {
        id: "org.seedr.stremio".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: "Seedr".to_string(),
        description: "Stream files from your Seedr.cc cloud storage".to_string(),
        resources: vec![
            "catalog".to_string(),
            "meta".to_string(),
            "stream".to_string(),
        ],
        types: vec![
            "movie".to_string(),
            "series".to_string(),
            "other".to_string(),
        ],
        catalogs: vec![Catalog {
            r#type: "other".to_string(),
            id: CATALOG_ID.to_string(),
            name: "Seedr Cloud".to_string(),
        }],
        id_prefixes: vec!["tt".to_string(), ID_PREFIX.to_string()],
    }
}
