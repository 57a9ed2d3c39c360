//! Process configuration.
//!
//! Sources, later ones winning: built-in defaults, an optional `shelf.toml` in
//! the working directory, then `SHELF_`-prefixed environment variables
//! (`SHELF_ADDR`, `SHELF_CATALOG_PATH`, `SHELF_TEMPLATE_PATH`).

use std::net::SocketAddr;
use std::path::PathBuf;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Config {
    /// Listen address.
    #[serde(default = "default_addr")]
    pub addr: SocketAddr,
    /// JSON item file, read once at startup.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// Page template, read on every request to `/`.
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data.json")
}

fn default_template_path() -> PathBuf {
    PathBuf::from("templates/index.html")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            catalog_path: default_catalog_path(),
            template_path: default_template_path(),
        }
    }
}

impl Config {
    /// Loads from `shelf.toml` and the environment.
    pub fn load() -> Result<Self, Error> {
        Self::from_figment(
            Self::figment()
                .merge(Toml::file("shelf.toml"))
                .merge(Env::prefixed("SHELF_")),
        )
    }

    /// Defaults only, as the base layer for further providers.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, Error> {
        Ok(figment.extract()?)
    }
}
