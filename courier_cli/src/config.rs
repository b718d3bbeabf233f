use std::path::{Path, PathBuf};

use courier_matrix_providers::cache::{GEOCODE_CACHE_FILE, MATRIX_CACHE_FILE};

pub const BING_API_KEY_ENV_VAR: &str = "COURIER_BING_API_KEY";
pub const GOOGLE_API_KEY_ENV_VAR: &str = "COURIER_GOOGLE_API_KEY";
pub const CACHE_FOLDER_ENV_VAR: &str = "COURIER_CACHE_FOLDER";

/// Settings read from the environment, after `.env` files were loaded.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub bing_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub cache_folder: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            bing_api_key: non_empty_var(BING_API_KEY_ENV_VAR),
            google_api_key: non_empty_var(GOOGLE_API_KEY_ENV_VAR),
            cache_folder: non_empty_var(CACHE_FOLDER_ENV_VAR).map(PathBuf::from),
        }
    }

    pub fn geocode_cache_path(&self) -> Option<PathBuf> {
        self.cache_path(GEOCODE_CACHE_FILE)
    }

    pub fn matrix_cache_path(&self) -> Option<PathBuf> {
        self.cache_path(MATRIX_CACHE_FILE)
    }

    fn cache_path(&self, file_name: &str) -> Option<PathBuf> {
        self.cache_folder
            .as_deref()
            .map(|folder: &Path| folder.join(file_name))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
