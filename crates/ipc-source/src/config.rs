use std::{path::PathBuf, time::Duration};

use url::Url;

pub const DEFAULT_CSV_URL: &str = "https://infra.datos.gob.ar/catalog/sspm/dataset/145/distribution/145.3/download/indice-precios-al-consumidor-nivel-general-base-diciembre-2016-mensual.csv";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Where and how the dataset is fetched. Built once at startup.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: Url,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
}
