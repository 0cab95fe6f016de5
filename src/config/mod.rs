use serde::Deserialize;

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_owned()
}

#[derive(Deserialize)]
pub struct Cfg {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// When unset the app runs on the in-memory store.
    #[serde(default)]
    pub database_url: Option<String>,
}
