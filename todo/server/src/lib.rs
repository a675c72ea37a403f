pub mod config {
    use serde::Deserialize;

    /// Deployment environment the server runs in.
    #[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum Environment {
        Development,
        #[default]
        Production,
    }

    impl Environment {
        /// Whether error responses carry the underlying failure text.
        pub fn verbose_errors(self) -> bool {
            self == Environment::Development
        }

        /// Whether JSON response bodies are pretty-printed.
        pub fn pretty_json(self) -> bool {
            self == Environment::Development
        }

        pub fn log_level(self) -> tracing::Level {
            match self {
                Environment::Development => tracing::Level::DEBUG,
                Environment::Production => tracing::Level::INFO,
            }
        }
    }

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default)]
        pub environment: Environment,
        #[serde(default = "default_allowed_origin")]
        pub allowed_origin: String,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            Self::from_settings(settings)
        }

        fn from_settings(settings: config::Config) -> anyhow::Result<Self> {
            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_allowed_origin() -> String {
        "http://localhost:5174".to_string()
    }

}
pub mod entities;
pub mod todo;
pub mod web;
