mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use types::{
    AiSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, DatalabSettings,
    Environment, QuizSettings, RedisSettings, RuntimeSettings, SecuritySettings, Settings,
    StorageSettings, TelemetrySettings,
};
