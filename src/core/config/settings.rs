use super::parsing::{
    env_optional, env_or_default, is_supported_source_extension, parse_bool, parse_cors_origins,
    parse_environment, parse_string_list, parse_u16, parse_u32, parse_u64, parse_usize,
    DEFAULT_SOURCE_EXTENSIONS,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AiSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, DatalabSettings,
    QuizSettings, RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort,
    ServerSettings, Settings, StorageSettings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("QUIZMAN_HOST", "0.0.0.0");
        let port = env_or_default("QUIZMAN_PORT", "8000");

        let environment =
            parse_environment(env_optional("QUIZMAN_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("QUIZMAN_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Quizman API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };

        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "1440"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");
        let auth_rate_limit_per_minute = parse_u64(
            "AUTH_RATE_LIMIT_PER_MINUTE",
            env_or_default("AUTH_RATE_LIMIT_PER_MINUTE", "20"),
        )?;
        let generation_rate_limit_per_minute = parse_u64(
            "GENERATION_RATE_LIMIT_PER_MINUTE",
            env_or_default("GENERATION_RATE_LIMIT_PER_MINUTE", "10"),
        )?;

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "quizman");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "quizman_db");
        let database_url = env_optional("DATABASE_URL");
        let max_connections =
            parse_u32("DB_MAX_CONNECTIONS", env_or_default("DB_MAX_CONNECTIONS", "10"))?;

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let openai_api_key = env_or_default("OPENAI_API_KEY", "");
        let openai_base_url = env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
        let ai_model = env_or_default("AI_MODEL", "gpt-4o-mini");
        let ai_max_tokens = parse_u32("AI_MAX_TOKENS", env_or_default("AI_MAX_TOKENS", "4000"))?;
        let ai_request_timeout =
            parse_u64("AI_REQUEST_TIMEOUT", env_or_default("AI_REQUEST_TIMEOUT", "60"))?;

        let datalab_api_key = env_or_default("DATALAB_API_KEY", "");
        let datalab_base_url = env_or_default("DATALAB_BASE_URL", "https://www.datalab.to/api/v1");
        let datalab_mode = env_or_default("DATALAB_MODE", "accurate").to_ascii_lowercase();
        let datalab_timeout_seconds =
            parse_u64("DATALAB_TIMEOUT_SECONDS", env_or_default("DATALAB_TIMEOUT_SECONDS", "120"))?;
        let datalab_poll_interval_seconds = parse_u64(
            "DATALAB_POLL_INTERVAL_SECONDS",
            env_or_default("DATALAB_POLL_INTERVAL_SECONDS", "2"),
        )?;
        let datalab_max_poll_attempts = parse_u32(
            "DATALAB_MAX_POLL_ATTEMPTS",
            env_or_default("DATALAB_MAX_POLL_ATTEMPTS", "60"),
        )?;

        let max_upload_size_mb =
            parse_u64("MAX_UPLOAD_SIZE_MB", env_or_default("MAX_UPLOAD_SIZE_MB", "10"))?;
        let allowed_source_extensions = parse_string_list(
            env_optional("ALLOWED_SOURCE_EXTENSIONS"),
            DEFAULT_SOURCE_EXTENSIONS,
        );

        let max_source_chars =
            parse_usize("MAX_SOURCE_CHARS", env_or_default("MAX_SOURCE_CHARS", "10000"))?;
        let max_generated_questions = parse_u32(
            "MAX_GENERATED_QUESTIONS",
            env_or_default("MAX_GENERATED_QUESTIONS", "50"),
        )?;

        let log_level = env_or_default("QUIZMAN_LOG_LEVEL", "info");
        let json = env_optional("QUIZMAN_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings {
                secret_key,
                access_token_expire_minutes,
                algorithm,
                auth_rate_limit_per_minute,
                generation_rate_limit_per_minute,
            },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            ai: AiSettings {
                openai_api_key,
                openai_base_url,
                ai_model,
                ai_max_tokens,
                ai_request_timeout,
            },
            datalab: DatalabSettings {
                api_key: datalab_api_key,
                base_url: datalab_base_url,
                mode: datalab_mode,
                timeout_seconds: datalab_timeout_seconds,
                poll_interval_seconds: datalab_poll_interval_seconds,
                max_poll_attempts: datalab_max_poll_attempts,
            },
            storage: StorageSettings { max_upload_size_mb, allowed_source_extensions },
            quiz: QuizSettings { max_source_chars, max_generated_questions },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn ai(&self) -> &AiSettings {
        &self.ai
    }

    pub(crate) fn datalab(&self) -> &DatalabSettings {
        &self.datalab
    }

    pub(crate) fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub(crate) fn quiz(&self) -> &QuizSettings {
        &self.quiz
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.allowed_source_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_SOURCE_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }

        for extension in &self.storage.allowed_source_extensions {
            if !is_supported_source_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "ALLOWED_SOURCE_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        if self.storage.max_upload_size_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_UPLOAD_SIZE_MB",
                value: self.storage.max_upload_size_mb.to_string(),
            });
        }

        if self.quiz.max_source_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_SOURCE_CHARS",
                value: self.quiz.max_source_chars.to_string(),
            });
        }

        if self.quiz.max_generated_questions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_GENERATED_QUESTIONS",
                value: self.quiz.max_generated_questions.to_string(),
            });
        }

        if !matches!(self.datalab.mode.as_str(), "fast" | "balanced" | "accurate") {
            return Err(ConfigError::InvalidValue {
                field: "DATALAB_MODE",
                value: self.datalab.mode.clone(),
            });
        }

        if self.datalab.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATALAB_POLL_INTERVAL_SECONDS",
                value: self.datalab.poll_interval_seconds.to_string(),
            });
        }

        if self.datalab.max_poll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATALAB_MAX_POLL_ATTEMPTS",
                value: self.datalab.max_poll_attempts.to_string(),
            });
        }

        if self.security.algorithm != "HS256" {
            return Err(ConfigError::InvalidValue {
                field: "ALGORITHM",
                value: self.security.algorithm.clone(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.ai.openai_api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY is empty; question generation will use the fallback set");
        }
        if self.datalab.api_key.is_empty() {
            tracing::warn!("DATALAB_API_KEY is empty; PDF and image sources will not be read");
        }

        Ok(())
    }
}
