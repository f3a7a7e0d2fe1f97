use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use crate::{error::AppError, models::comments::ComplaintId};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub enum StorageSettings {
    Postgres(DatabaseSettings),
    Memory { complaint_ids: Vec<ComplaintId> },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub storage: StorageSettings,
    pub jwt_secret: String,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let host = match env::var("HOST") {
            Ok(value) => value
                .parse::<IpAddr>()
                .map_err(|err| AppError::Internal(format!("HOST invalid: {}", err)))?,
            Err(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = read_env_parsed::<u16>("PORT")?.unwrap_or(DEFAULT_PORT);

        let storage = match parse_backend(env::var("STORAGE_BACKEND").ok().as_deref())? {
            StorageBackend::Postgres => StorageSettings::Postgres(DatabaseSettings::from_env()?),
            StorageBackend::Memory => StorageSettings::Memory {
                complaint_ids: parse_complaint_ids(
                    &env::var("MEMORY_COMPLAINT_IDS").unwrap_or_default(),
                )?,
            },
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|err| AppError::Internal(format!("JWT_SECRET missing: {}", err)))?;
        let cors_origin =
            env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

        Ok(Self {
            addr: SocketAddr::new(host, port),
            storage,
            jwt_secret,
            cors_origin,
        })
    }
}

impl DatabaseSettings {
    fn from_env() -> Result<Self, AppError> {
        let url = env::var("DATABASE_URL")
            .map_err(|err| AppError::Internal(format!("DATABASE_URL missing: {}", err)))?;

        Ok(Self {
            url,
            max_connections: read_env_parsed("DATABASE_MAX_CONNECTIONS")?.unwrap_or(20),
            min_connections: read_env_parsed("DATABASE_MIN_CONNECTIONS")?.unwrap_or(5),
            acquire_timeout: Duration::from_secs(
                read_env_parsed("DATABASE_ACQUIRE_TIMEOUT_SECS")?.unwrap_or(15),
            ),
            run_migrations: read_env_parsed("DATABASE_RUN_MIGRATIONS")?.unwrap_or(false),
        })
    }
}

fn read_env_parsed<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| AppError::Internal(format!("{key} invalid: {err}"))),
        Err(_) => Ok(None),
    }
}

fn parse_backend(value: Option<&str>) -> Result<StorageBackend, AppError> {
    match value.map(str::trim) {
        None | Some("") | Some("postgres") => Ok(StorageBackend::Postgres),
        Some("memory") => Ok(StorageBackend::Memory),
        Some(other) => Err(AppError::Internal(format!(
            "STORAGE_BACKEND must be 'postgres' or 'memory', got '{other}'"
        ))),
    }
}

fn parse_complaint_ids(value: &str) -> Result<Vec<ComplaintId>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            ComplaintId::parse(part).ok_or_else(|| {
                AppError::Internal(format!("MEMORY_COMPLAINT_IDS has invalid id '{part}'"))
            })
        })
        .collect()
}
