use once_cell::sync::Lazy;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub graphql: GraphQlConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the discrete parts below.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct GraphQlConfig {
    pub max_depth: usize,
    pub enable_playground: bool,
    pub enable_introspection: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment-specific defaults first, then specific env vars on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.server.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DB_HOST") {
            self.database.host = v;
        }
        if let Ok(v) = env::var("DB_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Ok(v) = env::var("DB_USER") {
            self.database.user = v;
        }
        if let Ok(v) = env::var("DB_PASSWORD") {
            self.database.password = v;
        }
        if let Ok(v) = env::var("DB_NAME") {
            self.database.name = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT") {
            self.database.connect_timeout_secs =
                v.parse().unwrap_or(self.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_IDLE_TIMEOUT") {
            self.database.idle_timeout_secs = v.parse().unwrap_or(self.database.idle_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ISSUER") {
            self.security.jwt_issuer = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        // GraphQL overrides
        if let Ok(v) = env::var("GRAPHQL_MAX_DEPTH") {
            self.graphql.max_depth = v.parse().unwrap_or(self.graphql.max_depth);
        }
        if let Ok(v) = env::var("GRAPHQL_ENABLE_PLAYGROUND") {
            self.graphql.enable_playground = v.parse().unwrap_or(self.graphql.enable_playground);
        }
        if let Ok(v) = env::var("GRAPHQL_ENABLE_INTROSPECTION") {
            self.graphql.enable_introspection =
                v.parse().unwrap_or(self.graphql.enable_introspection);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 4000,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
            database: DatabaseConfig::default(),
            security: SecurityConfig {
                jwt_secret: "ecogov-dev-secret".to_string(),
                jwt_issuer: "ecogov-api".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                bcrypt_cost: 10,
            },
            graphql: GraphQlConfig {
                max_depth: 15,
                enable_playground: true,
                enable_introspection: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 4000,
                cors_origins: vec!["https://staging.ecogov.example".to_string()],
            },
            database: DatabaseConfig {
                max_connections: 20,
                connect_timeout_secs: 10,
                ..DatabaseConfig::default()
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_issuer: "ecogov-api".to_string(),
                jwt_expiry_hours: 24,
                bcrypt_cost: 12,
            },
            graphql: GraphQlConfig {
                max_depth: 15,
                enable_playground: true,
                enable_introspection: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 4000,
                cors_origins: vec!["https://app.ecogov.example".to_string()],
            },
            database: DatabaseConfig {
                max_connections: 50,
                connect_timeout_secs: 5,
                ..DatabaseConfig::default()
            },
            security: SecurityConfig {
                jwt_secret: String::new(), // must come from JWT_SECRET
                jwt_issuer: "ecogov-api".to_string(),
                jwt_expiry_hours: 4,
                bcrypt_cost: 12,
            },
            graphql: GraphQlConfig {
                max_depth: 7,
                enable_playground: false,
                enable_introspection: false,
            },
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "ecogov".to_string(),
            max_connections: 10,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

// Global config - read once from the process environment at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert!(config.graphql.enable_playground);
        assert!(config.graphql.enable_introspection);
        assert_eq!(config.security.bcrypt_cost, 10);
        assert!(!config.is_production());
    }

    #[test]
    fn production_defaults() {
        let config = AppConfig::production();
        assert!(!config.graphql.enable_playground);
        assert!(!config.graphql.enable_introspection);
        assert_eq!(config.security.jwt_expiry_hours, 4);
        assert!(config.is_production());
    }
}
