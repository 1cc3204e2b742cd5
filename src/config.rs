use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 允许跨域的前端来源，为空时不限制
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

/// 支付凭证上传
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_upload_dir")]
    pub dir: String,
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

fn default_upload_dir() -> String {
    "public/assets/uploads/payments".to_string()
}

fn default_public_prefix() -> String {
    "/assets/uploads/payments".to_string()
}

fn default_max_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_max_dimension() -> u32 {
    1200
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            public_prefix: default_public_prefix(),
            max_bytes: default_max_bytes(),
            max_dimension: default_max_dimension(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 配置文件不存在时完全依赖环境变量
        let file = match std::fs::read_to_string(&config_path) {
            Ok(s) => Some(s),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(format!("无法读取配置文件 {config_path}: {e}").into()),
        };

        Self::load(file.as_deref(), |name| env::var(name).ok())
    }

    /// 由可选的 TOML 文本和变量查找函数构建配置，查找结果总是覆盖文件中的值
    pub fn load(
        file: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        fn parse_var<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            name: &str,
        ) -> Option<T> {
            lookup(name).and_then(|v| v.parse::<T>().ok())
        }

        let mut config: Config = match file {
            Some(config_str) => {
                toml::from_str(config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            None => {
                // 数据库 URL 在无配置文件时必须提供
                let database_url = lookup("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: "0.0.0.0".to_string(),
                        port: 8080,
                        cors_origins: Vec::new(),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: 10,
                    },
                    jwt: JwtConfig {
                        secret: "change-me-in-production".to_string(),
                        access_token_expires_in: 7200,
                    },
                    uploads: UploadConfig::default(),
                }
            }
        };

        if let Some(v) = lookup("SERVER_HOST") {
            config.server.host = v;
        }
        if let Some(p) = parse_var(&lookup, "SERVER_PORT") {
            config.server.port = p;
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            config.server.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup("DATABASE_URL") {
            config.database.url = v;
        }
        if let Some(mc) = parse_var(&lookup, "DB_MAX_CONNECTIONS") {
            config.database.max_connections = mc;
        }
        if let Some(v) = lookup("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Some(n) = parse_var(&lookup, "JWT_ACCESS_EXPIRES_IN") {
            config.jwt.access_token_expires_in = n;
        }
        if let Some(v) = lookup("UPLOAD_DIR") {
            config.uploads.dir = v;
        }
        if let Some(v) = lookup("UPLOAD_PUBLIC_PREFIX") {
            config.uploads.public_prefix = v;
        }
        if let Some(n) = parse_var(&lookup, "UPLOAD_MAX_BYTES") {
            config.uploads.max_bytes = n;
        }
        if let Some(n) = parse_var(&lookup, "UPLOAD_MAX_DIMENSION") {
            config.uploads.max_dimension = n;
        }

        Ok(config)
    }
}
