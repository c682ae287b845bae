// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the redb database file | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | Symmetric key used to sign access tokens | Dev fallback |
//! | `JWT_ISSUER` | `iss` claim stamped on and required from access tokens | `todo-server` |
//! | `JWT_AUDIENCE` | `aud` claim stamped on and required from access tokens | `todo-client` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the database directory path.
///
/// The redb database file (`todo.redb`) is created inside this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Default database directory when `DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File name of the redb database inside the data directory.
pub const DATABASE_FILE: &str = "todo.redb";

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 8080;

/// Environment variable name for the JWT signing secret.
///
/// Access tokens are signed with HS256 using this key. A fixed development
/// fallback is used when unset so the server can run locally without setup.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Development-only signing secret used when `JWT_SECRET` is unset.
pub const DEV_JWT_SECRET: &str = "dev-only-insecure-secret";

/// Environment variable name for the token issuer claim.
pub const JWT_ISSUER_ENV: &str = "JWT_ISSUER";

/// Default issuer claim.
pub const DEFAULT_JWT_ISSUER: &str = "todo-server";

/// Environment variable name for the token audience claim.
pub const JWT_AUDIENCE_ENV: &str = "JWT_AUDIENCE";

/// Default audience claim.
pub const DEFAULT_JWT_AUDIENCE: &str = "todo-client";

/// Environment variable name for the log output format (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Access token lifetime in seconds (one hour).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Refresh token lifetime in seconds (seven days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Registration only accepts email addresses ending with this suffix.
pub const ALLOWED_EMAIL_SUFFIX: &str = "@gmail.com";
