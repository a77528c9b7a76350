//! Shared configuration and application builders for integration tests.

use clap::Parser;
use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};
use taskchord::app::{App, Storage};
use taskchord::config::AppConfig;

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Settings read from the environment that would leak into test configs.
const CONFIG_VARIABLES: &[&str] = &[
    "DATABASE_URL",
    "DISCORD_BOT_TOKEN",
    "DISCORD_APPLICATION_ID",
    "DISCORD_CLIENT_ID",
    "DISCORD_CLIENT_SECRET",
    "DISCORD_REDIRECT_URL",
    "DISCORD_API_BASE",
    "FRONTEND_URL",
    "NAME_CACHE_TTL_SECS",
];

/// Guard that removes environment variables until dropped.
pub struct EnvVarGuard {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Unsets `keys` for the guard lifetime.
    pub fn unset_many(keys: &[&str]) -> Self {
        let lock = env_lock();
        let mut previous = Vec::with_capacity(keys.len());

        for key in keys {
            previous.push((OsString::from(key), env::var_os(key)));
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                env::remove_var(key);
            }
        }

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            if let Some(previous) = value {
                unsafe {
                    // SAFETY: the global mutex serializes environment mutations in tests.
                    env::set_var(&key, &previous);
                }
            }
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[derive(Debug, Parser)]
struct TestCli {
    #[command(flatten)]
    config: AppConfig,
}

/// Parses configuration from flags only, ignoring the ambient environment.
pub fn config(args: &[&str]) -> AppConfig {
    let _guard = EnvVarGuard::unset_many(CONFIG_VARIABLES);
    let mut argv = vec!["taskchord"];
    argv.extend_from_slice(args);
    TestCli::try_parse_from(argv)
        .expect("test arguments should parse")
        .config
}

/// Builds an in-memory application with login disabled.
pub fn in_memory_app() -> App {
    App::build(&config(&[]), Storage::InMemory).expect("application should build")
}
