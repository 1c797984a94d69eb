use std::{
    env, fs, io,
    net::SocketAddr,
    panic,
    path::{Path, PathBuf},
    str::FromStr,
    thread,
    time::{Duration, SystemTime},
};
use tokio::net::TcpListener;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Keeps the non-blocking file writer alive. Drop it only at process exit.
pub struct TracingGuards {
    _file_guard: Option<WorkerGuard>,
}

/// Log file placement and retention, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    root: PathBuf,
    retention_days: u64,
    cleanup_interval_minutes: u64,
}

impl LogSettings {
    /// `None` unless `LOG_DIR` is set: file logging is opt-in.
    fn from_env(service_name: &str) -> Option<Self> {
        let log_dir = env::var("LOG_DIR").ok()?;
        let log_dir = log_dir.trim();
        if log_dir.is_empty() {
            return None;
        }
        Some(Self {
            root: PathBuf::from(log_dir).join(service_name),
            retention_days: env_or("LOG_RETENTION_DAYS", 14u64),
            cleanup_interval_minutes: env_or("LOG_CLEANUP_INTERVAL_MINUTES", 360u64),
        })
    }

    fn cleanup_enabled(&self) -> bool {
        self.retention_days > 0 && self.cleanup_interval_minutes > 0
    }
}

fn open_file_writer(
    settings: &LogSettings,
    service_name: &str,
) -> Option<(NonBlocking, WorkerGuard)> {
    fs::create_dir_all(&settings.root).ok()?;
    // The rolling appender panics if it cannot open its first file.
    let appender = panic::catch_unwind(|| {
        tracing_appender::rolling::daily(&settings.root, format!("{service_name}.log"))
    })
    .ok()?;
    Some(tracing_appender::non_blocking(appender))
}

pub fn init_tracing(service_name: &str) -> TracingGuards {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let settings = LogSettings::from_env(service_name);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let file_writer = settings
        .as_ref()
        .and_then(|settings| open_file_writer(settings, service_name));

    let file_guard = match file_writer {
        Some((writer, guard)) => {
            let subscriber = Registry::default()
                .with(filter)
                .with(stdout_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer));
            let _ = tracing::subscriber::set_global_default(subscriber);
            Some(guard)
        }
        None => {
            let subscriber = Registry::default().with(filter).with(stdout_layer);
            let _ = tracing::subscriber::set_global_default(subscriber);
            if let Some(settings) = &settings {
                tracing::warn!(
                    log_dir = %settings.root.display(),
                    "log directory unavailable, logging to stdout only"
                );
            }
            None
        }
    };

    if let Some(settings) = settings {
        if file_guard.is_some() && settings.cleanup_enabled() {
            spawn_log_cleanup(settings);
        }
    }

    TracingGuards {
        _file_guard: file_guard,
    }
}

/// Typed environment lookup. Unset or unparseable values yield `default`.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn spawn_log_cleanup(settings: LogSettings) {
    let retention = Duration::from_secs(settings.retention_days * 24 * 60 * 60);
    let interval = Duration::from_secs(settings.cleanup_interval_minutes * 60);

    thread::spawn(move || loop {
        if let Some(cutoff) = SystemTime::now().checked_sub(retention) {
            let removed = remove_logs_older_than(&settings.root, cutoff);
            if removed > 0 {
                tracing::info!(removed, "removed expired log files");
            }
        }
        thread::sleep(interval);
    });
}

/// Deletes files under `root` last modified before `cutoff`. Returns the count.
fn remove_logs_older_than(root: &Path, cutoff: SystemTime) -> usize {
    let Ok(entries) = fs::read_dir(root) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            removed += remove_logs_older_than(&path, cutoff);
            continue;
        }
        let modified = fs::metadata(&path).and_then(|metadata| metadata.modified());
        match modified {
            Ok(modified) if modified < cutoff => {
                if fs::remove_file(&path).is_ok() {
                    removed += 1;
                }
            }
            _ => {}
        }
    }
    removed
}

pub async fn bind_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    Ok(listener)
}

/// Resolves on ctrl-c, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                let _ = ctrl_c.await;
                tracing::info!("received ctrl-c, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received ctrl-c, shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_when_unset() {
        let value = env_or("RECEIVER_COMMON_TEST_UNSET_KEY", 8000u16);
        assert_eq!(value, 8000);
    }

    #[test]
    fn env_or_falls_back_when_unparseable() {
        env::set_var("RECEIVER_COMMON_TEST_BAD_PORT", "eighty");
        assert_eq!(env_or("RECEIVER_COMMON_TEST_BAD_PORT", 8000u16), 8000);
    }

    #[test]
    fn env_or_trims_padded_values() {
        env::set_var("RECEIVER_COMMON_TEST_PADDED_PORT", " 9000 ");
        assert_eq!(env_or("RECEIVER_COMMON_TEST_PADDED_PORT", 8000u16), 9000);
    }

    #[test]
    fn file_logging_is_off_without_log_dir() {
        if env::var_os("LOG_DIR").is_none() {
            assert_eq!(LogSettings::from_env("info-receiver"), None);
        }
    }

    #[test]
    fn removes_only_expired_files() {
        let root = env::temp_dir().join(format!("receiver-common-{}", std::process::id()));
        let nested = root.join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("old.log"), b"x").unwrap();
        fs::write(nested.join("old.log"), b"x").unwrap();

        let future_cutoff = SystemTime::now() + Duration::from_secs(60);
        assert_eq!(remove_logs_older_than(&root, future_cutoff), 2);

        fs::write(root.join("fresh.log"), b"x").unwrap();
        let past_cutoff = SystemTime::now() - Duration::from_secs(3600);
        assert_eq!(remove_logs_older_than(&root, past_cutoff), 0);
        assert!(root.join("fresh.log").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let listener = bind_listener(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }
}
