//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

use xray_pult::config::ServiceConfig;
use xray_pult::reload::{ReloadError, ServiceRestarter};
use xray_pult::{HttpServer, Shutdown};

pub const TOKEN: &str = "test-token";

/// Two inbounds sharing "a", one extra "b", plus a list-less inbound.
pub const TWO_INBOUNDS: &str = r#"{
  "log": {
    "loglevel": "warning"
  },
  "inbounds": [
    {
      "tag": "vless-reality",
      "port": 443,
      "protocol": "vless",
      "settings": {
        "clients": [
          {
            "id": "a",
            "flow": ""
          }
        ],
        "decryption": "none"
      }
    },
    {
      "tag": "vless-ws",
      "port": 8443,
      "protocol": "vless",
      "settings": {
        "clients": [
          {
            "id": "a",
            "flow": ""
          },
          {
            "id": "b",
            "flow": ""
          }
        ],
        "decryption": "none"
      }
    },
    {
      "tag": "api",
      "port": 10085,
      "protocol": "dokodemo-door",
      "settings": {
        "address": "127.0.0.1"
      }
    }
  ],
  "outbounds": [
    {
      "protocol": "freedom"
    }
  ]
}
"#;

/// Records every restart; fails or stalls on demand.
#[derive(Clone, Default)]
pub struct RecordingRestarter {
    calls: Arc<Mutex<Vec<String>>>,
    finished: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    delay_ms: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl RecordingRestarter {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Restarts that ran to the end, successful or not.
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

impl ServiceRestarter for RecordingRestarter {
    async fn restart(&self, service: &str) -> Result<(), ReloadError> {
        self.calls.lock().unwrap().push(service.to_string());
        let delay_ms = self.delay_ms.load(Ordering::SeqCst);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ReloadError::Exited {
                service: service.to_string(),
                code: Some(1),
                stderr: format!("Error response from daemon: No such container: {service}"),
            });
        }
        Ok(())
    }
}

/// A running service bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestService {
    pub addr: SocketAddr,
    pub config_path: PathBuf,
    pub sub_path: PathBuf,
    pub restarter: RecordingRestarter,
    pub shutdown: Shutdown,
    _dir: TempDir,
}

#[allow(dead_code)]
impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn read_config(&self) -> String {
        std::fs::read_to_string(&self.config_path).unwrap()
    }

    pub fn read_config_json(&self) -> serde_json::Value {
        serde_json::from_str(&self.read_config()).unwrap()
    }
}

/// Write the fixtures and start the full router with a recording restarter.
pub async fn start_service(proxy_config: &str, template: Option<&str>) -> TestService {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let sub_path = dir.path().join("sub.txt");
    std::fs::write(&config_path, proxy_config).unwrap();
    if let Some(template) = template {
        std::fs::write(&sub_path, template).unwrap();
    }

    let mut config = ServiceConfig::default();
    config.auth.token = TOKEN.to_string();
    config.storage.config_file = config_path.to_string_lossy().into_owned();
    config.storage.sub_file = sub_path.to_string_lossy().into_owned();
    config.reload.timeout_secs = 5;

    let restarter = RecordingRestarter::default();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, restarter.clone(), &shutdown);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.listener();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestService {
        addr,
        config_path,
        sub_path,
        restarter,
        shutdown,
        _dir: dir,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
