use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

/// API key the server under test is spawned with, so suites authenticate
/// deterministically regardless of the environment's own configuration.
pub const API_KEY: &str = "TPK-NILAM-2026";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tpk-nilam-api-rust"));
        cmd.env("TPK_API_PORT", port.to_string())
            .env("API_KEY", API_KEY)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit the rest of the environment so the server sees DATABASE_URL
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            // The discovery payload answers on / as soon as the server is up
            let url = format!("{}/", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => return Ok(()),
                _ => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    // Use stable get_or_init and convert init errors into a panic with context.
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Connect to the same database the server under test uses and make sure the
/// tables exist. Returns None, and callers skip, when DATABASE_URL is unset.
pub async fn test_pool() -> Result<Option<PgPool>> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => return Ok(None),
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .context("DATABASE_URL is set but not connectable")?;

    pool.execute(include_str!("../../db/schema.sql"))
        .await
        .context("failed to apply db/schema.sql")?;

    Ok(Some(pool))
}

/// A complete, valid evaluasi write body. The vessel name is the caller's
/// marker so concurrent runs against a shared database stay distinguishable.
pub fn evaluasi_payload(kapal: &str) -> Value {
    json!({
        "tanggal": "2026-01-15",
        "shift": "Shift 1",
        "kapal": kapal,
        "pelayaran": "MERATUS",
        "target_bongkar": 120,
        "realisasi_bongkar": 110,
        "target_muat": 80,
        "realisasi_muat": 90,
        "persen_bongkar": 91.67,
        "persen_muat": 112.5,
        "keterangan": "Cuaca cerah"
    })
}

/// A complete, valid target_data write body.
pub fn target_payload(pelayaran: &str) -> Value {
    json!({
        "pelayaran": pelayaran,
        "kodeWS": "WS-01",
        "periode": "2026-01",
        "waktuBerthing": "2026-01-15 06:00",
        "waktuDeparture": "2026-01-15 18:00",
        "berthingTime": "12:00",
        "targetBongkar": 450,
        "targetMuat": 300,
        "createdAt": "2026-01-14 20:15"
    })
}

/// A complete, valid realisasi_data write body.
pub fn realisasi_payload(pelayaran: &str) -> Value {
    json!({
        "pelayaran": pelayaran,
        "kodeWS": "WS-01",
        "namaKapal": "KM Oriental Emerald",
        "periode": "2026-01",
        "waktuArrival": "2026-01-15 04:30",
        "waktuBerthing": "2026-01-15 06:10",
        "waktuDeparture": "2026-01-15 19:05",
        "berthingTime": "12:55",
        "realisasiBongkar": 430,
        "realisasiMuat": 310,
        "createdAt": "2026-01-15 19:30"
    })
}
