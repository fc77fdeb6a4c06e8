//! Live camera feed source.
//!
//! The camera server publishes the most recent encoded frame for each feed
//! under a fixed key in a redis store. `LiveSource` reads that key each
//! cycle and decodes the payload in-memory. Every failure mode short of
//! construction (store unreachable, key absent, empty payload, malformed
//! bytes) degrades to `Grab::Absent`; the feed is expected to recover.

use anyhow::{Context, Result};
use redis::Commands;

use super::{FrameSource, Grab};

const FRAME_STORE_PORT: u16 = 6379;

/// Configuration for the live feed.
#[derive(Clone, Debug)]
pub struct LiveConfig {
    /// Frame store address, `host` or `host:port`.
    pub server: String,
    /// Camera feed identifier; frames live under `{camera}:JPG`.
    pub camera: String,
}

/// Live frame source over the keyed frame store.
pub struct LiveSource {
    client: redis::Client,
    connection: Option<redis::Connection>,
    key: String,
    address: String,
}

impl LiveSource {
    pub fn new(config: LiveConfig) -> Result<Self> {
        let address = if config.server.contains(':') {
            config.server.clone()
        } else {
            format!("{}:{}", config.server, FRAME_STORE_PORT)
        };
        let client = redis::Client::open(format!("redis://{}/0", address))
            .with_context(|| format!("invalid frame store address {}", address))?;
        Ok(Self {
            client,
            connection: None,
            key: format!("{}:JPG", config.camera),
            address,
        })
    }

    /// Read the latest payload, connecting lazily and dropping the
    /// connection on error so the next cycle reconnects.
    fn fetch_bytes(&mut self) -> redis::RedisResult<Option<Vec<u8>>> {
        if self.connection.is_none() {
            self.connection = Some(self.client.get_connection()?);
            log::info!("connected to frame store at {}", self.address);
        }
        let result = match self.connection.as_mut() {
            Some(connection) => connection.get(&self.key),
            None => Ok(None),
        };
        if result.is_err() {
            self.connection = None;
        }
        result
    }
}

impl FrameSource for LiveSource {
    fn grab(&mut self) -> Grab {
        let bytes = match self.fetch_bytes() {
            Ok(Some(bytes)) if !bytes.is_empty() => bytes,
            Ok(_) => {
                log::debug!("no frame available under {}", self.key);
                return Grab::Absent;
            }
            Err(err) => {
                log::debug!("frame store read failed: {}", err);
                return Grab::Absent;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(frame) => Grab::Frame(frame.to_rgb8()),
            Err(err) => {
                log::debug!("undecodable frame under {}: {}", self.key, err);
                Grab::Absent
            }
        }
    }
}
