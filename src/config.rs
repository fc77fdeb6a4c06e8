use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::select;

/// Frame acquisition mode, chosen at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Read the most recent frame from the live camera server.
    Live { server: String, camera: String },
    /// Replay a directory of stored images at a fixed interval.
    Replay { images: PathBuf },
}

/// Resolved startup configuration.
///
/// Thresholds default per mode (tight for live operation, looser for
/// offline replay tuning) and may be overridden individually; both are
/// configuration of the same selection algorithm.
#[derive(Clone, Debug)]
pub struct Config {
    pub device: String,
    pub model_dir: PathBuf,
    pub mode: Mode,
    pub conf_thresh: f32,
    pub nms_thresh: f32,
}

impl Config {
    /// Resolve the startup surface into a validated configuration.
    ///
    /// Live operation requires a server address and a camera key; supplying
    /// an image directory switches to replay and makes those irrelevant.
    /// Missing required settings are fatal startup errors.
    pub fn resolve(
        device: String,
        model_dir: PathBuf,
        server: Option<String>,
        camera: Option<String>,
        images: Option<PathBuf>,
        conf_thresh: Option<f32>,
        nms_thresh: Option<f32>,
    ) -> Result<Self> {
        if device.trim().is_empty() {
            return Err(anyhow!("device name must not be empty"));
        }

        let (mode, default_conf, default_nms) = match images {
            Some(images) => (
                Mode::Replay { images },
                select::REPLAY_CONF_THRESH,
                select::REPLAY_NMS_THRESH,
            ),
            None => {
                let server = server.ok_or_else(|| anyhow!("live operation requires a server"))?;
                let camera =
                    camera.ok_or_else(|| anyhow!("live operation requires a camera key"))?;
                if server.trim().is_empty() || camera.trim().is_empty() {
                    return Err(anyhow!("server and camera must not be empty"));
                }
                (
                    Mode::Live { server, camera },
                    select::LIVE_CONF_THRESH,
                    select::LIVE_NMS_THRESH,
                )
            }
        };

        let conf_thresh = conf_thresh.unwrap_or(default_conf);
        let nms_thresh = nms_thresh.unwrap_or(default_nms);
        for (name, value) in [("confidence", conf_thresh), ("nms", nms_thresh)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} threshold {} outside [0, 1]", name, value));
            }
        }

        Ok(Self {
            device,
            model_dir,
            mode,
            conf_thresh,
            nms_thresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(
        server: Option<&str>,
        camera: Option<&str>,
        images: Option<&str>,
        conf: Option<f32>,
        nms: Option<f32>,
    ) -> Result<Config> {
        Config::resolve(
            "AIC1608-01".to_string(),
            PathBuf::from("/model"),
            server.map(str::to_string),
            camera.map(str::to_string),
            images.map(PathBuf::from),
            conf,
            nms,
        )
    }

    #[test]
    fn live_mode_uses_live_thresholds() {
        let cfg = resolve(Some("video.example.org"), Some("0030180F06E5"), None, None, None).unwrap();
        assert_eq!(
            cfg.mode,
            Mode::Live {
                server: "video.example.org".to_string(),
                camera: "0030180F06E5".to_string(),
            }
        );
        assert_eq!(cfg.conf_thresh, select::LIVE_CONF_THRESH);
        assert_eq!(cfg.nms_thresh, select::LIVE_NMS_THRESH);
    }

    #[test]
    fn image_directory_switches_to_replay_defaults() {
        let cfg = resolve(None, None, Some("/data/stills"), None, None).unwrap();
        assert_eq!(
            cfg.mode,
            Mode::Replay {
                images: PathBuf::from("/data/stills")
            }
        );
        assert_eq!(cfg.conf_thresh, select::REPLAY_CONF_THRESH);
        assert_eq!(cfg.nms_thresh, select::REPLAY_NMS_THRESH);
    }

    #[test]
    fn live_mode_without_server_is_fatal() {
        assert!(resolve(None, Some("cam"), None, None, None).is_err());
        assert!(resolve(Some("host"), None, None, None, None).is_err());
        assert!(resolve(Some(""), Some("cam"), None, None, None).is_err());
    }

    #[test]
    fn threshold_overrides_apply_in_any_mode() {
        let cfg = resolve(Some("host"), Some("cam"), None, Some(0.6), Some(0.4)).unwrap();
        assert_eq!(cfg.conf_thresh, 0.6);
        assert_eq!(cfg.nms_thresh, 0.4);
    }

    #[test]
    fn out_of_range_threshold_is_fatal() {
        assert!(resolve(Some("host"), Some("cam"), None, Some(1.5), None).is_err());
        assert!(resolve(Some("host"), Some("cam"), None, None, Some(-0.1)).is_err());
    }
}
