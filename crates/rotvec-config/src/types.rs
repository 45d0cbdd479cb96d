use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub sensor: SensorConfig,
    pub render: RenderConfig,
}

impl AppConfig {
    /// Reject values the renderer or sensor client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::Validation(msg));

        if self.window.width == 0 || self.window.height == 0 {
            return fail(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            ));
        }
        if self.sensor.max_latency_us == 0 {
            return fail("sensor.max_latency_us must be positive".into());
        }
        if self.sensor.source == SensorSource::Simulated && self.sensor.simulated_axis.length() < 1e-6 {
            return fail("sensor.simulated_axis must not be zero".into());
        }

        let r = &self.render;
        if r.near.is_nan() || r.near <= 0.0 {
            return fail(format!("render.near must be positive, got {}", r.near));
        }
        if r.far.is_nan() || r.far <= r.near {
            return fail(format!("render.far ({}) must exceed render.near ({})", r.far, r.near));
        }
        if r.half_height.is_nan() || r.half_height <= 0.0 {
            return fail(format!("render.half_height must be positive, got {}", r.half_height));
        }
        if r.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return fail("render.clear_color components must be within 0..=1".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Rotation Vector Cube".into(),
            width: 960,
            height: 720,
        }
    }
}

/// Where rotation-vector samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorSource {
    /// TCP stream from a device forwarding its sensor events.
    Stream,
    /// Locally generated constant-rate rotation.
    Simulated,
    /// No samples; the cube stays in its initial orientation.
    Idle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub source: SensorSource,
    /// `host:port` of the sample producer for the `stream` source.
    pub address: String,
    /// Requested maximum delivery latency, in microseconds.
    pub max_latency_us: u64,
    #[serde(with = "vec3_serde")]
    pub simulated_axis: Vec3,
    pub simulated_degrees_per_second: f32,
}

impl SensorConfig {
    pub fn max_latency(&self) -> Duration {
        Duration::from_micros(self.max_latency_us)
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            source: SensorSource::Stream,
            address: "127.0.0.1:5555".into(),
            max_latency_us: 10_000,
            simulated_axis: Vec3::new(0.3, 1.0, 0.2),
            simulated_degrees_per_second: 45.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGBA clear color.
    pub clear_color: [f32; 4],
    /// How far in front of the camera the cube sits.
    pub camera_distance: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Half of the frustum height at the near plane.
    pub half_height: f32,
    pub vsync: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [1.0, 1.0, 1.0, 1.0],
            camera_distance: 3.0,
            near: 1.0,
            far: 10.0,
            half_height: 1.0,
            vsync: true,
        }
    }
}

// glam's own serde impls aren't enabled; keep vectors as plain TOML arrays.
mod vec3_serde {
    use glam::Vec3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vec3, s: S) -> Result<S::Ok, S::Error> {
        [v.x, v.y, v.z].serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec3, D::Error> {
        let [x, y, z] = <[f32; 3]>::deserialize(d)?;
        Ok(Vec3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sensor.max_latency(), Duration::from_micros(10_000));
        assert_eq!(config.render.near, 1.0);
        assert_eq!(config.render.far, 10.0);
        assert_eq!(config.render.clear_color, [1.0; 4]);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = AppConfig::default();
        config.sensor.source = SensorSource::Simulated;
        config.sensor.simulated_axis = Vec3::Z;

        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("source = \"simulated\""));

        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.sensor.source, SensorSource::Simulated);
        assert_eq!(parsed.sensor.simulated_axis, Vec3::Z);
        assert_eq!(parsed.window.title, config.window.title);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: AppConfig = toml::from_str("[sensor]\nsource = \"idle\"\n").unwrap();
        assert_eq!(parsed.sensor.source, SensorSource::Idle);
        assert_eq!(parsed.sensor.address, "127.0.0.1:5555");
        assert_eq!(parsed.render.camera_distance, 3.0);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AppConfig::default();
        config.render.far = 0.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.render.near = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.window.height = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.sensor.max_latency_us = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.sensor.source = SensorSource::Simulated;
        config.sensor.simulated_axis = Vec3::ZERO;
        assert!(config.validate().is_err());
    }
}
