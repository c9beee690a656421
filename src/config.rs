// Sampler configuration
// Every recipe parameter lives here so runs can be reproduced from a JSON file.

use std::collections::BTreeMap;
use std::path::Path;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SamplerError};

/// Inclusive lower/upper bound applied to a weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampRange {
    pub min: f64,
    pub max: f64,
}

impl ClampRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn apply(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(SamplerError::InvalidConfig(format!(
                "{} clamp [{}, {}] is not a valid range", name, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl From<(f64, f64)> for ClampRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

/// How the per-bucket aesthetic cutoff is derived from the bucket's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutoffMethod {
    /// Drop floor(q * n) rows by rank; the cutoff is the value at that rank
    #[default]
    Rank,
    /// Linearly interpolated quantile
    Linear,
}

/// What to do with rows that have a missing or non-numeric required field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    #[default]
    Fail,
    Drop,
}

/// Inverse-frequency parameters for one bucket axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub alpha: f64,
    #[serde(default)]
    pub clamp: Option<ClampRange>,
}

impl AxisConfig {
    pub const fn new(alpha: f64, clamp: Option<ClampRange>) -> Self {
        Self { alpha, clamp }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(SamplerError::InvalidConfig(format!(
                "{} alpha must be a non-negative number, got {}", name, self.alpha
            )));
        }
        if let Some(clamp) = &self.clamp {
            clamp.validate(name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub min_duration_s: f64,
    /// Bottom share dropped in buckets without an explicit entry
    pub default_quantile: f64,
    /// Brightness label -> bottom share dropped (labels match case-insensitively)
    pub bucket_quantiles: BTreeMap<String, f64>,
    pub cutoff_method: CutoffMethod,
}

impl Default for FilterConfig {
    fn default() -> Self {
        let mut bucket_quantiles = BTreeMap::new();
        bucket_quantiles.insert(BRIGHT_LABEL.to_string(), AESTHETIC_Q_BRIGHT);
        Self {
            min_duration_s: MIN_DURATION_SECS,
            default_quantile: AESTHETIC_Q_DEFAULT,
            bucket_quantiles,
            cutoff_method: CutoffMethod::default(),
        }
    }
}

impl FilterConfig {
    /// Quantile to drop for a brightness bucket
    pub fn quantile_for(&self, label: &str) -> f64 {
        self.bucket_quantiles
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(label))
            .map(|(_, q)| *q)
            .unwrap_or(self.default_quantile)
    }

    /// Set (or replace) the quantile for a brightness label
    pub fn set_quantile(&mut self, label: &str, quantile: f64) {
        self.bucket_quantiles.retain(|k, _| !k.eq_ignore_ascii_case(label));
        self.bucket_quantiles.insert(label.to_string(), quantile);
    }

    /// Set the quantile for every label except `keep`, including labels
    /// with their own entry
    pub fn set_quantile_except(&mut self, keep: &str, quantile: f64) {
        self.default_quantile = quantile;
        for (label, q) in self.bucket_quantiles.iter_mut() {
            if !label.eq_ignore_ascii_case(keep) {
                *q = quantile;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub move_dist_edges: [f64; 3],
    pub rot_angle_edges: [f64; 3],
    pub move_dist: AxisConfig,
    pub rot_angle: AxisConfig,
    pub traj_turns: AxisConfig,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            move_dist_edges: MOVE_DIST_EDGES,
            rot_angle_edges: ROT_ANGLE_EDGES,
            move_dist: AxisConfig::new(ALPHA_MOVE, None),
            rot_angle: AxisConfig::new(ALPHA_ROT, None),
            traj_turns: AxisConfig::new(ALPHA_TURN, None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    pub brightness: AxisConfig,
    pub time_of_day: AxisConfig,
    pub weather: AxisConfig,
    pub scene_type: AxisConfig,
    pub motion_tags: AxisConfig,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            brightness: AxisConfig::new(ALPHA_BRIGHTNESS, Some(CLAMP_BRIGHTNESS.into())),
            time_of_day: AxisConfig::new(ALPHA_TIME_OF_DAY, Some(CLAMP_TIME_OF_DAY.into())),
            weather: AxisConfig::new(ALPHA_WEATHER, Some(CLAMP_WEATHER.into())),
            scene_type: AxisConfig::new(ALPHA_SCENE_TYPE, Some(CLAMP_SCENE_TYPE.into())),
            motion_tags: AxisConfig::new(ALPHA_MOTION_TAGS, Some(CLAMP_MOTION_TAGS.into())),
        }
    }
}

impl SemanticConfig {
    pub fn axes(&self) -> [(&'static str, &AxisConfig); 5] {
        [
            (COL_BRIGHTNESS, &self.brightness),
            (COL_TIME_OF_DAY, &self.time_of_day),
            (COL_WEATHER, &self.weather),
            (COL_SCENE_TYPE, &self.scene_type),
            (COL_MOTION_TAGS, &self.motion_tags),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub shaky_motion_threshold: f64,
    pub shaky_motion_factor: f64,
    pub static_dist_level: i64,
    pub static_camera_factor: f64,
    pub aesthetic_slope: f64,
    pub aesthetic_clamp: ClampRange,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            shaky_motion_threshold: SHAKY_MOTION_THRESHOLD,
            shaky_motion_factor: SHAKY_MOTION_FACTOR,
            static_dist_level: STATIC_DIST_LEVEL,
            static_camera_factor: STATIC_CAMERA_FACTOR,
            aesthetic_slope: AESTHETIC_Z_SLOPE,
            aesthetic_clamp: AESTHETIC_CLAMP.into(),
        }
    }
}

/// Full sampler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub target_size: i64,
    pub seed: u64,
    pub filter: FilterConfig,
    pub dynamics: DynamicsConfig,
    pub semantic: SemanticConfig,
    pub quality: QualityConfig,
    pub composite_clamp: ClampRange,
    pub null_policy: NullPolicy,
    /// When set, empty categorical values take this label instead of counting as missing
    pub missing_category_label: Option<String>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            seed: DEFAULT_SEED,
            filter: FilterConfig::default(),
            dynamics: DynamicsConfig::default(),
            semantic: SemanticConfig::default(),
            quality: QualityConfig::default(),
            composite_clamp: COMPOSITE_CLAMP.into(),
            null_policy: NullPolicy::default(),
            missing_category_label: None,
        }
    }
}

impl SamplerConfig {
    /// Load a configuration file. Fields absent from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(SamplerError::FileNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let config: SamplerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("Loaded sampler config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.target_size <= 0 {
            return Err(SamplerError::InvalidConfig(format!(
                "target size must be positive, got {}", self.target_size
            )));
        }

        if !self.filter.min_duration_s.is_finite() {
            return Err(SamplerError::InvalidConfig("duration floor must be finite".to_string()));
        }
        let quantiles = std::iter::once(("default", &self.filter.default_quantile))
            .chain(self.filter.bucket_quantiles.iter().map(|(k, v)| (k.as_str(), v)));
        for (label, q) in quantiles {
            if !(0.0..1.0).contains(q) {
                return Err(SamplerError::InvalidConfig(format!(
                    "aesthetic quantile for '{}' must be in [0, 1), got {}", label, q
                )));
            }
        }

        check_edges("moveDist", &self.dynamics.move_dist_edges)?;
        check_edges("rotAngle", &self.dynamics.rot_angle_edges)?;
        self.dynamics.move_dist.validate(COL_MOVE_DIST)?;
        self.dynamics.rot_angle.validate(COL_ROT_ANGLE)?;
        self.dynamics.traj_turns.validate(COL_TRAJ_TURNS)?;
        for (name, axis) in self.semantic.axes() {
            axis.validate(name)?;
        }

        let q = &self.quality;
        for (name, factor) in [("shaky motion", q.shaky_motion_factor), ("static camera", q.static_camera_factor)] {
            if !factor.is_finite() || factor <= 0.0 {
                return Err(SamplerError::InvalidConfig(format!(
                    "{} factor must be positive, got {}", name, factor
                )));
            }
        }
        if !q.aesthetic_slope.is_finite() {
            return Err(SamplerError::InvalidConfig("aesthetic slope must be finite".to_string()));
        }
        q.aesthetic_clamp.validate("aesthetic")?;

        self.composite_clamp.validate("composite")?;
        if self.composite_clamp.min <= 0.0 {
            return Err(SamplerError::InvalidConfig(format!(
                "composite clamp lower bound must be positive, got {}", self.composite_clamp.min
            )));
        }

        Ok(())
    }
}

fn check_edges(name: &str, edges: &[f64; 3]) -> Result<()> {
    let increasing = edges.windows(2).all(|w| w[0] < w[1]);
    if !increasing || edges.iter().any(|e| !e.is_finite()) {
        return Err(SamplerError::InvalidConfig(format!(
            "{} bucket edges must be finite and strictly increasing, got {:?}", name, edges
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        SamplerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_non_positive_target() {
        let mut config = SamplerConfig::default();
        config.target_size = 0;
        assert!(matches!(config.validate(), Err(SamplerError::InvalidConfig(_))));
        config.target_size = -5;
        assert!(matches!(config.validate(), Err(SamplerError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_edges_and_clamps() {
        let mut config = SamplerConfig::default();
        config.dynamics.move_dist_edges = [0.5, 0.5, 8.0];
        assert!(config.validate().is_err());

        let mut config = SamplerConfig::default();
        config.composite_clamp = ClampRange::new(0.0, 20.0);
        assert!(config.validate().is_err());

        let mut config = SamplerConfig::default();
        config.semantic.weather.clamp = Some(ClampRange::new(3.0, 0.5));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quantile_lookup_is_case_insensitive() {
        let mut filter = FilterConfig::default();
        assert_eq!(filter.quantile_for("bright"), AESTHETIC_Q_BRIGHT);
        assert_eq!(filter.quantile_for("Dim"), AESTHETIC_Q_DEFAULT);

        filter.set_quantile("BRIGHT", 0.1);
        assert_eq!(filter.bucket_quantiles.len(), 1);
        assert_eq!(filter.quantile_for("Bright"), 0.1);
    }

    #[test]
    fn test_quantile_for_other_labels_overrides_explicit_entries() {
        let mut filter = FilterConfig::default();
        filter.set_quantile("Dim", 0.2);
        filter.set_quantile("Dark", 0.3);

        filter.set_quantile_except(BRIGHT_LABEL, 0.04);
        assert_eq!(filter.quantile_for("Dim"), 0.04);
        assert_eq!(filter.quantile_for("dark"), 0.04);
        assert_eq!(filter.quantile_for("Overcast"), 0.04);
        assert_eq!(filter.quantile_for("Bright"), AESTHETIC_Q_BRIGHT);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "target_size": 250, "quality": { "shaky_motion_factor": 0.5 } }"#;
        let config: SamplerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.target_size, 250);
        assert_eq!(config.seed, DEFAULT_SEED);
        assert_eq!(config.quality.shaky_motion_factor, 0.5);
        assert_eq!(config.quality.shaky_motion_threshold, SHAKY_MOTION_THRESHOLD);
        assert_eq!(config.semantic, SemanticConfig::default());
    }

    #[test]
    fn test_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sampler.json");
        let mut config = SamplerConfig::default();
        config.null_policy = NullPolicy::Drop;
        config.filter.cutoff_method = CutoffMethod::Linear;
        std::fs::write(&path, config.to_json().unwrap()).unwrap();

        let loaded = SamplerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SamplerConfig::load(Path::new("/nonexistent/sampler.json"));
        assert!(matches!(result, Err(SamplerError::FileNotFound(_))));
    }
}
