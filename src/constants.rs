// Clip Sampler Constants
// Default recipe values. Every value here can be overridden through SamplerConfig.

// ----- Sampling -----

pub const DEFAULT_TARGET_SIZE: i64 = 1000;
pub const DEFAULT_SEED: u64 = 42;

// ----- Hard filter -----

pub const MIN_DURATION_SECS: f64 = 3.0;
pub const BRIGHT_LABEL: &str = "Bright";
pub const AESTHETIC_Q_BRIGHT: f64 = 0.05;   // Bottom share dropped in the Bright bucket
pub const AESTHETIC_Q_DEFAULT: f64 = 0.02;  // Bottom share dropped in every other bucket

// ----- Dynamics buckets -----

// Upper edges (exclusive) for S, M, L; anything at or above the last edge is XL
pub const MOVE_DIST_EDGES: [f64; 3] = [0.5, 3.0, 8.0];
pub const ROT_ANGLE_EDGES: [f64; 3] = [0.5, 1.5, 3.0];
pub const TRAJ_TURNS_MAX_BUCKET: i64 = 3;   // 3 or more collapse to "3+"

pub const ALPHA_MOVE: f64 = 0.8;
pub const ALPHA_ROT: f64 = 0.8;
pub const ALPHA_TURN: f64 = 0.8;

// ----- Semantic axes (alpha, clamp) -----

pub const ALPHA_BRIGHTNESS: f64 = 0.6;
pub const ALPHA_TIME_OF_DAY: f64 = 0.6;
pub const ALPHA_WEATHER: f64 = 0.6;
pub const ALPHA_SCENE_TYPE: f64 = 0.7;
pub const ALPHA_MOTION_TAGS: f64 = 0.5;

pub const CLAMP_BRIGHTNESS: (f64, f64) = (0.5, 2.5);
pub const CLAMP_TIME_OF_DAY: (f64, f64) = (0.5, 2.5);
pub const CLAMP_WEATHER: (f64, f64) = (0.5, 3.0);
pub const CLAMP_SCENE_TYPE: (f64, f64) = (0.3, 3.5);
pub const CLAMP_MOTION_TAGS: (f64, f64) = (0.5, 3.0);

// ----- Quality -----

pub const SHAKY_MOTION_THRESHOLD: f64 = 8.8;  // motion_score above this is too shaky
pub const SHAKY_MOTION_FACTOR: f64 = 0.7;
pub const STATIC_DIST_LEVEL: i64 = 0;
pub const STATIC_CAMERA_FACTOR: f64 = 0.8;
pub const AESTHETIC_Z_SLOPE: f64 = 0.5;
pub const AESTHETIC_CLAMP: (f64, f64) = (0.5, 1.5);
pub const AESTHETIC_MIN_STD: f64 = 1e-6;

// ----- Composite -----

pub const COMPOSITE_CLAMP: (f64, f64) = (0.05, 20.0);
pub const NORMALIZE_MIN_MEAN: f64 = 1e-9;    // Below this a group is left unscaled

// ----- Manifest columns -----

pub const COL_ID: &str = "id";
pub const COL_DURATION: &str = "duration_s";
pub const COL_NUM_FRAMES: &str = "num frames";
pub const COL_FPS: &str = "fps";
pub const COL_AESTHETIC: &str = "aesthetic_score";
pub const COL_MOTION: &str = "motion_score";
pub const COL_LUMINANCE: &str = "luminance_score";
pub const COL_OCR: &str = "ocr_score";
pub const COL_MOVE_DIST: &str = "moveDist";
pub const COL_ROT_ANGLE: &str = "rotAngle";
pub const COL_DIST_LEVEL: &str = "distLevel";
pub const COL_TRAJ_TURNS: &str = "trajTurns";
pub const COL_BRIGHTNESS: &str = "brightness";
pub const COL_TIME_OF_DAY: &str = "timeOfDay";
pub const COL_WEATHER: &str = "weather";
pub const COL_SCENE_TYPE: &str = "sceneType";
pub const COL_MOTION_TAGS: &str = "motionTags";

pub const COL_VIDEO_PATH: &str = "video path";
pub const COL_ANNOTATION_PATH: &str = "annotation path";

// Columns appended to the sampled manifest
pub const COL_WEIGHT: &str = "weight";
pub const COL_MOVE_BIN: &str = "move_bin";
pub const COL_ROT_BIN: &str = "rot_bin";
pub const COL_TURN_BIN: &str = "turn_bin";

// ----- Report -----

pub const REPORT_QUANTILES: [f64; 9] = [0.01, 0.05, 0.10, 0.25, 0.50, 0.75, 0.90, 0.95, 0.99];
pub const REPORT_TOP_CATEGORIES: usize = 10;

pub const REPORT_NUMERIC_FIELDS: [&str; 10] = [
    COL_DURATION, COL_AESTHETIC, COL_MOTION, COL_LUMINANCE, COL_OCR,
    COL_MOVE_DIST, COL_ROT_ANGLE, COL_DIST_LEVEL, COL_TRAJ_TURNS, COL_WEIGHT,
];

pub const REPORT_CATEGORICAL_FIELDS: [&str; 9] = [
    COL_BRIGHTNESS, COL_TIME_OF_DAY, COL_WEATHER, COL_SCENE_TYPE, COL_MOTION_TAGS,
    COL_DIST_LEVEL, COL_MOVE_BIN, COL_ROT_BIN, COL_TURN_BIN,
];

// ----- Fetch plan -----

pub const GROUP_PREFIX: &str = "group_";
pub const DEFAULT_SHUFFLE_SEED: u64 = 42;
pub const VIDEO_ARCHIVE_DIR: &str = "videos";
pub const ANNOTATION_ARCHIVE_DIR: &str = "annotations";
pub const ARCHIVE_EXTENSION: &str = "tar.gz";
