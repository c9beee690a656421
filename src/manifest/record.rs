// Typed clip records
// Schema validation and parsing of manifest rows into the fields the sampler reads.

use std::collections::HashSet;

use crate::config::{NullPolicy, SamplerConfig};
use crate::constants::*;
use crate::error::{Result, SamplerError};
use super::Table;

/// One candidate clip, parsed from a manifest row
#[derive(Debug, Clone, PartialEq)]
pub struct ClipRecord {
    /// Index of the source row in the manifest table
    pub row: usize,
    pub id: String,
    pub duration_s: f64,
    pub aesthetic_score: f64,
    pub motion_score: f64,
    pub luminance_score: Option<f64>,
    pub ocr_score: Option<f64>,
    pub move_dist: f64,
    pub rot_angle: f64,
    pub dist_level: i64,
    pub traj_turns: i64,
    pub brightness: String,
    pub time_of_day: String,
    pub weather: String,
    pub scene_type: String,
    pub motion_tags: String,
}

/// Records parsed from a manifest, plus how many rows the null policy dropped
#[derive(Debug, Clone)]
pub struct ParsedManifest {
    pub records: Vec<ClipRecord>,
    pub dropped: usize,
}

/// Where the duration comes from
#[derive(Debug, Clone, Copy)]
enum DurationSource {
    Column(usize),
    Frames { frames: usize, fps: usize },
}

/// Resolved column positions for the fields the sampler needs
#[derive(Debug, Clone)]
struct ColumnMap {
    id: usize,
    duration: DurationSource,
    aesthetic: usize,
    motion: usize,
    luminance: Option<usize>,
    ocr: Option<usize>,
    move_dist: usize,
    rot_angle: usize,
    dist_level: usize,
    traj_turns: usize,
    brightness: usize,
    time_of_day: usize,
    weather: usize,
    scene_type: usize,
    motion_tags: usize,
}

/// Accepted header spellings for a canonical column
pub fn column_aliases(canonical: &'static str) -> &'static [&'static str] {
    match canonical {
        COL_AESTHETIC => &[COL_AESTHETIC, "aesthetic score"],
        COL_MOTION => &[COL_MOTION, "motion score"],
        COL_LUMINANCE => &[COL_LUMINANCE, "luminance score"],
        COL_OCR => &[COL_OCR, "ocr score"],
        COL_DURATION => &[COL_DURATION, "duration_sec"],
        COL_ID => &[COL_ID],
        COL_MOVE_DIST => &[COL_MOVE_DIST],
        COL_ROT_ANGLE => &[COL_ROT_ANGLE],
        COL_DIST_LEVEL => &[COL_DIST_LEVEL],
        COL_TRAJ_TURNS => &[COL_TRAJ_TURNS],
        COL_BRIGHTNESS => &[COL_BRIGHTNESS],
        COL_TIME_OF_DAY => &[COL_TIME_OF_DAY],
        COL_WEATHER => &[COL_WEATHER],
        COL_SCENE_TYPE => &[COL_SCENE_TYPE],
        COL_MOTION_TAGS => &[COL_MOTION_TAGS],
        COL_NUM_FRAMES => &[COL_NUM_FRAMES],
        COL_FPS => &[COL_FPS],
        _ => &[],
    }
}

impl ColumnMap {
    /// Resolve every required column, reporting all missing ones at once
    fn resolve(table: &Table) -> Result<Self> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str| -> usize {
            table.find_column(column_aliases(name)).unwrap_or_else(|| {
                missing.push(name.to_string());
                usize::MAX
            })
        };

        let id = require(COL_ID);
        let aesthetic = require(COL_AESTHETIC);
        let motion = require(COL_MOTION);
        let move_dist = require(COL_MOVE_DIST);
        let rot_angle = require(COL_ROT_ANGLE);
        let dist_level = require(COL_DIST_LEVEL);
        let traj_turns = require(COL_TRAJ_TURNS);
        let brightness = require(COL_BRIGHTNESS);
        let time_of_day = require(COL_TIME_OF_DAY);
        let weather = require(COL_WEATHER);
        let scene_type = require(COL_SCENE_TYPE);
        let motion_tags = require(COL_MOTION_TAGS);

        let duration = match table.find_column(column_aliases(COL_DURATION)) {
            Some(idx) => DurationSource::Column(idx),
            None => {
                let frames = table.find_column(column_aliases(COL_NUM_FRAMES));
                let fps = table.find_column(column_aliases(COL_FPS));
                match (frames, fps) {
                    (Some(frames), Some(fps)) => DurationSource::Frames { frames, fps },
                    _ => {
                        missing.push(format!("{} (or '{}' and '{}')", COL_DURATION, COL_NUM_FRAMES, COL_FPS));
                        DurationSource::Column(usize::MAX)
                    }
                }
            }
        };

        if !missing.is_empty() {
            return Err(SamplerError::MissingColumns(missing));
        }

        Ok(Self {
            id,
            duration,
            aesthetic,
            motion,
            luminance: table.find_column(column_aliases(COL_LUMINANCE)),
            ocr: table.find_column(column_aliases(COL_OCR)),
            move_dist,
            rot_angle,
            dist_level,
            traj_turns,
            brightness,
            time_of_day,
            weather,
            scene_type,
            motion_tags,
        })
    }
}

/// Parse all rows into clip records.
/// Rows with a missing or malformed required value fail the whole load unless
/// the null policy is `Drop`, in which case they are skipped and counted.
pub fn parse_records(table: &Table, config: &SamplerConfig) -> Result<ParsedManifest> {
    let columns = ColumnMap::resolve(table)?;
    let fill = config.missing_category_label.as_deref();

    let mut records = Vec::with_capacity(table.len());
    let mut dropped = 0;
    let mut seen = HashSet::with_capacity(table.len());

    for row in 0..table.len() {
        let record = match parse_row(table, &columns, row, fill) {
            Ok(record) => record,
            Err(e) if config.null_policy == NullPolicy::Drop => {
                log::debug!("Dropping row {}: {}", row + 1, e);
                dropped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        if !seen.insert(record.id.clone()) {
            return Err(SamplerError::DuplicateId(record.id));
        }
        records.push(record);
    }

    if dropped > 0 {
        log::warn!("Dropped {} rows with missing or invalid values", dropped);
    }

    Ok(ParsedManifest { records, dropped })
}

fn parse_row(table: &Table, cols: &ColumnMap, row: usize, fill: Option<&str>) -> Result<ClipRecord> {
    let field = |column: usize| RowField { table, row, column };

    let duration_s = match cols.duration {
        DurationSource::Column(c) => field(c).number()?,
        DurationSource::Frames { frames, fps } => {
            let frames_v = field(frames).number()?;
            let fps_field = field(fps);
            let fps_v = fps_field.number()?;
            if fps_v <= 0.0 {
                return Err(fps_field.invalid());
            }
            frames_v / fps_v
        }
    };

    Ok(ClipRecord {
        row,
        id: field(cols.id).text(None)?,
        duration_s,
        aesthetic_score: field(cols.aesthetic).number()?,
        motion_score: field(cols.motion).number()?,
        luminance_score: cols.luminance.and_then(|c| field(c).number().ok()),
        ocr_score: cols.ocr.and_then(|c| field(c).number().ok()),
        move_dist: field(cols.move_dist).number()?,
        rot_angle: field(cols.rot_angle).number()?,
        dist_level: field(cols.dist_level).code()?,
        traj_turns: field(cols.traj_turns).code()?,
        brightness: field(cols.brightness).text(fill)?,
        time_of_day: field(cols.time_of_day).text(fill)?,
        weather: field(cols.weather).text(fill)?,
        scene_type: field(cols.scene_type).text(fill)?,
        motion_tags: field(cols.motion_tags).text(fill)?,
    })
}

/// One cell, with enough context for a useful error
struct RowField<'a> {
    table: &'a Table,
    row: usize,
    column: usize,
}

impl RowField<'_> {
    fn raw(&self) -> &str {
        self.table.value(self.row, self.column).trim()
    }

    fn name(&self) -> String {
        self.table.headers[self.column].clone()
    }

    fn missing(&self) -> SamplerError {
        SamplerError::MissingValue { row: self.row + 1, column: self.name() }
    }

    fn invalid(&self) -> SamplerError {
        SamplerError::InvalidValue { row: self.row + 1, column: self.name(), value: self.raw().to_string() }
    }

    /// Finite float; empty and NaN count as missing
    fn number(&self) -> Result<f64> {
        let raw = self.raw();
        if raw.is_empty() {
            return Err(self.missing());
        }
        let value: f64 = raw.parse().map_err(|_| self.invalid())?;
        if value.is_nan() {
            return Err(self.missing());
        }
        if !value.is_finite() {
            return Err(self.invalid());
        }
        Ok(value)
    }

    /// Small integer code; accepts "2" and "2.0"
    fn code(&self) -> Result<i64> {
        let value = self.number()?;
        if value.fract() != 0.0 {
            return Err(self.invalid());
        }
        Ok(value as i64)
    }

    fn text(&self, fill: Option<&str>) -> Result<String> {
        let raw = self.raw();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return fill.map(str::to_string).ok_or_else(|| self.missing());
        }
        Ok(raw.to_string())
    }
}
