// Fetch plan
// Works out which group archives a sampled manifest needs and which members
// to extract from them. Downloading and extraction happen elsewhere.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SamplerError};
use crate::manifest::Table;

/// How rows are chosen from the manifest before planning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    pub limit: Option<usize>,
    /// Shuffle with this seed before taking `limit` rows
    pub shuffle_seed: Option<u64>,
}

/// Needed files for one archive group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPlan {
    pub videos: BTreeSet<String>,
    pub annotation_prefixes: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPlan {
    pub rows_considered: usize,
    pub rows_skipped: usize,
    pub groups: BTreeMap<String, GroupPlan>,
}

/// Group id from a relative video path like "videos/group_0007/clip.mp4"
pub fn group_id(video_path: &str) -> Option<&str> {
    let part = video_path.trim().split('/').nth(1)?;
    part.starts_with(GROUP_PREFIX).then_some(part)
}

impl FetchPlan {
    /// Build a plan from a sampled manifest
    pub fn from_table(table: &Table, options: &PlanOptions) -> Result<Self> {
        let mut missing = Vec::new();
        let video_col = table.column_index(COL_VIDEO_PATH);
        let ann_col = table.column_index(COL_ANNOTATION_PATH);
        if video_col.is_none() {
            missing.push(COL_VIDEO_PATH.to_string());
        }
        if ann_col.is_none() {
            missing.push(COL_ANNOTATION_PATH.to_string());
        }
        let (Some(video_col), Some(ann_col)) = (video_col, ann_col) else {
            return Err(SamplerError::MissingColumns(missing));
        };

        let mut order: Vec<usize> = (0..table.len()).collect();
        if let Some(seed) = options.shuffle_seed {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }
        if let Some(limit) = options.limit {
            order.truncate(limit);
        }

        let mut plan = FetchPlan { rows_considered: order.len(), ..Default::default() };
        for row in order {
            let video = table.value(row, video_col).trim();
            let ann = table.value(row, ann_col).trim().trim_end_matches('/');

            let Some(gid) = group_id(video) else {
                log::debug!("No group id in video path '{}', skipping row {}", video, row + 1);
                plan.rows_skipped += 1;
                continue;
            };

            let group = plan.groups.entry(gid.to_string()).or_default();
            if !video.is_empty() {
                group.videos.insert(video.to_string());
            }
            if !ann.is_empty() {
                group.annotation_prefixes.insert(format!("{}/", ann));
            }
        }

        if plan.groups.is_empty() {
            return Err(SamplerError::NoGroups);
        }

        log::info!(
            "Planned {} groups from {} rows ({} skipped)",
            plan.groups.len(), plan.rows_considered, plan.rows_skipped
        );
        Ok(plan)
    }

    /// Archive paths to fetch, video archive then annotation archive per group
    pub fn archive_paths(&self) -> Vec<String> {
        self.groups
            .keys()
            .flat_map(|gid| {
                [
                    format!("{}/{}.{}", VIDEO_ARCHIVE_DIR, gid, ARCHIVE_EXTENSION),
                    format!("{}/{}.{}", ANNOTATION_ARCHIVE_DIR, gid, ARCHIVE_EXTENSION),
                ]
            })
            .collect()
    }

    /// Whether an archive member of `group` should be extracted
    pub fn member_is_needed(&self, group: &str, member: &str) -> bool {
        let Some(plan) = self.groups.get(group) else {
            return false;
        };
        plan.videos.contains(member)
            || plan.annotation_prefixes.iter().any(|p| member.starts_with(p.as_str()))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        let csv = "id,video path,annotation path\n\
                   a,videos/group_0001/a.mp4,annotations/group_0001/a/\n\
                   b,videos/group_0001/b.mp4,annotations/group_0001/b\n\
                   c,videos/group_0002/c.mp4,annotations/group_0002/c\n\
                   d,loose/d.mp4,annotations/d\n";
        Table::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_group_id() {
        assert_eq!(group_id("videos/group_0042/x.mp4"), Some("group_0042"));
        assert_eq!(group_id("videos/other/x.mp4"), None);
        assert_eq!(group_id("x.mp4"), None);
    }

    #[test]
    fn test_plan_groups_and_archives() {
        let plan = FetchPlan::from_table(&table(), &PlanOptions::default()).unwrap();
        assert_eq!(plan.rows_considered, 4);
        assert_eq!(plan.rows_skipped, 1);
        assert_eq!(plan.groups.len(), 2);
        assert_eq!(plan.groups["group_0001"].videos.len(), 2);
        assert!(plan.groups["group_0001"].annotation_prefixes.contains("annotations/group_0001/a/"));
        assert_eq!(
            plan.archive_paths(),
            vec![
                "videos/group_0001.tar.gz",
                "annotations/group_0001.tar.gz",
                "videos/group_0002.tar.gz",
                "annotations/group_0002.tar.gz",
            ]
        );
    }

    #[test]
    fn test_member_selection() {
        let plan = FetchPlan::from_table(&table(), &PlanOptions::default()).unwrap();
        assert!(plan.member_is_needed("group_0001", "videos/group_0001/a.mp4"));
        assert!(plan.member_is_needed("group_0001", "annotations/group_0001/b/poses.npy"));
        assert!(!plan.member_is_needed("group_0001", "annotations/group_0001/bb/poses.npy"));
        assert!(!plan.member_is_needed("group_0002", "videos/group_0001/a.mp4"));
        assert!(!plan.member_is_needed("group_0009", "anything"));
    }

    #[test]
    fn test_limit_and_seeded_shuffle() {
        let limited = FetchPlan::from_table(&table(), &PlanOptions { limit: Some(1), shuffle_seed: None }).unwrap();
        assert_eq!(limited.groups.keys().collect::<Vec<_>>(), vec!["group_0001"]);

        let opts = PlanOptions { limit: Some(2), shuffle_seed: Some(DEFAULT_SHUFFLE_SEED) };
        let a = FetchPlan::from_table(&table(), &opts).unwrap_or_default();
        let b = FetchPlan::from_table(&table(), &opts).unwrap_or_default();
        assert_eq!(a, b);
        assert_eq!(a.rows_considered, 2);
    }

    #[test]
    fn test_missing_columns_and_no_groups() {
        let t = Table::from_reader("id,video path\na,videos/group_1/a.mp4\n".as_bytes()).unwrap();
        assert!(matches!(
            FetchPlan::from_table(&t, &PlanOptions::default()),
            Err(SamplerError::MissingColumns(cols)) if cols == vec![COL_ANNOTATION_PATH.to_string()]
        ));

        let t = Table::from_reader("id,video path,annotation path\na,x.mp4,ann/a\n".as_bytes()).unwrap();
        assert!(matches!(FetchPlan::from_table(&t, &PlanOptions::default()), Err(SamplerError::NoGroups)));
    }

    #[test]
    fn test_json_round_trip() {
        let plan = FetchPlan::from_table(&table(), &PlanOptions::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        plan.write_json(&path).unwrap();
        let loaded: FetchPlan = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, plan);
    }
}
