//! Player progress lookups used when reporting on an identified item.
//!
//! The scanner only reads progress; tracking it is somebody else's job.
//! [`ProgressSnapshot`] is a read-only export of such a tracker.

use std::{collections::HashMap, fmt, path::Path};

use anyhow::{Context, Result};

/// Whether a requirement belongs to the very next upgrade or a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
	Next,
	Future,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct TradeListing {
	pub trader: String,
	pub quantity: u32,
	pub cost_item: String,
	pub cost_quantity: u32,
	#[serde(default)]
	pub daily_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct HideoutRequirement {
	pub station: String,
	pub level: u32,
	pub stage: Stage,
	pub needed: u32,
	#[serde(default)]
	pub owned: u32,
}

impl HideoutRequirement {
	pub fn is_complete(&self) -> bool {
		self.owned >= self.needed
	}

	pub fn remaining(&self) -> u32 {
		self.needed.saturating_sub(self.owned)
	}
}

/// `Med Bay (Lvl 2): x3`, showing what is still missing or the full amount once complete.
impl fmt::Display for HideoutRequirement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let count = if self.is_complete() { self.needed } else { self.remaining() };
		write!(f, "{} (Lvl {}): x{}", self.station, self.level, count)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct ProjectRequirement {
	pub project: String,
	pub phase: u32,
	pub stage: Stage,
	pub remaining: u32,
}

impl fmt::Display for ProjectRequirement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} (Ph{}): x{}", self.project, self.phase, self.remaining)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct QuestRequirement {
	pub quest: String,
	pub quantity: u32,
}

/// Read access to player progress, keyed by item id.
///
/// Every lookup defaults to "nothing known".
pub trait ItemProgress: Send + Sync {
	fn owned_count(&self, _item_id: &str) -> u32 {
		0
	}

	fn note(&self, _item_id: &str) -> Option<String> {
		None
	}

	fn trades(&self, _item_id: &str) -> Vec<TradeListing> {
		Vec::new()
	}

	fn hideout_requirements(&self, _item_id: &str) -> Vec<HideoutRequirement> {
		Vec::new()
	}

	/// Only phases that still need the item.
	fn project_requirements(&self, _item_id: &str) -> Vec<ProjectRequirement> {
		Vec::new()
	}

	fn quest_requirements(&self, _item_id: &str) -> Vec<QuestRequirement> {
		Vec::new()
	}

	/// True if the quest currently marked active needs this item.
	fn is_active_quest_item(&self, _item_id: &str) -> bool {
		false
	}
}

/// No progress tracked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ItemProgress for NoProgress {}

/// Progress for a single item inside a [`ProgressSnapshot`].
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ItemProgressEntry {
	pub owned: u32,
	pub note: Option<String>,
	pub trades: Vec<TradeListing>,
	pub hideout: Vec<HideoutRequirement>,
	pub projects: Vec<ProjectRequirement>,
	pub quests: Vec<QuestRequirement>,
}

/// Progress exported to a JSON file.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ProgressSnapshot {
	pub items: HashMap<String, ItemProgressEntry>,
	/// Item ids required by the active quest.
	pub active_quest_items: Vec<String>,
}

impl ProgressSnapshot {
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let text = std::fs::read_to_string(path).with_context(|| format!("Read progress {}", path.display()))?;
		serde_json::from_str(&text).with_context(|| format!("Parse progress {}", path.display()))
	}
}

impl ItemProgress for ProgressSnapshot {
	fn owned_count(&self, item_id: &str) -> u32 {
		self.items.get(item_id).map_or(0, |e| e.owned)
	}

	fn note(&self, item_id: &str) -> Option<String> {
		self.items.get(item_id)?.note.clone().filter(|n| !n.is_empty())
	}

	fn trades(&self, item_id: &str) -> Vec<TradeListing> {
		self.items.get(item_id).map(|e| e.trades.clone()).unwrap_or_default()
	}

	fn hideout_requirements(&self, item_id: &str) -> Vec<HideoutRequirement> {
		self.items.get(item_id).map(|e| e.hideout.clone()).unwrap_or_default()
	}

	fn project_requirements(&self, item_id: &str) -> Vec<ProjectRequirement> {
		self.items
			.get(item_id)
			.map(|e| e.projects.iter().filter(|p| p.remaining > 0).cloned().collect())
			.unwrap_or_default()
	}

	fn quest_requirements(&self, item_id: &str) -> Vec<QuestRequirement> {
		self.items.get(item_id).map(|e| e.quests.clone()).unwrap_or_default()
	}

	fn is_active_quest_item(&self, item_id: &str) -> bool {
		self.active_quest_items.iter().any(|id| id == item_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hideout_display_shows_remaining_until_complete() {
		let mut req = HideoutRequirement {
			station: "Med Bay".into(),
			level: 2,
			stage: Stage::Next,
			needed: 5,
			owned: 2,
		};
		assert_eq!(req.to_string(), "Med Bay (Lvl 2): x3");
		req.owned = 7;
		assert!(req.is_complete());
		assert_eq!(req.to_string(), "Med Bay (Lvl 2): x5");
	}

	#[test]
	fn snapshot_lookups() {
		let json = r#"{
			"items": {
				"medkit": {
					"owned": 3,
					"note": "keep two",
					"projects": [
						{"project": "Radio Tower", "phase": 2, "stage": "future", "remaining": 1},
						{"project": "Radio Tower", "phase": 1, "stage": "next", "remaining": 0}
					]
				}
			},
			"active_quest_items": ["medkit"]
		}"#;
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("progress.json");
		std::fs::write(&path, json).unwrap();

		let progress = ProgressSnapshot::load(&path).unwrap();
		assert_eq!(progress.owned_count("medkit"), 3);
		assert_eq!(progress.note("medkit").as_deref(), Some("keep two"));
		let projects = progress.project_requirements("medkit");
		assert_eq!(projects.len(), 1);
		assert_eq!(projects[0].to_string(), "Radio Tower (Ph2): x1");
		assert!(progress.is_active_quest_item("medkit"));

		assert_eq!(progress.owned_count("rope"), 0);
		assert!(!progress.is_active_quest_item("rope"));
		assert!(NoProgress.trades("medkit").is_empty());
	}
}
