//! What the user gets back for an identified item.

use data::{
	ItemRecord, Language,
	matcher::{MatchResult, Strategy},
	progress::{HideoutRequirement, ItemProgress, ProjectRequirement, QuestRequirement, TradeListing},
};
use ie::DetectedBlob;

/// How the item was recognized.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MatchSummary {
	pub name: String,
	pub language: Language,
	pub score: f64,
	pub strategy: Strategy,
	pub candidate: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ItemReport {
	pub item: ItemRecord,
	pub matched: MatchSummary,
	pub blueprint: bool,
	pub owned_count: u32,
	pub is_collected_blueprint: bool,
	pub user_note: Option<String>,
	pub trade_listings: Vec<TradeListing>,
	pub hideout_requirements: Vec<HideoutRequirement>,
	pub project_requirements: Vec<ProjectRequirement>,
	pub quest_requirements: Vec<QuestRequirement>,
	pub is_active_quest_item: bool,
	/// Tooltip box in capture coordinates, `None` if the full capture was read.
	pub tooltip: Option<DetectedBlob>,
}

/// Collect everything known about the matched item. Lookups use the item id only.
pub fn aggregate(matched: &MatchResult, progress: &dyn ItemProgress, tooltip: Option<DetectedBlob>) -> ItemReport {
	let item = matched.entry.item.as_ref().clone();
	let id = item.id.as_str();

	let blueprint = item.is_blueprint();
	let owned_count = progress.owned_count(id);

	ItemReport {
		matched: MatchSummary {
			name: matched.entry.name.clone(),
			language: matched.entry.language,
			score: matched.score,
			strategy: matched.strategy,
			candidate: matched.candidate.clone(),
		},
		blueprint,
		owned_count,
		is_collected_blueprint: blueprint && owned_count > 0,
		user_note: progress.note(id),
		trade_listings: progress.trades(id),
		hideout_requirements: progress.hideout_requirements(id),
		project_requirements: progress.project_requirements(id),
		quest_requirements: progress.quest_requirements(id),
		is_active_quest_item: progress.is_active_quest_item(id),
		tooltip,
		item,
	}
}
