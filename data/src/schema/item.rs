use std::collections::BTreeMap;

/// One item data file as shipped with the game data dump.
///
/// Everything but the id is optional; missing fields get defaults when the
/// record is resolved.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
	pub id: Option<String>,
	pub name: Option<LocalizedText>,
	#[serde(rename = "type")]
	pub item_type: Option<String>,
	pub rarity: Option<String>,
	pub value: Option<u32>,
	pub stack_size: Option<u32>,
	pub image_filename: Option<String>,
	pub weight_kg: Option<f32>,
	pub recycles_into: Option<BTreeMap<String, u32>>,
	pub salvages_into: Option<BTreeMap<String, u32>>,
}

/// Names are either a plain (English) string or a map of language code to name.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
	Plain(String),
	Localized(BTreeMap<String, String>),
}

impl LocalizedText {
	pub fn into_map(self) -> BTreeMap<String, String> {
		match self {
			Self::Plain(name) => BTreeMap::from([("en".to_string(), name)]),
			Self::Localized(names) => names,
		}
	}
}
