use std::{
	collections::{BTreeMap, HashMap},
	fs,
	path::{Path, PathBuf},
	sync::Arc,
};

use anyhow::{Context, Result};

mod id;
pub use id::{Id, IdManager, IdTable};
mod index;
pub use index::{CatalogEntry, CatalogIndex};
pub mod matcher;
pub mod progress;
mod schema;
mod structs;
pub use structs::Language;

/// A fully resolved item, with defaults filled in for missing fields.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ItemRecord {
	pub id: String,
	/// Display name per catalog language code.
	pub names: BTreeMap<String, String>,
	pub item_type: String,
	pub rarity: String,
	pub value: u32,
	pub stack_size: u32,
	pub image_reference: Option<String>,
	pub weight_kg: f32,
	pub recycles_into: BTreeMap<String, u32>,
	pub salvages_into: BTreeMap<String, u32>,
}

impl ItemRecord {
	/// A record with only an id and an English name; everything else defaulted.
	pub fn new(id: impl Into<String>, english_name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			names: BTreeMap::from([("en".to_string(), english_name.into())]),
			item_type: String::new(),
			rarity: "Common".to_string(),
			value: 0,
			stack_size: 1,
			image_reference: None,
			weight_kg: 0.0,
			recycles_into: BTreeMap::new(),
			salvages_into: BTreeMap::new(),
		}
	}

	fn from_schema(fallback_id: &str, item: schema::item::Item) -> Self {
		let mut names = item.name.map(|n| n.into_map()).unwrap_or_default();
		names.retain(|_, name| !name.trim().is_empty());

		Self {
			id: item.id.filter(|id| !id.is_empty()).unwrap_or_else(|| fallback_id.to_string()),
			names,
			item_type: item.item_type.unwrap_or_default(),
			rarity: item.rarity.unwrap_or_else(|| "Common".to_string()),
			value: item.value.unwrap_or(0),
			stack_size: item.stack_size.unwrap_or(1),
			image_reference: item.image_filename,
			weight_kg: item.weight_kg.unwrap_or(0.0),
			recycles_into: item.recycles_into.unwrap_or_default(),
			salvages_into: item.salvages_into.unwrap_or_default(),
		}
	}

	/// Name in `lang`, if the item has one.
	pub fn name(&self, lang: Language) -> Option<&str> {
		self.names.get(lang.catalog_code()).map(String::as_str)
	}

	/// Name in `lang`, falling back to English and then to the id.
	pub fn display_name(&self, lang: Language) -> &str {
		self.name(lang)
			.or_else(|| self.name(Language::English))
			.unwrap_or(&self.id)
	}

	pub fn is_blueprint(&self) -> bool {
		self.item_type == "Blueprint" || self.display_name(Language::English).contains("Blueprint")
	}
}

/// All known items, ordered by id.
#[derive(Debug)]
pub struct Catalog {
	ids: IdTable,
	items: Vec<Arc<ItemRecord>>,
	positions: HashMap<Id, usize>,
}

impl Catalog {
	/// Load every `*.json` file in `dir`, one item per file.
	///
	/// Files that fail to read or parse are logged and skipped. Items without
	/// an id take the file stem.
	pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
		let dir = dir.as_ref();
		let mut paths = fs::read_dir(dir)
			.with_context(|| format!("Read item directory {}", dir.display()))?
			.filter_map(|entry| entry.ok().map(|e| e.path()))
			.filter(|path| path.extension().is_some_and(|ext| ext == "json"))
			.collect::<Vec<PathBuf>>();
		paths.sort();

		let items = paths.iter().filter_map(|path| match load_item(path) {
			Ok(item) => Some(item),
			Err(err) => {
				tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "skipping item file");
				None
			}
		});

		let catalog = Self::from_items(items);
		tracing::info!(dir = %dir.display(), items = catalog.len(), "item catalog loaded");
		Ok(catalog)
	}

	/// Build a catalog from already resolved records. Later duplicates of an id are dropped.
	pub fn from_items(items: impl IntoIterator<Item = ItemRecord>) -> Self {
		let mut ids = IdManager::new();
		let mut keyed = Vec::new();
		for item in items {
			match ids.insert(&item.id) {
				Some(id) => keyed.push((id, item)),
				None => tracing::warn!(id = %item.id, "duplicate item id ignored"),
			}
		}
		keyed.sort_by(|a, b| a.1.id.cmp(&b.1.id));

		let positions = keyed.iter().enumerate().map(|(i, (id, _))| (*id, i)).collect();
		let items = keyed.into_iter().map(|(_, item)| Arc::new(item)).collect();

		Self {
			ids: ids.into_table(),
			items,
			positions,
		}
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	pub fn items(&self) -> &[Arc<ItemRecord>] {
		&self.items
	}

	pub fn id(&self, id: &str) -> Option<Id> {
		self.ids.get(id)
	}

	pub fn get(&self, id: Id) -> Option<&Arc<ItemRecord>> {
		self.items.get(*self.positions.get(&id)?)
	}

	pub fn lookup(&self, id: &str) -> Option<&Arc<ItemRecord>> {
		self.get(self.id(id)?)
	}

	/// Matching index over the names in `lang`.
	pub fn index(&self, lang: Language) -> CatalogIndex {
		CatalogIndex::build(self, lang)
	}
}

fn load_item(path: &Path) -> Result<ItemRecord> {
	let text = fs::read_to_string(path).with_context(|| format!("Read {}", path.display()))?;
	let item = serde_json::from_str::<schema::item::Item>(&text).with_context(|| format!("Parse {}", path.display()))?;
	let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
	Ok(ItemRecord::from_schema(stem, item))
}
