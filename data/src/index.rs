use std::sync::Arc;

use crate::{Catalog, Id, ItemRecord, Language, matcher::fuzz};

/// One searchable name.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
	pub id: Id,
	/// Display name as stored in the catalog.
	pub name: String,
	/// Language `name` comes from; English when the item had no name in the index language.
	pub language: Language,
	pub item: Arc<ItemRecord>,
}

/// Precomputed comparison forms of an entry name.
#[derive(Debug, Clone)]
pub(crate) struct SearchKeys {
	pub lower: String,
	pub compact: String,
	pub sorted: String,
}

impl SearchKeys {
	pub fn new(name: &str) -> Self {
		let lower = name.to_lowercase();
		Self {
			compact: fuzz::compact(&lower),
			sorted: fuzz::sorted_tokens(&lower),
			lower,
		}
	}
}

/// Names of a single language, at most one entry per item.
///
/// Rebuilt (never mutated) when the language or catalog changes, so a
/// matcher holding a reference always sees a consistent set.
#[derive(Debug, Clone)]
pub struct CatalogIndex {
	language: Language,
	entries: Vec<CatalogEntry>,
	keys: Vec<SearchKeys>,
}

impl CatalogIndex {
	pub fn build(catalog: &Catalog, language: Language) -> Self {
		let mut entries = Vec::with_capacity(catalog.len());
		let mut fallbacks = 0usize;

		for item in catalog.items() {
			let Some(id) = catalog.id(&item.id) else {
				continue;
			};
			let (name, name_language) = match item.name(language) {
				Some(name) => (name, language),
				None => match item.name(Language::English) {
					Some(name) => {
						fallbacks += 1;
						(name, Language::English)
					}
					None => continue,
				},
			};

			entries.push(CatalogEntry {
				id,
				name: name.trim().to_string(),
				language: name_language,
				item: item.clone(),
			});
		}

		let keys = entries.iter().map(|e| SearchKeys::new(&e.name)).collect();
		tracing::debug!(?language, entries = entries.len(), fallbacks, "catalog index built");

		Self { language, entries, keys }
	}

	pub fn language(&self) -> Language {
		self.language
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn entries(&self) -> &[CatalogEntry] {
		&self.entries
	}

	pub fn entry(&self, index: usize) -> Option<&CatalogEntry> {
		self.entries.get(index)
	}

	pub(crate) fn keys(&self) -> &[SearchKeys] {
		&self.keys
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn catalog() -> Catalog {
		let mut medkit = ItemRecord::new("medkit", "Medkit");
		medkit.names.insert("ja".into(), "メディキット".into());
		let rope = ItemRecord::new("rope", "Rope");
		let mut nameless = ItemRecord::new("ghost", "");
		nameless.names.clear();
		Catalog::from_items([medkit, rope, nameless])
	}

	#[test]
	fn one_entry_per_item_with_english_fallback() {
		let index = catalog().index(Language::Japanese);
		let names = index.entries().iter().map(|e| (e.name.as_str(), e.language)).collect::<Vec<_>>();
		assert_eq!(names, [("メディキット", Language::Japanese), ("Rope", Language::English)]);
	}

	#[test]
	fn english_index_has_no_foreign_names() {
		let index = catalog().index(Language::English);
		assert_eq!(index.len(), 2);
		assert!(index.entries().iter().all(|e| e.language == Language::English));
		assert_eq!(index.keys()[0].lower, "medkit");
	}

	#[test]
	fn search_keys() {
		let keys = SearchKeys::new("Tactical Mk. 2 (Blue)");
		assert_eq!(keys.lower, "tactical mk. 2 (blue)");
		assert_eq!(keys.compact, "tacticalmk2blue");
		assert_eq!(keys.sorted, "(blue) 2 mk. tactical");
	}
}
