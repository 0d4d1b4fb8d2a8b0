/// Interned item id.
pub type Id = lasso::Spur;

/// Collects item ids while the catalog is being loaded.
#[derive(Default)]
pub struct IdManager {
	strings: lasso::Rodeo,
}

impl IdManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Intern `id`, returning `None` when it was already present.
	pub fn insert(&mut self, id: &str) -> Option<Id> {
		if self.strings.contains(id) {
			return None;
		}
		Some(self.strings.get_or_intern(id))
	}

	pub fn get(&self, id: &str) -> Option<Id> {
		self.strings.get(id)
	}

	/// Freeze into a read-only table safe to share between threads.
	pub fn into_table(self) -> IdTable {
		IdTable {
			strings: self.strings.into_reader(),
		}
	}
}

/// Read-only id interner, shared by a loaded catalog.
pub struct IdTable {
	strings: lasso::RodeoReader,
}

impl IdTable {
	pub fn get(&self, id: &str) -> Option<Id> {
		self.strings.get(id)
	}

	pub fn len(&self) -> usize {
		self.strings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.strings.is_empty()
	}
}

impl std::fmt::Debug for IdTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IdTable").field("len", &self.len()).finish()
	}
}
