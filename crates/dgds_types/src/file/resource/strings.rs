//! Indexed string tables (`TAG` and `RES` chunks).

use std::collections::BTreeMap;
use std::fmt;

use crate::file::reader::ByteReader;
use crate::file::{DgdsError, FileType};

/// Strings keyed by a 16-bit index.
///
/// The wire format is `u16 count` followed by `count` records of `u16 index` and a
/// NUL-terminated string. Later duplicates replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
	entries: BTreeMap<u16, String>,
}

impl StringTable {
	/// Parses a string table payload.
	pub fn from_bytes(data: &[u8]) -> Result<Self, DgdsError> {
		let mut reader = ByteReader::new(data, FileType::Strings);
		let count = reader.read_u16_le()?;
		let mut entries = BTreeMap::new();
		for _ in 0..count {
			let index = reader.read_u16_le()?;
			let text = reader.read_cstring()?;
			entries.insert(index, text);
		}
		if !reader.is_empty() {
			log::debug!("String table has {} trailing bytes", reader.remaining());
		}
		Ok(Self {
			entries,
		})
	}

	/// Serializes the table back to its wire format.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = (self.entries.len() as u16).to_le_bytes().to_vec();
		for (index, text) in &self.entries {
			out.extend_from_slice(&index.to_le_bytes());
			out.extend_from_slice(text.as_bytes());
			out.push(0);
		}
		out
	}

	/// String stored under `index`.
	pub fn get(&self, index: u16) -> Option<&str> {
		self.entries.get(&index).map(String::as_str)
	}

	/// Adds or replaces a string.
	pub fn insert(&mut self, index: u16, text: impl Into<String>) {
		self.entries.insert(index, text.into());
	}

	/// Index of the first string equal to `text`, ignoring ASCII case.
	pub fn find(&self, text: &str) -> Option<u16> {
		self.entries.iter().find(|(_, s)| s.eq_ignore_ascii_case(text)).map(|(&i, _)| i)
	}

	/// Entries in index order.
	pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
		self.entries.iter().map(|(&i, s)| (i, s.as_str()))
	}

	/// Number of strings.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl fmt::Display for StringTable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (index, text) in self.iter() {
			writeln!(f, "{index:5}: {text}")?;
		}
		Ok(())
	}
}
