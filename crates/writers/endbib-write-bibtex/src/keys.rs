//! Citation key generation.

use endbib_core::MappedEntry;
use std::collections::HashSet;

/// Hands out citation keys that are unique within one document.
#[derive(Debug, Default)]
pub struct CiteKeys {
    used: HashSet<String>,
}

impl CiteKeys {
    /// Create an empty key set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a key to `entry`, the record at 1-based position `index`.
    ///
    /// The key is `surname` + `year`, or `entryN` when either is missing.
    /// A key already handed out gets a letter suffix: `a`, `b`, ... `z`, `aa`.
    pub fn assign(&mut self, entry: &MappedEntry, index: usize) -> String {
        let base = base_key(entry, index);
        let mut key = base.clone();
        let mut n = 0;
        while self.used.contains(&key) {
            n += 1;
            key = format!("{base}{}", suffix(n));
        }
        self.used.insert(key.clone());
        key
    }

    /// Number of keys handed out.
    pub fn len(&self) -> usize {
        self.used.len()
    }

    /// Check if no key has been handed out.
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

/// The key an entry would get before disambiguation.
pub fn base_key(entry: &MappedEntry, index: usize) -> String {
    let surname = entry
        .get("author")
        .map(|author| first_surname(&author.plain()))
        .unwrap_or_default();
    let year = entry
        .get("year")
        .map(|year| year.plain().trim().to_string())
        .filter(|year| year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()));

    match year {
        Some(year) if !surname.is_empty() => format!("{surname}{year}"),
        _ => format!("entry{index}"),
    }
}

/// Surname of the first name in a BibTeX `and`-separated name list,
/// lowercased with everything but letters and digits removed.
fn first_surname(names: &str) -> String {
    let first = names.split(" and ").next().unwrap_or_default().trim();
    let surname = match first.split_once(',') {
        Some((last, _)) => last,
        None => first.split_whitespace().last().unwrap_or_default(),
    };
    surname
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Bijective base-26 letters: 1 → `a`, 26 → `z`, 27 → `aa`.
fn suffix(mut n: usize) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use endbib_core::EntryType;

    fn article(author: &str, year: &str) -> MappedEntry {
        MappedEntry::new(EntryType::Article)
            .with_field("author", author)
            .with_field("year", year)
    }

    #[test]
    fn test_surname_forms() {
        assert_eq!(first_surname("Smith, John and Doe, Jane"), "smith");
        assert_eq!(first_surname("John Smith"), "smith");
        assert_eq!(first_surname("O'Brien-Kelly, Pat"), "obrienkelly");
        assert_eq!(first_surname("Müller, Jörg"), "müller");
        assert_eq!(first_surname(""), "");
    }

    #[test]
    fn test_base_key() {
        assert_eq!(base_key(&article("Smith, John", "2020"), 1), "smith2020");
        assert_eq!(base_key(&article("Smith, John", "n.d."), 4), "entry4");
        assert_eq!(
            base_key(&MappedEntry::new(EntryType::Misc).with_field("year", "2020"), 7),
            "entry7"
        );
        assert_eq!(base_key(&article("---", "2020"), 2), "entry2");
    }

    #[test]
    fn test_collisions_get_suffixes_in_order() {
        let mut keys = CiteKeys::new();
        let entry = article("Smith, John", "2020");
        assert_eq!(keys.assign(&entry, 1), "smith2020");
        assert_eq!(keys.assign(&entry, 2), "smith2020a");
        assert_eq!(keys.assign(&entry, 3), "smith2020b");
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_suffix_sequence() {
        assert_eq!(suffix(1), "a");
        assert_eq!(suffix(26), "z");
        assert_eq!(suffix(27), "aa");
        assert_eq!(suffix(52), "az");
        assert_eq!(suffix(53), "ba");
    }
}
