use serde::Serialize;

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Most-recent-first list of resolved city names without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentHistory {
    entries: Vec<String>,
    #[serde(skip)]
    capacity: usize,
}

impl Default for RecentHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RecentHistory {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Move `city` to the front, dropping any earlier occurrence and anything
    /// past capacity. Comparison is case-sensitive.
    pub fn record(&mut self, city: &str) {
        self.entries.retain(|entry| entry != city);
        self.entries.insert(0, city.to_string());
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_five_most_recent() {
        let mut history = RecentHistory::default();
        for city in ["Paris", "London", "Tokyo", "Rome", "Oslo", "Lima"] {
            history.record(city);
        }

        assert_eq!(history.entries(), ["Lima", "Oslo", "Rome", "Tokyo", "London"]);
    }

    #[test]
    fn repeat_moves_to_front() {
        let mut history = RecentHistory::default();
        for city in ["Paris", "London", "Tokyo"] {
            history.record(city);
        }
        history.record("Paris");

        assert_eq!(history.entries(), ["Paris", "Tokyo", "London"]);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn repeated_identical_records_are_stable() {
        let mut history = RecentHistory::default();
        for _ in 0..10 {
            history.record("Paris");
        }
        assert_eq!(history.entries(), ["Paris"]);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let mut history = RecentHistory::default();
        history.record("Paris");
        history.record("PARIS");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn zero_capacity_still_holds_one() {
        let mut history = RecentHistory::new(0);
        history.record("Paris");
        history.record("Rome");
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.entries(), ["Rome"]);
        assert!(!history.is_empty());
    }
}
