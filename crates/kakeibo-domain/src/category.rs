//! The closed set of household budget categories and their grid columns.

use std::fmt;

use serde::{Deserialize, Serialize};
use strsim::levenshtein;

use crate::grid::FIRST_CATEGORY_COLUMN;

/// Upper bound on the edit distance for which an unknown token gets a
/// suggestion. Shorter labels allow less: at most half their length.
const SUGGESTION_DISTANCE: usize = 2;

/// One of the fixed budget labels a message may post to.
///
/// The declaration order is the registry order: it fixes both the grid column
/// of each category and the order of the monthly summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Groceries,
    DiningOut,
    DailyGoods,
    Rent,
    Water,
    Electricity,
    Gas,
    Communications,
    Savings,
}

/// Registry row: label typed by users, extra accepted spellings, summary label.
struct Entry {
    category: Category,
    label: &'static str,
    aliases: &'static [&'static str],
    summary_label: &'static str,
}

const REGISTRY: [Entry; Category::COUNT] = [
    Entry {
        category: Category::Groceries,
        label: "食材費",
        aliases: &[],
        summary_label: "食材費",
    },
    Entry {
        category: Category::DiningOut,
        label: "外食費",
        aliases: &[],
        summary_label: "外食費",
    },
    Entry {
        category: Category::DailyGoods,
        label: "日用品",
        aliases: &[],
        summary_label: "日用品",
    },
    Entry {
        category: Category::Rent,
        label: "家賃",
        aliases: &["家賃代"],
        summary_label: "家賃   ",
    },
    Entry {
        category: Category::Water,
        label: "水道代",
        aliases: &[],
        summary_label: "水道代",
    },
    Entry {
        category: Category::Electricity,
        label: "電気代",
        aliases: &[],
        summary_label: "電気代",
    },
    Entry {
        category: Category::Gas,
        label: "ガス代",
        aliases: &[],
        summary_label: "ガス代",
    },
    Entry {
        category: Category::Communications,
        label: "通信費",
        aliases: &[],
        summary_label: "通信費",
    },
    Entry {
        category: Category::Savings,
        label: "貯金",
        aliases: &[],
        summary_label: "貯金   ",
    },
];

impl Category {
    pub const COUNT: usize = 9;

    /// Every category in registry order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::Groceries,
        Category::DiningOut,
        Category::DailyGoods,
        Category::Rent,
        Category::Water,
        Category::Electricity,
        Category::Gas,
        Category::Communications,
        Category::Savings,
    ];

    fn entry(self) -> &'static Entry {
        &REGISTRY[self.ordinal()]
    }

    /// Zero-based position in the registry.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// One-based worksheet column holding this category.
    pub fn column(self) -> u32 {
        FIRST_CATEGORY_COLUMN + self.ordinal() as u32
    }

    /// Canonical label users type.
    pub fn label(self) -> &'static str {
        self.entry().label
    }

    /// Label as printed in the monthly summary, padded for alignment.
    pub fn summary_label(self) -> &'static str {
        self.entry().summary_label
    }

    /// Resolves a message token to its category, accepting aliases.
    pub fn from_token(token: &str) -> Option<Category> {
        REGISTRY
            .iter()
            .find(|entry| entry.label == token || entry.aliases.contains(&token))
            .map(|entry| entry.category)
    }

    pub fn is_known(token: &str) -> bool {
        Self::from_token(token).is_some()
    }

    /// Closest canonical label for a mistyped token, if any is near enough.
    pub fn suggest(token: &str) -> Option<&'static str> {
        if token.is_empty() {
            return None;
        }
        REGISTRY
            .iter()
            .map(|entry| (levenshtein(entry.label, token), entry.label))
            .filter(|(distance, label)| *distance <= suggestion_limit(label))
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, label)| label)
    }
}

fn suggestion_limit(label: &str) -> usize {
    (label.chars().count() / 2).min(SUGGESTION_DISTANCE)
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_matches_declaration_order() {
        for (index, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.ordinal(), index);
            assert_eq!(REGISTRY[index].category, *category);
        }
    }

    #[test]
    fn columns_start_at_c_and_are_contiguous() {
        assert_eq!(Category::Groceries.column(), 3);
        assert_eq!(Category::Rent.column(), 6);
        assert_eq!(Category::Savings.column(), 11);
    }

    #[test]
    fn tokens_resolve_including_aliases() {
        assert_eq!(Category::from_token("食材費"), Some(Category::Groceries));
        assert_eq!(Category::from_token("家賃"), Some(Category::Rent));
        assert_eq!(Category::from_token("家賃代"), Some(Category::Rent));
        assert_eq!(Category::from_token("貯金"), Some(Category::Savings));
        assert!(!Category::is_known("食費"));
        assert!(!Category::is_known(""));
    }

    #[test]
    fn suggestion_picks_nearest_label() {
        assert_eq!(Category::suggest("食材"), Some("食材費"));
        assert_eq!(Category::suggest("coffee beans"), None);
        assert_eq!(Category::suggest(""), None);
    }

    #[test]
    fn short_tokens_get_no_arbitrary_suggestion() {
        assert_eq!(Category::suggest("外"), None);
        assert_eq!(Category::suggest("貯"), Some("貯金"));
        assert_eq!(Category::suggest("外食"), Some("外食費"));
        assert_eq!(Category::suggest("ガス"), Some("ガス代"));
    }
}
