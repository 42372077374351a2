use std::sync::OnceLock;

use crate::data_models::{Category, Intent};

static CATEGORY_KEYWORDS: OnceLock<Vec<(Category, Vec<&'static str>)>> = OnceLock::new();

/// Known place names, checked in order.
const GAZETTEER: &[&str] = &[
    "jakarta",
    "bali",
    "bandung",
    "surabaya",
    "yogyakarta",
    "medan",
    "semarang",
    "manhattan",
    "new york",
    "london",
    "paris",
    "tokyo",
];

/// Ordered category table. The first category with a matching keyword wins,
/// so order matters: "coffee shop" is a cafe, not shopping.
fn get_category_keywords() -> &'static Vec<(Category, Vec<&'static str>)> {
    CATEGORY_KEYWORDS.get_or_init(|| {
        vec![
            (
                Category::Restaurant,
                vec![
                    "restaurant",
                    "eat",
                    "food",
                    "dinner",
                    "lunch",
                    "breakfast",
                    "pizza",
                    "burger",
                    "sushi",
                    "ramen",
                    // Indonesian
                    "makan",
                    "restoran",
                    "warung",
                    "kuliner",
                ],
            ),
            (
                Category::Cafe,
                vec![
                    "cafe", "coffee", "tea", "kopi", "kafe", "kedai", "warkop",
                ],
            ),
            (
                Category::Park,
                vec!["park", "outdoor", "nature", "taman", "alam", "rekreasi"],
            ),
            (
                Category::Museum,
                vec!["museum", "gallery", "art", "galeri", "seni", "sejarah"],
            ),
            (
                Category::Hotel,
                vec!["hotel", "stay", "accommodation", "penginapan"],
            ),
            (
                Category::Shopping,
                vec![
                    "shop",
                    "mall",
                    "buy",
                    "shopping",
                    "belanja",
                    "pusat perbelanjaan",
                    "toko",
                ],
            ),
        ]
    })
}

/// Network-free classifier used whenever the remote one is down or talks
/// nonsense. Total: it always produces a `SearchPlaces` intent.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn classify(&self, query: &str) -> Intent {
        let lower = query.to_lowercase();

        Intent::SearchPlaces {
            category: Self::detect_category(&lower),
            location: Self::detect_location(&lower),
            refined_query: query.to_string(),
            suggestions: Vec::new(),
        }
    }

    fn detect_category(lower: &str) -> Category {
        get_category_keywords()
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(category, _)| category.clone())
            .unwrap_or(Category::PointOfInterest)
    }

    fn detect_location(lower: &str) -> Option<String> {
        GAZETTEER
            .iter()
            .find(|name| lower.contains(*name))
            .map(|name| name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_of(query: &str) -> Category {
        match KeywordClassifier.classify(query) {
            Intent::SearchPlaces { category, .. } => category,
            other => panic!("fallback must always search, got {:?}", other),
        }
    }

    fn location_of(query: &str) -> Option<String> {
        match KeywordClassifier.classify(query) {
            Intent::SearchPlaces { location, .. } => location,
            other => panic!("fallback must always search, got {:?}", other),
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(category_of("I want pizza"), Category::Restaurant);
        assert_eq!(category_of("coffee near me"), Category::Cafe);
        assert_eq!(category_of("Cari kopi enak"), Category::Cafe);
        assert_eq!(category_of("a quiet park to walk"), Category::Park);
        assert_eq!(category_of("museum of modern art"), Category::Museum);
        assert_eq!(category_of("penginapan murah"), Category::Hotel);
        assert_eq!(category_of("the biggest mall"), Category::Shopping);
        assert_eq!(category_of("somewhere interesting"), Category::PointOfInterest);
    }

    #[test]
    fn test_first_category_in_table_order_wins() {
        // matches both restaurant ("lunch") and cafe ("coffee")
        assert_eq!(category_of("coffee and lunch"), Category::Restaurant);
        // matches both cafe ("coffee") and shopping ("shop")
        assert_eq!(category_of("coffee shop"), Category::Cafe);
    }

    #[test]
    fn test_locations() {
        assert_eq!(location_of("Warung in Jakarta"), Some("jakarta".to_string()));
        assert_eq!(location_of("pizza in New York"), Some("new york".to_string()));
        // manhattan precedes new york in the gazetteer
        assert_eq!(
            location_of("new york, manhattan bagels"),
            Some("manhattan".to_string())
        );
        assert_eq!(location_of("pizza near me"), None);
    }

    #[test]
    fn test_refined_query_is_original_and_no_suggestions() {
        match KeywordClassifier.classify("Sushi in Tokyo") {
            Intent::SearchPlaces {
                refined_query,
                suggestions,
                ..
            } => {
                assert_eq!(refined_query, "Sushi in Tokyo");
                assert!(suggestions.is_empty());
            }
            other => panic!("fallback must always search, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(category_of(""), Category::PointOfInterest);
        assert_eq!(location_of(""), None);
    }
}
