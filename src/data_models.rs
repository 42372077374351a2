use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Place category. Anything the classifier invents outside the known set is
/// carried through verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Restaurant,
    Cafe,
    Park,
    Museum,
    Hotel,
    Shopping,
    Attraction,
    #[default]
    PointOfInterest,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Restaurant => "restaurant",
            Category::Cafe => "cafe",
            Category::Park => "park",
            Category::Museum => "museum",
            Category::Hotel => "hotel",
            Category::Shopping => "shopping",
            Category::Attraction => "attraction",
            Category::PointOfInterest => "point_of_interest",
            Category::Other(other) => other,
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "restaurant" => Category::Restaurant,
            "cafe" => Category::Cafe,
            "park" => Category::Park,
            "museum" => Category::Museum,
            "hotel" => Category::Hotel,
            "shopping" => Category::Shopping,
            "attraction" => Category::Attraction,
            "point_of_interest" => Category::PointOfInterest,
            _ => Category::Other(raw),
        }
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured classification of a user query.
///
/// The wire shape is the one the classifier is instructed to answer with:
/// `{"intent": "search_places", "category": .., "location": .., "query": .., "suggestions": [..]}`
/// or `{"intent": "general", "response": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    SearchPlaces {
        #[serde(default, deserialize_with = "null_as_default")]
        category: Category,
        #[serde(default)]
        location: Option<String>,
        #[serde(rename = "query", default, deserialize_with = "null_as_default")]
        refined_query: String,
        #[serde(default, deserialize_with = "null_as_default")]
        suggestions: Vec<String>,
    },
    General {
        #[serde(default)]
        response: String,
    },
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Intent {
    pub fn is_search(&self) -> bool {
        matches!(self, Intent::SearchPlaces { .. })
    }

    /// Fill in a blank refined query with the query the user typed.
    pub fn with_default_query(self, original: &str) -> Self {
        match self {
            Intent::SearchPlaces {
                category,
                location,
                refined_query,
                suggestions,
            } => {
                let refined_query = if refined_query.trim().is_empty() {
                    original.to_string()
                } else {
                    refined_query
                };
                Intent::SearchPlaces {
                    category,
                    location,
                    refined_query,
                    suggestions,
                }
            }
            general => general,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ratings: Option<u64>,
    pub location: LatLng,
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_now: Option<bool>,
    pub maps_url: String,
    pub embed_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub query: String,
    pub location: Option<String>,
    pub radius: Option<u32>,
    #[serde(rename = "resultsCount")]
    pub result_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub intent: Intent,
    pub places: Vec<Place>,
    pub metadata: SearchMetadata,
}

impl SearchResult {
    pub fn new(
        intent: Intent,
        places: Vec<Place>,
        query: String,
        location: Option<String>,
        radius: Option<u32>,
    ) -> SearchResult {
        let result_count = places.len();
        SearchResult {
            intent,
            places,
            metadata: SearchMetadata {
                query,
                location,
                radius,
                result_count,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_parses_classifier_shape() {
        let intent: Intent = serde_json::from_value(json!({
            "intent": "search_places",
            "category": "cafe",
            "location": "Bandung",
            "query": "specialty coffee in Bandung",
            "suggestions": ["Kopi Anjis", "Two Hands"]
        }))
        .unwrap();

        assert_eq!(
            intent,
            Intent::SearchPlaces {
                category: Category::Cafe,
                location: Some("Bandung".to_string()),
                refined_query: "specialty coffee in Bandung".to_string(),
                suggestions: vec!["Kopi Anjis".to_string(), "Two Hands".to_string()],
            }
        );
    }

    #[test]
    fn test_unknown_category_passes_through() {
        let intent: Intent = serde_json::from_value(json!({
            "intent": "search_places",
            "category": "night_market",
            "query": "night market"
        }))
        .unwrap();

        match intent {
            Intent::SearchPlaces {
                category,
                location,
                suggestions,
                ..
            } => {
                assert_eq!(category, Category::Other("night_market".to_string()));
                assert_eq!(category.as_str(), "night_market");
                assert!(location.is_none());
                assert!(suggestions.is_empty());
            }
            other => panic!("expected search intent, got {:?}", other),
        }
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let intent: Intent = serde_json::from_value(json!({
            "intent": "search_places",
            "category": null,
            "location": null,
            "query": null,
            "suggestions": null
        }))
        .unwrap();

        assert_eq!(
            intent,
            Intent::SearchPlaces {
                category: Category::PointOfInterest,
                location: None,
                refined_query: String::new(),
                suggestions: Vec::new(),
            }
        );
    }

    #[test]
    fn test_general_intent_round_trips_tag() {
        let intent = Intent::General {
            response: "Hello!".to_string(),
        };
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value, json!({"intent": "general", "response": "Hello!"}));
    }

    #[test]
    fn test_unknown_intent_tag_is_rejected() {
        let parsed = serde_json::from_value::<Intent>(json!({"intent": "weather"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_with_default_query_fills_blank() {
        let intent = Intent::SearchPlaces {
            category: Category::Park,
            location: None,
            refined_query: "  ".to_string(),
            suggestions: vec![],
        }
        .with_default_query("parks nearby");

        match intent {
            Intent::SearchPlaces { refined_query, .. } => assert_eq!(refined_query, "parks nearby"),
            other => panic!("expected search intent, got {:?}", other),
        }
    }

    #[test]
    fn test_place_omits_absent_optionals() {
        let place = Place {
            id: "abc".to_string(),
            name: "Somewhere".to_string(),
            address: "1 Street".to_string(),
            rating: None,
            total_ratings: None,
            location: LatLng { lat: 1.0, lng: 2.0 },
            types: vec!["cafe".to_string()],
            open_now: None,
            maps_url: "m".to_string(),
            embed_url: "e".to_string(),
        };
        let value = serde_json::to_value(&place).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("rating"));
        assert!(!object.contains_key("totalRatings"));
        assert!(!object.contains_key("openNow"));
        assert_eq!(object["mapsUrl"], "m");
        assert_eq!(object["embedUrl"], "e");
    }
}
