//! Field filtering for token-efficient daily-series responses.

use serde_json::Value;

/// Every metric field a serialised `DayMetrics` may carry, besides `date`.
pub const DAY_FIELDS: &[&str] = &[
    "sleepHours",
    "mood",
    "steps",
    "calories",
    "painLevel",
    "stress",
    "energy",
    "relationsScore",
    "wealthScore",
];

/// Names in `fields` that are not day metrics.
pub fn unknown_day_fields(fields: &[String]) -> Vec<String> {
    fields
        .iter()
        .filter(|f| f.as_str() != "date" && !DAY_FIELDS.contains(&f.as_str()))
        .cloned()
        .collect()
}

/// Keep only the requested fields on each object of an array. `date` is always
/// kept so the rows stay aligned.
pub fn filter_array_fields(value: &Value, fields: &[String]) -> Value {
    let Some(arr) = value.as_array() else {
        return value.clone();
    };

    let filtered: Vec<Value> = arr
        .iter()
        .map(|item| {
            let Some(obj) = item.as_object() else {
                return item.clone();
            };

            let mut result = serde_json::Map::new();
            if let Some(date) = obj.get("date") {
                result.insert("date".to_string(), date.clone());
            }
            for field in fields {
                if let Some(val) = obj.get(field) {
                    result.insert(field.clone(), val.clone());
                }
            }
            Value::Object(result)
        })
        .collect();

    Value::Array(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_array_fields_keeps_date() {
        let arr = serde_json::json!([
            {"date": "2024-01-01", "mood": 6.5, "steps": 1200.0},
            {"date": "2024-01-02", "steps": 800.0}
        ]);
        let fields = vec!["mood".to_string()];
        let result = filter_array_fields(&arr, &fields);
        let result_arr = result.as_array().unwrap();
        assert_eq!(result_arr.len(), 2);
        assert_eq!(result_arr[0]["mood"], 6.5);
        assert!(result_arr[0].get("steps").is_none());
        assert_eq!(result_arr[1], serde_json::json!({"date": "2024-01-02"}));
    }

    #[test]
    fn test_filter_non_array_returns_clone() {
        let val = serde_json::json!({"date": "2024-01-01"});
        assert_eq!(filter_array_fields(&val, &["mood".to_string()]), val);
    }

    #[test]
    fn test_unknown_day_fields() {
        let fields = vec!["mood".to_string(), "date".to_string(), "hrv".to_string()];
        assert_eq!(unknown_day_fields(&fields), vec!["hrv".to_string()]);
    }
}
