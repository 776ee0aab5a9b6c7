use crate::model::WeatherRecord;

/// Records whose display name contains `query`, ignoring case. An empty query
/// keeps everything. Order is preserved.
pub fn filter_by_name<'a>(records: &'a [WeatherRecord], query: &str) -> Vec<&'a WeatherRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CityId;
    use serde_json::json;

    fn record(id: u64, name: &str) -> WeatherRecord {
        WeatherRecord { id: CityId(id), name: name.to_string(), payload: json!({ "id": id, "name": name }) }
    }

    fn names(records: Vec<&WeatherRecord>) -> Vec<&str> {
        records.into_iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn empty_query_keeps_all_in_order() {
        let records = vec![record(1, "Tokyo"), record(2, "London"), record(3, "Milan")];
        assert_eq!(names(filter_by_name(&records, "")), vec!["Tokyo", "London", "Milan"]);
    }

    #[test]
    fn match_is_case_insensitive_on_both_sides() {
        let records = vec![record(1, "Tokyo"), record(2, "London"), record(3, "Kuala Lumpur")];

        assert_eq!(names(filter_by_name(&records, "lon")), vec!["London"]);
        assert_eq!(names(filter_by_name(&records, "LON")), vec!["London"]);
        assert_eq!(names(filter_by_name(&records, "lUMp")), vec!["Kuala Lumpur"]);
    }

    #[test]
    fn no_match_gives_empty_view() {
        let records = vec![record(1, "Tokyo")];
        assert!(filter_by_name(&records, "paris").is_empty());
    }
}
