use crate::model::report::ListingFilter;
use crate::model::EntityKind;
use serde::Deserialize;

#[derive(Deserialize)]
/// JSON part of a CSV upload: which table the file that follows feeds.
pub struct ImportUploadRequest {
    pub entity: EntityKind,
}

#[derive(Deserialize, Default)]
/// Query string of the listing browser. Each field holds a comma separated
/// list of accepted values.
pub struct ListingQuery {
    pub location: Option<String>,
    pub provider: Option<String>,
    pub food_type: Option<String>,
}

impl ListingQuery {
    pub fn into_filter(self) -> ListingFilter {
        ListingFilter {
            locations: split_list(self.location),
            provider_names: split_list(self.provider),
            food_types: split_list(self.food_type),
        }
    }
}

fn split_list(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
