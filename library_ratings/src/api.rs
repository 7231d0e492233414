use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type BookId = String;
pub type RatingValue = i32;

pub const MIN_RATING_VALUE: RatingValue = 1;
pub const MAX_RATING_VALUE: RatingValue = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Ratings submitted for a single book together with their average
pub struct RatingRecord {
    pub id: BookId,
    pub title: String,
    /// Mean of `values` rounded to 2 decimal places, 0 when there are no values
    pub average: f64,
    pub values: Vec<RatingValue>,
}

impl RatingRecord {
    pub fn new(id: BookId, title: String) -> Self {
        Self::from_values(id, title, vec![])
    }

    pub fn from_values(id: BookId, title: String, values: Vec<RatingValue>) -> Self {
        Self {
            id,
            title,
            average: rounded_average(&values),
            values,
        }
    }

    pub fn push_value(&mut self, value: RatingValue) {
        self.values.push(value);
        self.average = rounded_average(&self.values);
    }
}

/// Mean of the values rounded to 2 decimal places, exact halves go to the even hundredth
pub fn rounded_average(values: &[RatingValue]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let count = values.len() as i64;
    let hundredths: i64 = values.iter().map(|&v| v as i64).sum::<i64>() * 100;
    let mut quotient = hundredths.div_euclid(count);
    let remainder = hundredths.rem_euclid(count);
    if 2 * remainder > count || (2 * remainder == count && quotient % 2 != 0) {
        quotient += 1;
    }
    quotient as f64 / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
/// Request registering an empty rating record for a book
pub struct NewRatingRequest {
    pub id: BookId,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
pub struct RatingSubmission {
    pub value: RatingValue,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Rating value {0} is not valid, expected a whole number from 1 to 5")]
pub struct InvalidRatingValue(pub RatingValue);

impl RatingSubmission {
    pub fn validated(&self) -> Result<RatingValue, InvalidRatingValue> {
        if (MIN_RATING_VALUE..=MAX_RATING_VALUE).contains(&self.value) {
            Ok(self.value)
        } else {
            Err(InvalidRatingValue(self.value))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct RatingAverage {
    pub id: BookId,
    pub average: f64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Apiv2Schema)]
#[serde(deny_unknown_fields)]
/// Fields of a rating record that can be replaced, anything else is rejected as a whole
pub struct RatingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl RatingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
/// Entry of the top rated books leaderboard
pub struct TopRatedBook {
    pub id: BookId,
    pub title: String,
    pub average: f64,
}

#[cfg(test)]
mod api_tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_average_is_rounded_to_two_decimals() {
        let mut record = RatingRecord::new("9780553294385".to_string(), "I, Robot".to_string());
        assert_eq!(record.average, 0.0);

        for value in [5, 5, 5, 5, 1] {
            record.push_value(value);
        }
        assert_eq!(record.average, 4.2);
        assert_eq!(record.values, vec![5, 5, 5, 5, 1]);

        assert_eq!(rounded_average(&[5, 4, 4]), 4.33);
        assert_eq!(rounded_average(&[1, 2]), 1.5);
    }

    #[test]
    /// 33/8 and 29/8 end exactly on a half hundredth
    fn test_half_hundredths_round_to_even() {
        assert_eq!(rounded_average(&[5, 5, 5, 5, 5, 5, 2, 1]), 4.12);
        assert_eq!(rounded_average(&[5, 5, 5, 5, 5, 2, 1, 1]), 3.62);
        assert_eq!(rounded_average(&[5, 5, 5, 5, 5, 5, 3, 2]), 4.38);
    }

    #[test]
    fn test_rating_value_range() {
        assert_eq!(RatingSubmission { value: 1 }.validated(), Ok(1));
        assert_eq!(RatingSubmission { value: 5 }.validated(), Ok(5));
        assert_eq!(
            RatingSubmission { value: 0 }.validated(),
            Err(InvalidRatingValue(0))
        );
        assert_eq!(
            RatingSubmission { value: 6 }.validated(),
            Err(InvalidRatingValue(6))
        );
    }

    #[test]
    fn test_patch_accepts_only_title() {
        let patch: RatingPatch = serde_json::from_value(json!({ "title": "New" })).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));

        assert!(serde_json::from_value::<RatingPatch>(json!({ "average": 5.0 })).is_err());
        assert!(
            serde_json::from_value::<RatingPatch>(json!({ "title": "New", "values": [5] }))
                .is_err()
        );
        assert!(serde_json::from_value::<RatingPatch>(json!({})).unwrap().is_empty());
    }
}
