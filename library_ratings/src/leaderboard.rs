use std::cmp::Ordering;

use itertools::Itertools;

use crate::api::{RatingRecord, TopRatedBook};

/// Number of leaderboard places, ties at the last place extend the result
pub const TOP_PLACES: usize = 3;
/// A book needs at least this many values to be ranked
pub const MIN_VALUES_TO_RANK: usize = 3;

/// Selects the best rated books.
///
/// Only records with at least [`MIN_VALUES_TO_RANK`] values take part. The result holds the
/// [`TOP_PLACES`] highest averages plus every further record whose average equals the
/// average of the last place (the cutoff). Equal averages are ordered by id.
pub fn top_rated<'a>(records: impl IntoIterator<Item = &'a RatingRecord>) -> Vec<TopRatedBook> {
    let ranked = records
        .into_iter()
        .filter(|record| record.values.len() >= MIN_VALUES_TO_RANK)
        .sorted_by(|a, b| compare_for_ranking(a, b))
        .collect_vec();

    let Some(cutoff) = ranked.get(TOP_PLACES - 1).map(|record| record.average) else {
        return ranked.into_iter().map(to_top_rated).collect();
    };

    ranked
        .into_iter()
        .enumerate()
        .take_while(|(place, record)| *place < TOP_PLACES || record.average == cutoff)
        .map(|(_, record)| to_top_rated(record))
        .collect()
}

fn compare_for_ranking(a: &RatingRecord, b: &RatingRecord) -> Ordering {
    b.average
        .total_cmp(&a.average)
        .then_with(|| a.id.cmp(&b.id))
}

fn to_top_rated(record: &RatingRecord) -> TopRatedBook {
    TopRatedBook {
        id: record.id.clone(),
        title: record.title.clone(),
        average: record.average,
    }
}
