use types::ScoredMedia;

/// Orders scored candidates best-first and truncates to the item
/// budget.
///
/// The sort is stable, so candidates with equal scores keep their
/// discovery order and repeated runs over the same pool rank
/// identically. An empty input yields an empty output.
#[must_use]
pub fn rank(
    mut items: Vec<ScoredMedia>,
    max_items: usize,
) -> Vec<ScoredMedia> {
    items.sort_by_key(|item| std::cmp::Reverse(item.score));
    items.truncate(max_items);
    items
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use types::{MediaCandidate, MediaKind, ScoredMedia};

    use super::rank;

    fn scored(id: &str, score: u8) -> ScoredMedia {
        ScoredMedia {
            candidate: MediaCandidate {
                id: id.to_string(),
                kind: MediaKind::Image,
                description: String::new(),
                source_url: String::new(),
                photographer: None,
                photographer_url: None,
                raw_metadata: serde_json::Value::Null,
            },
            score,
            rationale: String::new(),
        }
    }

    #[test]
    fn test_rank_sorts_descending_and_truncates() {
        let items = vec![
            scored("low", 2),
            scored("high", 9),
            scored("mid", 5),
            scored("floor", 1),
        ];

        let ranked = rank(items, 3);

        let ids: Vec<&str> =
            ranked.iter().map(|item| item.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_rank_output_is_non_increasing() {
        let items = vec![
            scored("a", 3),
            scored("b", 7),
            scored("c", 7),
            scored("d", 10),
            scored("e", 0),
        ];

        let ranked = rank(items, 10);

        assert_eq!(ranked.len(), 5);
        assert!(
            ranked.windows(2).all(|pair| pair[0].score >= pair[1].score)
        );
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let items =
            vec![scored("first", 5), scored("second", 5), scored("third", 5)];

        let ranked = rank(items, 10);

        let ids: Vec<&str> =
            ranked.iter().map(|item| item.candidate.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_length_is_min_of_budget_and_pool() {
        assert_eq!(rank(vec![], 5), vec![]);
        assert_eq!(rank(vec![scored("a", 1)], 5).len(), 1);
        assert_eq!(
            rank(vec![scored("a", 1), scored("b", 2)], 1).len(),
            1
        );
    }
}
