use crate::detection::domain::face_candidate::FaceCandidate;

/// Keeps candidates whose neighbor count strictly exceeds `min_neighbors`.
///
/// Detector order is preserved; nothing is merged or reordered.
pub fn filter_candidates(candidates: &[FaceCandidate], min_neighbors: u32) -> Vec<FaceCandidate> {
    candidates
        .iter()
        .filter(|c| c.neighbors > min_neighbors)
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::EMIT_MIN_NEIGHBORS;
    use rstest::rstest;

    fn candidate(x: i32, neighbors: u32) -> FaceCandidate {
        FaceCandidate::new(x, 10, 20, 30, neighbors)
    }

    #[rstest]
    #[case::well_below(2, false)]
    #[case::at_threshold(10, false)]
    #[case::just_above(11, true)]
    #[case::strong(42, true)]
    fn test_threshold_is_strict(#[case] neighbors: u32, #[case] kept: bool) {
        let result = filter_candidates(&[candidate(0, neighbors)], EMIT_MIN_NEIGHBORS);
        assert_eq!(result.len() == 1, kept);
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_candidates(&[], EMIT_MIN_NEIGHBORS).is_empty());
    }

    #[test]
    fn test_preserves_detector_order() {
        let candidates = vec![candidate(3, 20), candidate(1, 5), candidate(2, 15)];
        let result = filter_candidates(&candidates, EMIT_MIN_NEIGHBORS);
        let xs: Vec<i32> = result.iter().map(|c| c.x).collect();
        assert_eq!(xs, vec![3, 2]);
    }
}
