//! Tests for ordered and forced merge candidate generation

#[cfg(test)]
mod tests {
    use blockmap::algorithm::candidate::{
        MergeCandidate, MergeCost, MergeLimits, PairKey, empty_cells, force_merge, hole_estimate,
        merge, merged_dimensions,
    };
    use blockmap::spatial::section::{Axis, Bounds, Section, SectionId};
    use ndarray::{Array2, array};
    use std::collections::BTreeSet;

    const UNLIMITED: MergeLimits = MergeLimits {
        max_distance: f64::INFINITY,
        max_holes: None,
    };

    fn single(id: usize, tile: usize, at: [f64; 2]) -> Section {
        Section::singleton(SectionId(id), tile, at, (id, id))
    }

    fn block(id: usize, cells: Array2<Option<usize>>, at: [f64; 2]) -> Section {
        Section::from_parts(SectionId(id), cells, Bounds::point(at), BTreeSet::from([(0, 0)]))
    }

    fn sorted(mut candidates: Vec<MergeCandidate>) -> Vec<MergeCandidate> {
        candidates.sort();
        candidates
    }

    // Tests pair keys are order independent
    // Verified by storing ids in argument order
    #[test]
    fn test_pair_key_normalizes() {
        assert_eq!(PairKey::new(SectionId(4), SectionId(1)), PairKey(SectionId(1), SectionId(4)));
    }

    // Tests argument order doesn't change the generated orientations
    // Verified by only trying the (a, b) order
    #[test]
    fn test_merge_commutative() {
        let a = single(0, 0, [0.0, 0.0]);
        let b = single(1, 1, [1.0, 1.0]);
        let colors = [[0.0; 3], [0.1, 0.0, 0.0]];

        let ab = sorted(merge(&a, &b, &colors, UNLIMITED));
        let ba = sorted(merge(&b, &a, &colors, UNLIMITED));
        assert_eq!(ab, ba);
        assert_eq!(ab.len(), 2);
        assert!(ab.iter().all(|c| c.first == SectionId(0) && c.second == SectionId(1)));
    }

    // Tests ordered merges respect coordinate order
    // Verified by removing the precedes check
    #[test]
    fn test_merge_requires_order() {
        let a = single(0, 0, [0.0, 1.0]);
        let b = single(1, 1, [1.0, 0.0]);
        let colors = [[0.0; 3]; 2];

        let candidates = merge(&a, &b, &colors, UNLIMITED);
        assert_eq!(candidates.len(), 2);
        let horizontal: Vec<_> = candidates.iter().filter(|c| c.axis == Axis::Horizontal).collect();
        let vertical: Vec<_> = candidates.iter().filter(|c| c.axis == Axis::Vertical).collect();
        assert_eq!(horizontal.len(), 1);
        assert_eq!(horizontal.first().map(|c| c.first), Some(SectionId(0)));
        assert_eq!(vertical.first().map(|c| c.first), Some(SectionId(1)));
    }

    // Tests the distance threshold filters candidates
    // Verified by comparing against the threshold with the wrong sign
    #[test]
    fn test_merge_distance_limit() {
        let a = single(0, 0, [0.0, 0.0]);
        let b = single(1, 1, [1.0, 1.0]);
        let colors = [[0.0; 3], [0.1, 0.0, 0.0]];
        let tight = MergeLimits {
            max_distance: 0.05,
            max_holes: None,
        };
        assert!(merge(&a, &b, &colors, tight).is_empty());
    }

    // Tests the hole budget filters candidates and stored costs carry no holes
    // Verified by storing the hole estimate in the cost
    #[test]
    fn test_merge_hole_budget() {
        let wide = block(0, array![[Some(0), Some(1)]], [0.0, 0.0]);
        let b = single(1, 2, [1.0, 1.0]);
        let colors = [[0.0; 3]; 3];
        let strict = MergeLimits {
            max_distance: f64::INFINITY,
            max_holes: Some(0),
        };

        let candidates = merge(&wide, &b, &colors, strict);
        assert!(candidates.iter().all(|c| c.axis != Axis::Horizontal));

        let relaxed = merge(&wide, &b, &colors, UNLIMITED);
        assert!(relaxed.iter().any(|c| c.axis == Axis::Horizontal));
        assert!(relaxed.iter().all(|c| c.cost.holes == 0));
    }

    // Tests hole estimates for pairs, mismatches and elongation
    // Verified by dropping the elongation term
    #[test]
    fn test_hole_estimate() {
        let a = single(0, 0, [0.0, 0.0]);
        let b = single(1, 1, [0.0, 0.0]);
        let tall = block(2, array![[Some(2)], [Some(3)]], [0.0, 0.0]);
        let wide = block(3, array![[Some(4), Some(5)]], [0.0, 0.0]);

        assert_eq!(hole_estimate(&a, &b, Axis::Horizontal), 0);
        assert_eq!(hole_estimate(&a, &b, Axis::Vertical), 0);
        assert_eq!(hole_estimate(&a, &tall, Axis::Horizontal), 1);
        assert_eq!(hole_estimate(&wide, &a, Axis::Horizontal), 3);
    }

    // Tests merged dimensions and introduced empty cells
    // Verified by using the longer extent when counting empty cells
    #[test]
    fn test_dimensions_and_empty_cells() {
        let a = single(0, 0, [0.0, 0.0]);
        let tall = block(1, array![[Some(1)], [Some(2)]], [0.0, 0.0]);
        assert_eq!(merged_dimensions(&a, &tall, Axis::Horizontal), (2, 2));
        assert_eq!(merged_dimensions(&a, &tall, Axis::Vertical), (1, 3));
        assert_eq!(empty_cells(&a, &tall, Axis::Horizontal), 1);
        assert_eq!(empty_cells(&a, &tall, Axis::Vertical), 0);
    }

    // Tests the seam slides the shorter side to the best matching position
    // Verified by always using offset zero
    #[test]
    fn test_seam_alignment_and_materialize() {
        let tall = block(0, array![[Some(0)], [Some(1)]], [0.0, 0.0]);
        let b = single(1, 2, [1.0, 0.0]);
        let colors = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.9, 0.0, 0.0]];

        let candidates = merge(&tall, &b, &colors, UNLIMITED);
        let horizontal = candidates
            .iter()
            .find(|c| c.axis == Axis::Horizontal)
            .expect("horizontal join");
        assert_eq!((horizontal.shift_first, horizontal.shift_second), (0, 1));
        assert!((horizontal.cost.distance - 0.1).abs() < 1e-9);

        let merged = horizontal
            .materialize(SectionId(2), &tall, &b)
            .expect("valid materialization");
        assert_eq!(merged.cells(), &array![[Some(0), None], [Some(1), Some(2)]]);
        assert_eq!(merged.hole_count(), 1);
    }

    // Tests merged sections take the union of bounds and regions
    // Verified by keeping only the first operand's regions
    #[test]
    fn test_materialize_unions_regions() {
        let a = single(0, 0, [0.0, 0.0]);
        let b = single(1, 1, [1.0, 1.0]);
        let colors = [[0.0; 3]; 2];
        let candidate = merge(&a, &b, &colors, UNLIMITED)
            .into_iter()
            .find(|c| c.axis == Axis::Horizontal)
            .expect("horizontal join");

        let merged = candidate.materialize(SectionId(2), &a, &b).expect("valid");
        assert_eq!(merged.id(), SectionId(2));
        assert_eq!(merged.cells(), &array![[Some(0), Some(1)]]);
        assert_eq!(merged.regions(), &BTreeSet::from([(0, 0), (1, 1)]));
        assert_eq!(merged.bounds().min, [0.0, 0.0]);
        assert_eq!(merged.bounds().max, [1.0, 1.0]);
    }

    // Tests materializing against the wrong operands is rejected
    // Verified by skipping the id check
    #[test]
    fn test_materialize_wrong_operands() {
        let a = single(0, 0, [0.0, 0.0]);
        let b = single(1, 1, [1.0, 1.0]);
        let candidate = merge(&a, &b, &[[0.0; 3]; 2], UNLIMITED)
            .into_iter()
            .next()
            .expect("candidate");
        assert!(candidate.materialize(SectionId(2), &b, &a).is_err());
    }

    // Tests forced merges always propose something, in coordinate order
    // Verified by reusing the ordered precedes filter
    #[test]
    fn test_force_merge_always_proposes() {
        let a = single(0, 0, [1.0, 1.0]);
        let b = single(1, 1, [0.0, 0.0]);
        let colors = [[0.0; 3], [0.2, 0.0, 0.0]];

        let candidates = force_merge(&a, &b, &colors);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.first == SectionId(1)));
        assert!(candidates.iter().all(|c| (c.cost.distance - 5.2).abs() < 1e-9));
    }

    // Tests the smaller section gets a reversed variant along the join axis
    // Verified by flipping the larger section instead
    #[test]
    fn test_force_merge_flip_variant() {
        let long = block(0, array![[Some(0), Some(1), Some(2)]], [0.0, 0.0]);
        let short = block(1, array![[Some(3), Some(4)]], [1.0, 0.0]);
        let colors = [[0.0; 3]; 5];

        let candidates = force_merge(&long, &short, &colors);
        let horizontal: Vec<_> = candidates.iter().filter(|c| c.axis == Axis::Horizontal).collect();
        assert_eq!(candidates.len(), 3);
        assert_eq!(horizontal.len(), 2);
        assert!(horizontal.iter().any(|c| !c.flip_first && c.flip_second));
        assert!(horizontal.iter().all(|c| !c.flip_first));
    }

    // Tests forced merges rank by introduced empty cells
    // Verified by ranking on distance alone
    #[test]
    fn test_force_merge_prefers_gap_free() {
        let wide = block(0, array![[Some(0), Some(1)]], [0.0, 0.0]);
        let b = single(1, 2, [1.0, 1.0]);
        let colors = [[0.0; 3]; 3];

        let best = force_merge(&wide, &b, &colors).into_iter().min().expect("candidate");
        assert_eq!(best.axis, Axis::Horizontal);
        assert_eq!(best.cost.holes, 0);
    }

    // Tests joins with no facing tiles fall back to the unmatched seam distance
    // Verified by treating an unmatched seam as distance zero
    #[test]
    fn test_unmatched_seam() {
        let holed = block(0, array![[Some(0), None]], [0.0, 0.0]);
        let b = single(1, 1, [0.0, 0.0]);
        let colors = [[0.0; 3]; 2];

        let ordered = merge(&holed, &b, &colors, UNLIMITED);
        assert!(
            ordered
                .iter()
                .all(|c| c.axis != Axis::Horizontal || c.first != SectionId(0))
        );
        let forced = force_merge(&holed, &b, &colors);
        let horizontal = forced
            .iter()
            .find(|c| c.axis == Axis::Horizontal && c.first == SectionId(0))
            .expect("horizontal join");
        assert!((horizontal.cost.distance - 4.0).abs() < 1e-9);
    }

    // Tests candidates order by cost before geometry
    // Verified by comparing ids before cost
    #[test]
    fn test_candidate_ordering() {
        let make = |first: usize, holes: usize, distance: f64| MergeCandidate {
            first: SectionId(first),
            second: SectionId(9),
            axis: Axis::Horizontal,
            flip_first: false,
            flip_second: false,
            shift_first: 0,
            shift_second: 0,
            empty_cells: holes,
            cost: MergeCost { holes, distance },
        };

        let mut candidates = vec![make(0, 1, 0.0), make(1, 0, 0.5), make(2, 0, 0.1)];
        candidates.sort();
        let firsts: Vec<_> = candidates.iter().map(|c| c.first.0).collect();
        assert_eq!(firsts, vec![2, 1, 0]);
        assert!(candidates.iter().all(|c| c.involves(SectionId(9))));
        assert_eq!(
            candidates.first().map(MergeCandidate::pair),
            Some(PairKey(SectionId(2), SectionId(9)))
        );
    }
}
