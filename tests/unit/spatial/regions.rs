//! Tests for region sizing, coordinate mapping and neighbor search

#[cfg(test)]
mod tests {
    use blockmap::spatial::regions::{RegionMapper, SpatialIndex, region_count, region_count_for};
    use blockmap::spatial::section::SectionId;
    use std::collections::BTreeSet;

    // Tests region counts scale with tile count and clamp to limits
    // Verified by removing the clamp
    #[test]
    fn test_region_count() {
        assert_eq!(region_count_for(0), 5);
        assert_eq!(region_count_for(700), 10);
        assert_eq!(region_count_for(70_000), 100);
        assert_eq!(region_count(30, 10, 1, 2), 2);
        assert_eq!(region_count(30, 0, 1, 100), 30);
    }

    // Tests coordinates map linearly and the maximum lands in the last bucket
    // Verified by removing the upper clamp in bucketing
    #[test]
    fn test_region_of() {
        let mapper = RegionMapper::fit(&[[0.0, 0.0], [1.0, 2.0]], 4);
        assert_eq!(mapper.count(), 4);
        assert_eq!(mapper.region_of([0.0, 0.0]), (0, 0));
        assert_eq!(mapper.region_of([0.5, 1.0]), (2, 2));
        assert_eq!(mapper.region_of([1.0, 2.0]), (3, 3));
        assert_eq!(mapper.region_of([-5.0, 9.0]), (0, 3));
    }

    // Tests a zero span maps everything to the first bucket
    // Verified by dividing by the span unconditionally
    #[test]
    fn test_region_of_zero_span() {
        let mapper = RegionMapper::fit(&[[0.3, 0.1], [0.3, 0.1]], 5);
        assert_eq!(mapper.region_of([0.3, 0.1]), (0, 0));
    }

    // Tests insert and remove keep registrations balanced
    // Verified by removing only from the first listed region
    #[test]
    fn test_insert_remove() {
        let mut index = SpatialIndex::new(3);
        let regions = BTreeSet::from([(0, 0), (1, 1), (9, 9)]);
        index.insert(SectionId(1), &regions);
        assert_eq!(index.registrations(), 2);
        assert_eq!(index.sections_in((1, 1)).collect::<Vec<_>>(), vec![SectionId(1)]);

        index.remove(SectionId(1), &regions);
        assert_eq!(index.registrations(), 0);
    }

    // Tests neighbor search never returns the queried section
    // Verified by dropping the self filter
    #[test]
    fn test_neighbors_exclude_self() {
        let mut index = SpatialIndex::new(5);
        let here = BTreeSet::from([(2, 2)]);
        index.insert(SectionId(0), &here);
        assert!(index.neighbors(SectionId(0), &here).is_empty());

        index.insert(SectionId(1), &here);
        assert_eq!(index.neighbors(SectionId(0), &here), BTreeSet::from([SectionId(1)]));
    }

    // Tests the first ring is always visited even when the home region has neighbors
    // Verified by stopping at ring zero
    #[test]
    fn test_neighbors_visit_minimum_ring() {
        let mut index = SpatialIndex::new(5);
        index.insert(SectionId(0), &BTreeSet::from([(2, 2)]));
        index.insert(SectionId(1), &BTreeSet::from([(2, 2)]));
        index.insert(SectionId(2), &BTreeSet::from([(3, 3)]));
        index.insert(SectionId(3), &BTreeSet::from([(4, 4)]));

        let found = index.neighbors(SectionId(0), &BTreeSet::from([(2, 2)]));
        assert_eq!(found, BTreeSet::from([SectionId(1), SectionId(2)]));
    }

    // Tests search expands outward until something is found
    // Verified by capping the search at the minimum ring
    #[test]
    fn test_neighbors_expand_to_far_rings() {
        let mut index = SpatialIndex::new(6);
        index.insert(SectionId(0), &BTreeSet::from([(0, 0)]));
        index.insert(SectionId(1), &BTreeSet::from([(5, 5)]));
        index.insert(SectionId(2), &BTreeSet::from([(5, 0)]));

        let found = index.neighbors(SectionId(0), &BTreeSet::from([(0, 0)]));
        assert_eq!(found, BTreeSet::from([SectionId(1), SectionId(2)]));
    }
}
