use {level_assets::BatchLayout, progress::PlacementLookup, std::ops::Range};

/// Batch ranges over the level's ordered target list, clamped to the
/// targets that actually exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    ranges: Vec<Range<usize>>,
    /// Targets the layout asked for.
    required: usize,
    /// Targets the level has.
    available: usize,
}

impl BatchPlan {
    /// Cuts `target_count` targets into batches following `layout`.
    ///
    /// Batches that end up empty after clamping (or were configured with a
    /// size of zero) are dropped. Targets past the configured total belong to
    /// no batch.
    pub fn new(layout: &BatchLayout, target_count: usize) -> Self {
        let mut ranges = Vec::new();
        let mut start = 0;
        for size in layout.sizes() {
            let end = (start + size).min(target_count);
            if end > start {
                ranges.push(start..end);
            }
            start = end;
        }

        Self {
            ranges,
            required: layout.required_targets(),
            available: target_count,
        }
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn range(&self, batch: usize) -> Option<Range<usize>> {
        self.ranges.get(batch).cloned()
    }

    pub fn size(&self, batch: usize) -> usize {
        self.ranges.get(batch).map_or(0, |range| range.len())
    }

    pub fn is_last(&self, batch: usize) -> bool {
        batch + 1 >= self.ranges.len()
    }

    /// Batch containing the target at `target_index`.
    pub fn batch_of(&self, target_index: usize) -> Option<usize> {
        self.ranges
            .iter()
            .position(|range| range.contains(&target_index))
    }

    /// `true` when the layout and the level disagree on the target count.
    pub fn is_mismatched(&self) -> bool {
        self.required != self.available
    }

    pub fn required_targets(&self) -> usize {
        self.required
    }

    /// Number of targets no batch covers.
    pub fn unreachable_targets(&self) -> usize {
        self.available - self.ranges.last().map_or(0, |range| range.end)
    }
}

/// Where a level resumes, derived purely from the placed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumePoint {
    Batch { index: usize, placed: usize },
    AllComplete,
}

/// Scans batches in order and returns the first one that is not full, with
/// the number of its targets already placed.
pub fn resume_point(
    plan: &BatchPlan,
    targets: &[String],
    placements: &impl PlacementLookup,
) -> ResumePoint {
    for index in 0..plan.len() {
        let placed = count_placed(plan, index, targets, placements);
        if placed < plan.size(index) {
            return ResumePoint::Batch { index, placed };
        }
    }
    ResumePoint::AllComplete
}

pub fn count_placed(
    plan: &BatchPlan,
    batch: usize,
    targets: &[String],
    placements: &impl PlacementLookup,
) -> usize {
    plan.range(batch)
        .and_then(|range| targets.get(range))
        .map_or(0, |ids| {
            ids.iter().filter(|id| placements.is_placed(id)).count()
        })
}

#[cfg(test)]
mod tests {
    use {super::*, std::collections::HashSet};

    fn targets(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("item_{}", i)).collect()
    }

    fn placed(ids: impl IntoIterator<Item = usize>) -> HashSet<String> {
        ids.into_iter().map(|i| format!("item_{}", i)).collect()
    }

    #[test]
    fn test_uniform_plan() {
        let plan = BatchPlan::new(
            &BatchLayout::Uniform {
                batches: 3,
                per_batch: 7,
            },
            21,
        );
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.range(1), Some(7..14));
        assert_eq!(plan.batch_of(13), Some(1));
        assert_eq!(plan.batch_of(21), None);
        assert!(!plan.is_mismatched());
        assert!(plan.is_last(2));
        assert!(!plan.is_last(1));
    }

    #[test]
    fn test_custom_plan() {
        let plan = BatchPlan::new(&BatchLayout::Custom(vec![5, 7, 10]), 22);
        assert_eq!(plan.range(0), Some(0..5));
        assert_eq!(plan.range(1), Some(5..12));
        assert_eq!(plan.range(2), Some(12..22));
        assert_eq!(plan.size(3), 0);
    }

    #[test]
    fn test_plan_clamps_to_fewer_targets() {
        let plan = BatchPlan::new(&BatchLayout::Custom(vec![5, 7, 10]), 8);
        assert!(plan.is_mismatched());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.range(1), Some(5..8));
        assert_eq!(plan.unreachable_targets(), 0);
    }

    #[test]
    fn test_plan_with_extra_targets() {
        let plan = BatchPlan::new(&BatchLayout::Custom(vec![2, 0, 3]), 7);
        assert!(plan.is_mismatched());
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.range(1), Some(2..5));
        assert_eq!(plan.unreachable_targets(), 2);
    }

    #[test]
    fn test_resume_point_partial_second_batch() {
        let plan = BatchPlan::new(&BatchLayout::Custom(vec![5, 7, 10]), 22);
        let targets = targets(22);
        let placed = placed((0..5).chain(5..8));

        assert_eq!(
            resume_point(&plan, &targets, &placed),
            ResumePoint::Batch {
                index: 1,
                placed: 3
            }
        );
    }

    #[test]
    fn test_resume_point_is_deterministic() {
        let plan = BatchPlan::new(&BatchLayout::Custom(vec![3, 4, 2]), 9);
        let targets = targets(9);
        let subsets = [
            placed([]),
            placed([0, 1, 2]),
            placed([0, 2, 5, 8]),
            placed([0, 1, 2, 3, 4, 5, 6]),
            placed(0..9),
        ];

        for subset in &subsets {
            let first = resume_point(&plan, &targets, subset);
            let second = resume_point(&plan, &targets, subset);
            assert_eq!(first, second);
        }
        assert_eq!(
            resume_point(&plan, &targets, &subsets[2]),
            ResumePoint::Batch {
                index: 0,
                placed: 2
            }
        );
        assert_eq!(
            resume_point(&plan, &targets, &subsets[4]),
            ResumePoint::AllComplete
        );
    }

    #[test]
    fn test_resume_point_ignores_unknown_placements() {
        let plan = BatchPlan::new(&BatchLayout::Custom(vec![2, 2]), 4);
        let mut placed = placed([0]);
        placed.insert("not_in_level".to_string());

        assert_eq!(
            resume_point(&plan, &targets(4), &placed),
            ResumePoint::Batch {
                index: 0,
                placed: 1
            }
        );
    }
}
