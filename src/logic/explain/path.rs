//! Decision-path bookkeeping for the TreeSHAP algorithm.
//!
//! A path records, for every feature split on the way down a tree, the
//! proportion of training cover that flows through when the feature is out of
//! the coalition (`zero_fraction`) and whether the explained sample follows
//! the branch when it is in (`one_fraction`). `pweight` carries the permutation
//! weights of Lundberg et al. (2020), maintained incrementally by
//! [`extend`](PathState::extend) / [`unwind`](PathState::unwind).

/// One feature split on the current decision path.
#[derive(Debug, Clone, Copy)]
pub struct PathElement {
    /// Transformed-feature index, or -1 for the root sentinel.
    pub feature: i32,
    pub zero_fraction: f64,
    pub one_fraction: f64,
    pub pweight: f64,
}

/// The unique-feature path from the root to the current node.
#[derive(Debug, Clone, Default)]
pub struct PathState {
    elements: Vec<PathElement>,
}

impl PathState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique depth: number of feature splits on the path (the root sentinel
    /// does not count).
    pub fn depth(&self) -> usize {
        self.elements.len().saturating_sub(1)
    }

    pub fn element(&self, index: usize) -> &PathElement {
        &self.elements[index]
    }

    /// Position of a feature already on the path (excluding the sentinel).
    pub fn find(&self, feature: i32) -> Option<usize> {
        self.elements[1..]
            .iter()
            .position(|e| e.feature == feature)
            .map(|i| i + 1)
    }

    /// Grow the path by one split, redistributing permutation weights.
    pub fn extend(&mut self, zero_fraction: f64, one_fraction: f64, feature: i32) {
        let d = self.elements.len();
        self.elements.push(PathElement {
            feature,
            zero_fraction,
            one_fraction,
            pweight: if d == 0 { 1.0 } else { 0.0 },
        });

        for i in (0..d).rev() {
            self.elements[i + 1].pweight +=
                one_fraction * self.elements[i].pweight * (i + 1) as f64 / (d + 1) as f64;
            self.elements[i].pweight =
                zero_fraction * self.elements[i].pweight * (d - i) as f64 / (d + 1) as f64;
        }
    }

    /// Remove a split from the path, restoring the weights `extend` produced
    /// before it was added.
    pub fn unwind(&mut self, index: usize) {
        let d = self.depth();
        let one_fraction = self.elements[index].one_fraction;
        let zero_fraction = self.elements[index].zero_fraction;
        let mut next_one_portion = self.elements[d].pweight;

        for i in (0..d).rev() {
            if one_fraction != 0.0 {
                let tmp = self.elements[i].pweight;
                self.elements[i].pweight =
                    next_one_portion * (d + 1) as f64 / ((i + 1) as f64 * one_fraction);
                next_one_portion = tmp
                    - self.elements[i].pweight * zero_fraction * (d - i) as f64 / (d + 1) as f64;
            } else {
                self.elements[i].pweight = self.elements[i].pweight * (d + 1) as f64
                    / (zero_fraction * (d - i) as f64);
            }
        }

        for i in index..d {
            let next = self.elements[i + 1];
            let e = &mut self.elements[i];
            e.feature = next.feature;
            e.zero_fraction = next.zero_fraction;
            e.one_fraction = next.one_fraction;
        }
        self.elements.pop();
    }

    /// Sum of permutation weights the path would have if `index` were
    /// unwound, without mutating the path.
    pub fn unwound_sum(&self, index: usize) -> f64 {
        let d = self.depth();
        let one_fraction = self.elements[index].one_fraction;
        let zero_fraction = self.elements[index].zero_fraction;
        let mut next_one_portion = self.elements[d].pweight;
        let mut total = 0.0;

        if one_fraction != 0.0 {
            for i in (0..d).rev() {
                let tmp = next_one_portion / ((i + 1) as f64 * one_fraction);
                total += tmp;
                next_one_portion =
                    self.elements[i].pweight - tmp * zero_fraction * (d - i) as f64;
            }
        } else {
            for i in (0..d).rev() {
                total += self.elements[i].pweight / (zero_fraction * (d - i) as f64);
            }
        }

        total * (d + 1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_path() -> PathState {
        let mut path = PathState::new();
        path.extend(1.0, 1.0, -1);
        path
    }

    #[test]
    fn test_depth_counts_splits_not_sentinel() {
        let mut path = root_path();
        assert_eq!(path.depth(), 0);
        path.extend(0.5, 1.0, 3);
        assert_eq!(path.depth(), 1);
    }

    #[test]
    fn test_extend_single_split_weights() {
        let mut path = root_path();
        path.extend(0.6, 1.0, 0);
        assert!((path.element(0).pweight - 0.3).abs() < 1e-12);
        assert!((path.element(1).pweight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unwind_reverses_extend() {
        let mut path = root_path();
        path.extend(0.6, 1.0, 0);
        path.extend(0.25, 0.0, 2);

        let mut reference = root_path();
        reference.extend(0.6, 1.0, 0);

        path.unwind(2);
        assert_eq!(path.depth(), reference.depth());
        for i in 0..=path.depth() {
            assert_eq!(path.element(i).feature, reference.element(i).feature);
            assert!((path.element(i).pweight - reference.element(i).pweight).abs() < 1e-12);
        }
    }

    #[test]
    fn test_find_locates_feature_after_sentinel() {
        let mut path = root_path();
        path.extend(0.5, 1.0, 7);
        path.extend(0.5, 0.0, 9);
        assert_eq!(path.find(7), Some(1));
        assert_eq!(path.find(9), Some(2));
        assert_eq!(path.find(-1), None);
        assert_eq!(path.find(3), None);
    }
}
