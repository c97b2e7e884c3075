//! Random forest in scikit-learn `tree_` array layout

use serde::Deserialize;

use super::classifier::ProbabilisticClassifier;
use crate::error::PredictionError;

/// Child index marking a leaf
const LEAF: i64 = -1;

/// One fitted decision tree.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise samples with
/// `x[feature[i]] <= threshold[i]` go left. `value[i]` holds the per-class
/// sample weights reaching the node.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn is_leaf(&self, node: usize) -> bool {
        self.children_left[node] == LEAF
    }

    /// Structural checks. Children must point forward so traversal terminates.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree arrays differ in length".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);

            if left == LEAF || right == LEAF {
                if left != right {
                    return Err(format!("node {} has exactly one child", node));
                }
                let dist = &self.value[node];
                if dist.len() != n_classes {
                    return Err(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        dist.len(),
                        n_classes
                    ));
                }
                if dist.iter().any(|w| !w.is_finite() || *w < 0.0) {
                    return Err(format!("leaf {} has invalid class weights", node));
                }
                if dist.iter().sum::<f64>() <= 0.0 {
                    return Err(format!("leaf {} has zero total weight", node));
                }
                continue;
            }

            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(format!("node {} has invalid child {}", node, child));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(format!("node {} splits on unknown feature {}", node, feature));
            }
            if self.threshold[node].is_nan() {
                return Err(format!("node {} has a NaN threshold", node));
            }
        }

        Ok(())
    }

    /// Leaf reached by `row`
    fn leaf_for(&self, row: &[f64]) -> usize {
        let mut node = 0;
        while !self.is_leaf(node) {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }

    /// Normalised class distribution for `row`
    pub fn predict_distribution(&self, row: &[f64]) -> Vec<f64> {
        let weights = &self.value[self.leaf_for(row)];
        let total: f64 = weights.iter().sum();
        weights.iter().map(|w| w / total).collect()
    }
}

/// Averaged ensemble of decision trees
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
    #[serde(skip)]
    n_features: usize,
    #[serde(skip)]
    n_classes: usize,
}

impl RandomForest {
    #[cfg(test)]
    pub fn new(trees: Vec<DecisionTree>, n_features: usize, n_classes: usize) -> Result<Self, String> {
        let mut forest = Self { trees, n_features: 0, n_classes: 0 };
        forest.validate(n_features, n_classes)?;
        Ok(forest)
    }

    /// Check every tree and fix the input width
    pub fn validate(&mut self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features, n_classes)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        self.n_features = n_features;
        self.n_classes = n_classes;
        Ok(())
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError> {
        if row.len() != self.n_features {
            return Err(PredictionError::ShapeMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_distribution(row)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}
