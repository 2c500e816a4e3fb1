use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;

use crate::activation::Activation;
use crate::linear_algebra::{MathError, Value};

/// The weight-initialization scheme used when a node is constructed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Initializer {
    /// `N(0, 1) * sqrt(1 / inputs)`, centering the variance of the incoming
    /// weights at `1 / inputs` to reduce unstable gradients.
    Xavier,
    /// Uniform sampling in `[0, inputs)`.
    Uniform,
}

/// One computational unit: a scalar activation value and the weights on the
/// connections coming in from the previous layer.
#[derive(Clone, Debug)]
pub struct Node {
    pub value: Value,
    pub weights: Vec<Value>,
}

impl Node {
    /// Builds a node with `inputs` incoming weights, drawn once from the
    /// given initializer. Pass `inputs == 0` for a node in the input layer,
    /// which has no incoming weights.
    pub fn new(inputs: usize, initializer: Initializer, rng: &mut impl Rng) -> Self {
        let weights = match (inputs, initializer) {
            (0, _) => Vec::new(),
            (_, Initializer::Xavier) => {
                let coefficient = (1.0 / inputs as Value).sqrt();
                let normal = Normal::new(0.0, 1.0).unwrap();
                (0..inputs)
                    .map(|_| normal.sample(rng) * coefficient)
                    .collect()
            }
            (_, Initializer::Uniform) => {
                let uniform = Uniform::new(0.0, inputs as Value);
                (0..inputs).map(|_| uniform.sample(rng)).collect()
            }
        };

        Self {
            value: 0.0,
            weights,
        }
    }

    /// Recomputes this node's value from the layer's full pre-activation
    /// vector. The whole vector is needed because softmax is defined over
    /// it, even though the result is stored per node.
    pub fn forward_update(
        &mut self,
        activation: Activation,
        preactivations: &[Value],
        index: usize,
    ) -> Result<(), MathError> {
        self.value = activation.apply(preactivations, index)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn input_layer_nodes_have_no_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        let node = Node::new(0, Initializer::Xavier, &mut rng);

        assert!(node.weights.is_empty());
        assert_eq!(node.value, 0.0);
    }

    #[test]
    fn xavier_draws_one_weight_per_input() {
        let mut rng = StdRng::seed_from_u64(2);
        let node = Node::new(5, Initializer::Xavier, &mut rng);

        assert_eq!(node.weights.len(), 5);
        assert!(node.weights.iter().all(|w| w.is_finite()));
    }

    #[test]
    fn uniform_draws_within_the_input_count() {
        let mut rng = StdRng::seed_from_u64(3);
        let node = Node::new(4, Initializer::Uniform, &mut rng);

        assert_eq!(node.weights.len(), 4);
        assert!(node.weights.iter().all(|&w| (0.0..4.0).contains(&w)));
    }

    #[test]
    fn forward_update_applies_the_activation() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut node = Node::new(2, Initializer::Xavier, &mut rng);

        node.forward_update(Activation::Sigmoid, &[0.0, 1.0], 0).unwrap();
        assert_eq!(node.value, 0.5);

        node.forward_update(Activation::Relu, &[-3.0, 1.0], 0).unwrap();
        assert_eq!(node.value, 0.0);
    }
}
