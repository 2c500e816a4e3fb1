use rand::Rng;

use crate::activation::Activation;
use crate::linear_algebra::{dot_product, MathError, Value};
use crate::loss::{squared_error, squared_error_prime};
use crate::node::{Initializer, Node};

const MIN_LEARNING_RATE: Value = 0.001;
const MAX_LEARNING_RATE: Value = 0.1;
const DEFAULT_LEARNING_RATE: Value = 0.01;

/// A layer's role in the network chain. Roles are derived from position:
/// the first layer is the input layer, the last is the output layer, and
/// everything between is hidden.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayerRole {
    Input,
    Hidden,
    Output,
}

/// The gradient terms one backward step produces and the next-earlier
/// layer's step consumes.
#[derive(Clone, Debug)]
pub struct BackwardSignal {
    pub loss_diff: Vec<Value>,
    pub act_diff: Vec<Value>,
}

#[derive(Debug, Eq, PartialEq)]
pub enum LayerError {
    InvalidConfig(&'static str),
    InvalidShape(&'static str),
    UnknownActivation,
    Math(MathError),
}

impl From<MathError> for LayerError {
    fn from(error: MathError) -> Self {
        Self::Math(error)
    }
}

/// An ordered group of nodes sharing an activation kind. Node order is
/// significant: it defines the index correspondence with each node's weight
/// vector and with the adjacent layers.
#[derive(Clone, Debug)]
pub struct Layer {
    nodes: Vec<Node>,
    inputs: usize,
    activation: Option<Activation>,
    learning_rate: Value,
    preactivations: Vec<Value>,
    postactivations: Vec<Value>,
    expected: Vec<Value>,
}

impl Layer {
    /// Builds a layer of `node_count` nodes, each with `inputs` incoming
    /// weights drawn once from `initializer`. Pass `inputs == 0` for the
    /// input layer.
    pub fn new(
        node_count: usize,
        inputs: usize,
        initializer: Initializer,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            nodes: (0..node_count)
                .map(|_| Node::new(inputs, initializer, rng))
                .collect(),
            inputs,
            activation: None,
            learning_rate: DEFAULT_LEARNING_RATE,
            preactivations: Vec::new(),
            postactivations: Vec::new(),
            expected: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn input_count(&self) -> usize {
        self.inputs
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn activation(&self) -> Option<Activation> {
        self.activation
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = Some(activation);
    }

    pub fn learning_rate(&self) -> Value {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, rate: Value) -> Result<(), LayerError> {
        if !(MIN_LEARNING_RATE..=MAX_LEARNING_RATE).contains(&rate) {
            return Err(LayerError::InvalidConfig(
                "learning rate must lie in [0.001, 0.1]",
            ));
        }
        self.learning_rate = rate;
        Ok(())
    }

    /// The nodes' current activation values, in node order.
    pub fn values(&self) -> Vec<Value> {
        self.nodes.iter().map(|node| node.value).collect()
    }

    /// Writes values directly into the nodes, with no activation applied.
    /// Nothing is mutated on a length mismatch.
    pub fn set_values(&mut self, values: &[Value]) -> Result<(), LayerError> {
        if values.len() != self.nodes.len() {
            return Err(LayerError::InvalidShape(
                "value count does not match node count",
            ));
        }

        for (node, &value) in self.nodes.iter_mut().zip(values) {
            node.value = value;
        }
        Ok(())
    }

    /// Stores the expected output values this layer's loss is measured
    /// against.
    pub fn set_expected(&mut self, values: &[Value]) -> Result<(), LayerError> {
        if values.len() != self.nodes.len() {
            return Err(LayerError::InvalidShape(
                "expected value count does not match node count",
            ));
        }

        self.expected = values.to_vec();
        Ok(())
    }

    /// Recomputes every node's value from the previous layer's outputs:
    /// each node's pre-activation is the dot product of those outputs with
    /// the node's weights, and the activation kind maps the pre-activation
    /// vector to the new values. Both vectors are cached for the next
    /// backward pass.
    pub fn forward_update(&mut self, previous_outputs: &[Value]) -> Result<(), LayerError> {
        let activation = self.activation.ok_or(LayerError::UnknownActivation)?;

        let mut preactivations = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            preactivations.push(dot_product(previous_outputs, &node.weights)?);
        }

        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.forward_update(activation, &preactivations, index)?;
        }

        self.postactivations = self.nodes.iter().map(|node| node.value).collect();
        self.preactivations = preactivations;

        Ok(())
    }

    /// Total squared error of the current values against the expected
    /// outputs. Only the output layer ever has a nonzero loss.
    pub fn total_loss(&self, role: LayerRole) -> Value {
        if role != LayerRole::Output {
            return 0.0;
        }

        self.postactivations
            .iter()
            .zip(&self.expected)
            .map(|(&output, &expected)| squared_error(output, expected))
            .sum()
    }

    /// Runs one backward step over this layer, updating its weights by
    /// gradient descent and returning the gradient terms the next-earlier
    /// layer's step consumes.
    ///
    /// With no `downstream`, this is the output layer's step: the error
    /// signal comes from the loss derivative against the expected outputs.
    /// With a `downstream` signal and layer, this is a hidden layer's step:
    /// the error signal is back-propagated from the downstream layer's
    /// gradient terms across the weights that connect to each node here.
    /// The downstream layer has already applied its own weight updates by
    /// the time this step reads them.
    pub fn back_propagate(
        &mut self,
        previous_outputs: &[Value],
        downstream: Option<(&BackwardSignal, &Layer)>,
    ) -> Result<BackwardSignal, LayerError> {
        let activation = self.activation.ok_or(LayerError::UnknownActivation)?;

        if self.preactivations.len() != self.nodes.len()
            || self.postactivations.len() != self.nodes.len()
        {
            return Err(LayerError::InvalidShape(
                "a backward pass requires a completed forward pass",
            ));
        }
        if previous_outputs.len() != self.inputs {
            return Err(LayerError::InvalidShape(
                "previous layer output count does not match this layer's weights",
            ));
        }

        let mut act_diff = Vec::with_capacity(self.nodes.len());
        for index in 0..self.nodes.len() {
            act_diff.push(activation.derivative(&self.preactivations, index)?);
        }

        let loss_diff = match downstream {
            None => {
                if self.expected.len() != self.nodes.len() {
                    return Err(LayerError::InvalidShape(
                        "expected outputs are not set",
                    ));
                }

                self.postactivations
                    .iter()
                    .zip(&self.expected)
                    .map(|(&output, &expected)| squared_error_prime(output, expected))
                    .collect::<Vec<_>>()
            }
            Some((signal, layer)) => (0..self.nodes.len())
                .map(|i| {
                    layer
                        .nodes
                        .iter()
                        .enumerate()
                        .map(|(j, node)| signal.loss_diff[j] * signal.act_diff[j] * node.weights[i])
                        .sum()
                })
                .collect(),
        };

        for (i, node) in self.nodes.iter_mut().enumerate() {
            for (k, weight) in node.weights.iter_mut().enumerate() {
                let gradient = loss_diff[i] * act_diff[i] * previous_outputs[k];
                *weight -= self.learning_rate * gradient;
            }
        }

        Ok(BackwardSignal {
            loss_diff,
            act_diff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::activation::{sigmoid, sigmoid_prime, softmax};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    fn layer_with_weights(weights: &[&[Value]], activation: Activation) -> Layer {
        let mut layer = Layer::new(weights.len(), weights[0].len(), Initializer::Xavier, &mut rng());
        layer.set_activation(activation);
        for (node, weights) in layer.nodes_mut().iter_mut().zip(weights) {
            node.weights = weights.to_vec();
        }
        layer
    }

    #[test]
    fn learning_rate_is_range_checked() {
        let mut layer = Layer::new(2, 3, Initializer::Xavier, &mut rng());

        assert!(layer.set_learning_rate(0.0001).is_err());
        assert!(layer.set_learning_rate(0.5).is_err());
        assert!(layer.set_learning_rate(0.05).is_ok());
        assert_eq!(layer.learning_rate(), 0.05);
    }

    #[test]
    fn set_values_rejects_wrong_lengths_without_mutating() {
        let mut layer = Layer::new(3, 0, Initializer::Xavier, &mut rng());
        layer.set_values(&[1.0, 2.0, 3.0]).unwrap();

        assert!(layer.set_values(&[1.0, 2.0]).is_err());
        assert_eq!(layer.values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn forward_update_caches_weighted_sums() {
        let mut layer = layer_with_weights(&[&[1.0, 0.0], &[0.5, 0.5], &[-1.0, 1.0]], Activation::Relu);

        layer.forward_update(&[2.0, 4.0]).unwrap();

        assert_eq!(layer.preactivations, vec![2.0, 3.0, 2.0]);
        assert_eq!(layer.values(), vec![2.0, 3.0, 2.0]);
    }

    #[test]
    fn forward_update_clamps_negative_preactivations() {
        let mut layer = layer_with_weights(&[&[-1.0], &[1.0]], Activation::Relu);

        layer.forward_update(&[3.0]).unwrap();

        assert_eq!(layer.preactivations, vec![-3.0, 3.0]);
        assert_eq!(layer.values(), vec![0.0, 3.0]);
    }

    #[test]
    fn forward_update_requires_an_activation() {
        let mut layer = Layer::new(2, 2, Initializer::Xavier, &mut rng());

        assert_eq!(
            layer.forward_update(&[1.0, 2.0]),
            Err(LayerError::UnknownActivation),
        );
    }

    #[test]
    fn forward_update_softmax_normalizes_the_layer() {
        let mut layer = layer_with_weights(&[&[1.0], &[2.0]], Activation::Softmax);

        layer.forward_update(&[1.0]).unwrap();

        let expected = softmax(&[1.0, 2.0]).unwrap();
        assert_eq!(layer.values(), expected);
        assert!((layer.values().iter().sum::<Value>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn total_loss_is_zero_off_the_output_layer() {
        let mut layer = layer_with_weights(&[&[1.0]], Activation::Sigmoid);
        layer.set_expected(&[0.0]).unwrap();
        layer.forward_update(&[1.0]).unwrap();

        assert!(layer.total_loss(LayerRole::Output) > 0.0);
        assert_eq!(layer.total_loss(LayerRole::Hidden), 0.0);
        assert_eq!(layer.total_loss(LayerRole::Input), 0.0);
    }

    #[test]
    fn backward_requires_a_forward_pass() {
        let mut layer = layer_with_weights(&[&[1.0]], Activation::Sigmoid);
        layer.set_expected(&[1.0]).unwrap();

        assert!(layer.back_propagate(&[1.0], None).is_err());
    }

    #[test]
    fn backward_requires_expected_outputs_on_the_output_step() {
        let mut layer = layer_with_weights(&[&[1.0]], Activation::Sigmoid);
        layer.forward_update(&[1.0]).unwrap();

        assert!(layer.back_propagate(&[1.0], None).is_err());
    }

    #[test]
    fn output_step_descends_the_loss_gradient() {
        let mut layer = layer_with_weights(&[&[0.5]], Activation::Sigmoid);
        layer.set_learning_rate(0.1).unwrap();
        layer.set_expected(&[1.0]).unwrap();
        layer.forward_update(&[2.0]).unwrap();

        let output = sigmoid(1.0);
        let signal = layer.back_propagate(&[2.0], None).unwrap();

        let loss_diff = 2.0 * (output - 1.0);
        let act_diff = sigmoid_prime(1.0);
        assert!((signal.loss_diff[0] - loss_diff).abs() < 1e-12);
        assert!((signal.act_diff[0] - act_diff).abs() < 1e-12);

        let expected_weight = 0.5 - 0.1 * loss_diff * act_diff * 2.0;
        assert!((layer.nodes()[0].weights[0] - expected_weight).abs() < 1e-12);
    }

    #[test]
    fn hidden_step_sums_the_downstream_gradient_terms() {
        // One hidden node feeding two downstream nodes.
        let mut hidden = layer_with_weights(&[&[1.0]], Activation::Sigmoid);
        hidden.set_learning_rate(0.1).unwrap();
        hidden.forward_update(&[1.0]).unwrap();

        let downstream = layer_with_weights(&[&[0.25], &[-0.5]], Activation::Sigmoid);
        let signal = BackwardSignal {
            loss_diff: vec![0.2, 0.4],
            act_diff: vec![0.5, 0.25],
        };

        let result = hidden
            .back_propagate(&[1.0], Some((&signal, &downstream)))
            .unwrap();

        let error = 0.2 * 0.5 * 0.25 + 0.4 * 0.25 * -0.5;
        assert!((result.loss_diff[0] - error).abs() < 1e-12);

        let act_diff = sigmoid_prime(1.0);
        let expected_weight = 1.0 - 0.1 * error * act_diff * 1.0;
        assert!((hidden.nodes()[0].weights[0] - expected_weight).abs() < 1e-12);
    }
}
