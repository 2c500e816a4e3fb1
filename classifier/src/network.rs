use tracing::{instrument, trace};

use crate::layer::{BackwardSignal, Layer, LayerError, LayerRole};
use crate::linear_algebra::Value;

#[derive(Debug, Eq, PartialEq)]
pub enum NetworkError {
    InvalidConfig(&'static str),
    InvalidShape(&'static str),
    InvalidTopology(&'static str),
    Layer(LayerError),
}

impl From<LayerError> for NetworkError {
    fn from(error: LayerError) -> Self {
        Self::Layer(error)
    }
}

/// An ordered chain of layers. Layers are appended during assembly and
/// addressed by index; the first layer is always the input layer and the
/// most recently appended layer is always the output layer.
#[derive(Clone, Debug, Default)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// A layer's role, derived from its position in the chain.
    pub fn role(&self, index: usize) -> Option<LayerRole> {
        if index >= self.layers.len() {
            return None;
        }

        Some(if index == 0 {
            LayerRole::Input
        } else if index == self.layers.len() - 1 {
            LayerRole::Output
        } else {
            LayerRole::Hidden
        })
    }

    /// Appends a layer to the end of the chain, taking over the output
    /// role from the previously-last layer. The first layer appended must
    /// carry no incoming weights; every later layer must expect exactly as
    /// many inputs as the previous layer has nodes, and must have an
    /// activation kind.
    pub fn add_layer(&mut self, layer: Layer) -> Result<(), NetworkError> {
        match self.layers.last() {
            None => {
                if layer.input_count() != 0 {
                    return Err(NetworkError::InvalidTopology(
                        "the input layer cannot have incoming weights",
                    ));
                }
            }
            Some(previous) => {
                if layer.input_count() != previous.node_count() {
                    return Err(NetworkError::InvalidTopology(
                        "layer input count does not match the previous layer's node count",
                    ));
                }
                if layer.activation().is_none() {
                    return Err(NetworkError::InvalidConfig(
                        "non-input layers require an activation kind",
                    ));
                }
            }
        }

        self.layers.push(layer);
        Ok(())
    }

    /// Writes values directly into the input layer's nodes. No activation
    /// is applied, and nothing is mutated on a length mismatch.
    pub fn set_input_values(&mut self, values: &[Value]) -> Result<(), NetworkError> {
        let first = match self.layers.first_mut() {
            Some(layer) => layer,
            None => {
                return Err(NetworkError::InvalidTopology("the network has no layers"));
            }
        };

        if values.len() != first.node_count() {
            return Err(NetworkError::InvalidShape(
                "input value count does not match the input layer's node count",
            ));
        }

        first.set_values(values)?;
        Ok(())
    }

    /// Stores the expected values the output layer's loss is measured
    /// against.
    pub fn set_expected_output_values(&mut self, values: &[Value]) -> Result<(), NetworkError> {
        if self.layers.len() < 2 {
            return Err(NetworkError::InvalidTopology(
                "the network has no output layer",
            ));
        }

        let last = self.layers.last_mut().unwrap();
        if values.len() != last.node_count() {
            return Err(NetworkError::InvalidShape(
                "expected value count does not match the output layer's node count",
            ));
        }

        last.set_expected(values)?;
        Ok(())
    }

    /// Sets the gradient descent step size on every layer.
    pub fn set_learning_rate(&mut self, rate: Value) -> Result<(), NetworkError> {
        for layer in &mut self.layers {
            layer.set_learning_rate(rate)?;
        }
        Ok(())
    }

    /// The output layer's current activation values.
    pub fn output_values(&self) -> Vec<Value> {
        self.layers
            .last()
            .map(Layer::values)
            .unwrap_or_default()
    }

    /// Propagates the input layer's values forward through every layer in
    /// index order, then reports the aggregate loss against the expected
    /// outputs.
    #[instrument(level = "trace", skip(self))]
    pub fn feed_forward(&mut self) -> Result<Value, NetworkError> {
        if self.layers.len() < 2 {
            return Err(NetworkError::InvalidTopology(
                "feeding forward requires at least two layers",
            ));
        }

        for i in 1..self.layers.len() {
            let (head, tail) = self.layers.split_at_mut(i);
            let previous_outputs = head[i - 1].values();

            tail[0].forward_update(&previous_outputs)?;
            trace!(layer = i, values = ?tail[0].values(), "Updated layer.");
        }

        Ok(self.total_loss())
    }

    /// Propagates error gradients backward from the output layer down to,
    /// but not including, the input layer, updating weights as it goes.
    /// Each hidden step consumes the gradient terms the downstream step
    /// just produced, so the traversal order is load-bearing.
    #[instrument(level = "trace", skip(self))]
    pub fn back_propagate(&mut self) -> Result<(), NetworkError> {
        if self.layers.len() < 2 {
            return Err(NetworkError::InvalidTopology(
                "back propagation requires at least two layers",
            ));
        }

        let mut signal: Option<BackwardSignal> = None;
        for i in (1..self.layers.len()).rev() {
            let (head, tail) = self.layers.split_at_mut(i);
            let previous_outputs = head[i - 1].values();
            let (current, rest) = tail.split_at_mut(1);

            let downstream = match (&signal, rest.first()) {
                (Some(signal), Some(layer)) => Some((signal, layer)),
                _ => None,
            };

            signal = Some(current[0].back_propagate(&previous_outputs, downstream)?);
            trace!(layer = i, "Updated weights.");
        }

        Ok(())
    }

    /// The output layer's total loss against its expected values. Every
    /// other layer contributes exactly zero.
    pub fn total_loss(&self) -> Value {
        match self.layers.split_last() {
            Some((output, rest)) if !rest.is_empty() => output.total_loss(LayerRole::Output),
            _ => 0.0,
        }
    }
}
