pub use self::activation::{
    relu, relu_prime, sigmoid, sigmoid_prime, softmax, softmax_prime, Activation,
};
pub use self::layer::{BackwardSignal, Layer, LayerError, LayerRole};
pub use self::linear_algebra::{dot_product, MathError, Value};
pub use self::loss::{squared_error, squared_error_prime};
pub use self::network::{Network, NetworkError};
pub use self::node::{Initializer, Node};

mod activation;
mod layer;
mod linear_algebra;
mod loss;
mod network;
mod node;
