use std::env;
use std::process;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format;

use classifier::{Activation, Initializer, Layer, Network, NetworkError, Value};

use self::args::Args;

mod args;

const INPUT_VALUES: [Value; 3] = [2.0, 4.0, 6.0];
const EXPECTED_OUTPUT_VALUES: [Value; 2] = [1.0, 0.0];

fn main() {
    let args = Args::parse();

    set_default_logging();

    let event_format = format().with_target(false).without_time();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .event_format(event_format)
        .init();

    if let Err(error) = train(&args) {
        error!(?error, "Training failed.");
        process::exit(1);
    }
}

fn train(args: &Args) -> Result<(), NetworkError> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut network = build_network(args.initializer.into(), &mut rng)?;

    network.set_learning_rate(args.learning_rate)?;
    network.set_input_values(&INPUT_VALUES)?;
    network.set_expected_output_values(&EXPECTED_OUTPUT_VALUES)?;

    for iteration in 1..=args.iterations {
        let loss = network.feed_forward()?;
        network.back_propagate()?;

        if iteration % args.report_every == 0 || iteration == args.iterations {
            info!(iteration, loss, "Training...");
        }
    }

    let loss = network.feed_forward()?;
    info!(loss, outputs = ?network.output_values(), "Finished.");

    Ok(())
}

/// Assembles the demo classifier: three input nodes, a relu layer, a
/// sigmoid layer, and a softmax output pair.
fn build_network(
    initializer: Initializer,
    rng: &mut StdRng,
) -> Result<Network, NetworkError> {
    let mut network = Network::new();

    network.add_layer(Layer::new(3, 0, initializer, rng))?;

    let mut hidden = Layer::new(4, 3, initializer, rng);
    hidden.set_activation(Activation::Relu);
    network.add_layer(hidden)?;

    let mut interior = Layer::new(2, 4, initializer, rng);
    interior.set_activation(Activation::Sigmoid);
    network.add_layer(interior)?;

    let mut output = Layer::new(2, 2, initializer, rng);
    output.set_activation(Activation::Softmax);
    network.add_layer(output)?;

    Ok(network)
}

fn set_default_logging() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
}
