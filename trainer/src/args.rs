use clap::{Parser, ValueEnum};

use classifier::{Initializer, Value};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The number of training iterations to run on the sample.
    #[arg(short, long, default_value_t = 1000)]
    pub iterations: usize,

    /// The gradient descent step size. (0.001 - 0.1)
    #[arg(short, long, default_value_t = 0.01)]
    pub learning_rate: Value,

    /// The weight-initialization scheme.
    #[arg(long, value_enum, default_value = "xavier")]
    pub initializer: InitializerArg,

    /// Report the loss every this many iterations.
    #[arg(long, default_value_t = 100)]
    pub report_every: usize,

    /// A seed for the weight-initialization rng, for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InitializerArg {
    Xavier,
    Uniform,
}

impl From<InitializerArg> for Initializer {
    fn from(arg: InitializerArg) -> Self {
        match arg {
            InitializerArg::Xavier => Initializer::Xavier,
            InitializerArg::Uniform => Initializer::Uniform,
        }
    }
}
