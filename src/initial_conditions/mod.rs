mod generate_ic;
pub mod pulse;
pub mod rand;
use clap::ValueEnum;
pub use generate_ic::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ICType {
    #[default]
    Zero,
    /// Uniform noise in `[-max_val, max_val]` on every component.
    Rand {
        max_val: f64,
    },
    /// `-amplitude * exp(-|x - center|^2 / width)` on the normal stresses.
    Pulse {
        center: [f64; 3],
        width: f64,
        amplitude: f64,
    },
}

impl ICType {
    /// The reference pulse, centred in the unit square or cube.
    pub fn reference_pulse() -> Self {
        ICType::Pulse {
            center: [0.5, 0.5, 0.5],
            width: 0.005,
            amplitude: 1.0,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum, Default)]
pub enum ClapICType {
    #[default]
    Zero,
    Rand,
    Pulse,
}

impl ClapICType {
    pub fn to_ic_type(&self, dial: f64) -> ICType {
        match self {
            ClapICType::Zero => ICType::Zero,
            ClapICType::Rand => ICType::Rand { max_val: dial },
            ClapICType::Pulse => ICType::Pulse {
                center: [0.5, 0.5, 0.5],
                width: dial,
                amplitude: 1.0,
            },
        }
    }
}
