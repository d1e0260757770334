use crate::derivative::ElasticKernel;
use crate::fields::Fields;
use crate::initial_conditions::pulse::*;
use crate::initial_conditions::rand::*;
use crate::initial_conditions::*;
use crate::util::*;

/// Set the state on `owned`, a block's locally owned points.
pub fn generate_ic(ic_type: &ICType, kernel: ElasticKernel, owned: &AABB<3>, fields: &mut Fields) {
    match *ic_type {
        // fields start out zeroed
        ICType::Zero => {}
        ICType::Rand { max_val } => {
            rand_ic(owned, fields, max_val);
        }
        ICType::Pulse {
            center,
            width,
            amplitude,
        } => {
            let pulse = Pulse {
                center: Vector3::from(center),
                width,
                amplitude,
            };
            pulse_ic(&pulse, kernel, owned, fields);
        }
    }
}
