use crate::error::*;
use serde::{Deserialize, Serialize};

/// Isotropic elastic material, constant over a block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub rho: f64,
    pub lambda: f64,
    /// Shear modulus.
    pub g: f64,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            rho: 1.0,
            lambda: 1.0,
            g: 1.0,
        }
    }
}

impl Material {
    pub fn new(rho: f64, lambda: f64, g: f64) -> SolverResult<Self> {
        let m = Material { rho, lambda, g };
        m.validate()?;
        Ok(m)
    }

    pub fn validate(&self) -> SolverResult<()> {
        if !(self.rho > 0.0) {
            return Err(SolverError::InvalidMaterial(format!(
                "density must be positive, got {}",
                self.rho
            )));
        }
        if !(self.g > 0.0) {
            return Err(SolverError::InvalidMaterial(format!(
                "shear modulus must be positive, got {}",
                self.g
            )));
        }
        if !(self.lambda + 2.0 * self.g > 0.0) {
            return Err(SolverError::InvalidMaterial(format!(
                "P-wave modulus must be positive, got {}",
                self.lambda + 2.0 * self.g
            )));
        }
        Ok(())
    }

    pub fn cp(&self) -> f64 {
        ((self.lambda + 2.0 * self.g) / self.rho).sqrt()
    }

    pub fn cs(&self) -> f64 {
        (self.g / self.rho).sqrt()
    }

    pub fn zp(&self) -> f64 {
        self.rho * self.cp()
    }

    pub fn zs(&self) -> f64 {
        self.rho * self.cs()
    }
}
