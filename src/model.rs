use anyhow::{bail, Context, Result};
use std::path::Path;
use tch::{kind::Kind, CModule, Device, Tensor};

/// Narrow capability the serving core needs from the learned component:
/// a fixed-shape float vector in, a scalar residual out. Keeps the
/// deterministic pipeline agnostic to which backend produced the model.
pub trait ResidualModel: Send + Sync {
    fn infer(&self, features: &[f32]) -> Result<f32>;
    fn in_dim(&self) -> usize;
}

/// TorchScript-backed residual model. Loaded once at startup, read-only and
/// shared for the process lifetime; no hot-reload.
pub struct TorchResidual {
    module: CModule,
    device: Device,
    in_dim: usize,
}

impl TorchResidual {
    pub fn load(model_path: &str, in_dim: usize) -> Result<Self> {
        let device = Device::Cpu;
        let module = CModule::load_on_device(Path::new(model_path), device)
            .with_context(|| format!("failed to load TorchScript model {}", model_path))?;

        let m = Self { module, device, in_dim };

        // Probe with a dummy forward so a shape mismatch fails at startup,
        // not on the first request.
        let residual = m
            .infer(&vec![0.0; in_dim])
            .context("warmup forward failed; artifact/schema mismatch?")?;
        if !residual.is_finite() {
            bail!("warmup forward returned non-finite residual {}", residual);
        }

        Ok(m)
    }
}

impl ResidualModel for TorchResidual {
    fn infer(&self, features: &[f32]) -> Result<f32> {
        if features.len() != self.in_dim {
            bail!(
                "feature length mismatch: got {}, expected {}",
                features.len(),
                self.in_dim
            );
        }

        let input = Tensor::from_slice(features)
            .reshape([1, self.in_dim as i64])
            .to_device(self.device);

        // Forward expects [1, N] and yields a tensor whose first element is
        // the residual scalar.
        let out = self.module.forward_ts(&[input])?;
        let flat = out.reshape([-1]).to_kind(Kind::Float);
        if flat.numel() == 0 {
            bail!("model returned an empty tensor");
        }
        Ok(flat.double_value(&[0]) as f32)
    }

    fn in_dim(&self) -> usize {
        self.in_dim
    }
}
