use crate::error::Result;
use crate::params::ParamSet;
use crate::tensors::Ten64;

use super::{Backward, Gradients, Layer};

/// Applies layers in order, feeding each output into the next layer.
///
/// A `Sequential` is itself a [`Layer`], so it can be nested. Parameters of
/// child `i` are exposed as `"<i>.<name>"`. An empty sequence is the
/// identity.
#[derive(Default)]
pub struct Sequential {
    layers: Vec<Box<dyn Layer>>,
}

impl Sequential {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer, builder style.
    #[must_use]
    pub fn with(mut self, layer: impl Layer + 'static) -> Self {
        self.push(layer);
        self
    }

    /// Appends a layer.
    pub fn push(&mut self, layer: impl Layer + 'static) {
        self.layers.push(Box::new(layer));
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterates the child layers in application order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Layer + 'static)> {
        self.layers.iter().map(Box::as_ref)
    }
}

impl core::fmt::Debug for Sequential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(self.layers.iter().map(|l| l.name()))
            .finish()
    }
}

impl Layer for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn apply(&self, input: &Ten64) -> Result<Ten64> {
        let mut x = input.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.apply(&x).inspect_err(|e| {
                log::debug!("sequential: layer {i} ({}) failed: {e}", layer.name());
            })?;
        }
        Ok(x)
    }

    fn forward(&self, input: &Ten64) -> Result<(Ten64, Backward<'_>)> {
        let mut x = input.clone();
        let mut backs = Vec::with_capacity(self.layers.len());
        for (i, layer) in self.layers.iter().enumerate() {
            let (out, back) = layer.forward(&x).inspect_err(|e| {
                log::debug!("sequential: layer {i} ({}) failed: {e}", layer.name());
            })?;
            backs.push(back);
            x = out;
        }

        let back = move |grad: &Ten64| -> Result<Gradients> {
            let mut grad = grad.clone();
            let mut params = ParamSet::new();
            for (i, back) in backs.iter().enumerate().rev() {
                let step = back(&grad)?;
                params.extend_scoped(&i.to_string(), step.params);
                grad = step.input;
            }
            Ok(Gradients {
                input: grad,
                params,
            })
        };

        Ok((x, Box::new(back)))
    }

    fn parameters(&self) -> ParamSet {
        let mut params = ParamSet::new();
        for (i, layer) in self.layers.iter().enumerate() {
            params.extend_scoped(&i.to_string(), layer.parameters());
        }
        params
    }

    fn set_parameters(&mut self, params: ParamSet) -> Result<()> {
        let parts = params.split_indexed(self.layers.len())?;

        let mut applied: Vec<(usize, ParamSet)> = Vec::new();
        for (i, part) in parts.into_iter().enumerate() {
            if part.is_empty() {
                continue;
            }
            let previous = self.layers[i].parameters();
            if let Err(e) = self.layers[i].set_parameters(part) {
                // restore children updated before the failing one
                for (j, prev) in applied.into_iter().rev() {
                    if let Err(restore) = self.layers[j].set_parameters(prev) {
                        log::warn!("sequential: failed to restore layer {j}: {restore}");
                    }
                }
                return Err(e);
            }
            applied.push((i, previous));
        }
        Ok(())
    }
}
