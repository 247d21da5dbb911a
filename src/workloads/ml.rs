//! A small dense network trained on synthetic data, standing in for an ML
//! framework training step. Two layers, ReLU, softmax cross-entropy, plain
//! SGD; everything is hand-rolled over flat `Vec<f32>` buffers.

use std::hint::black_box;

use rand::Rng;

use crate::core::config::BenchConfig;
use crate::core::error::Result;
use crate::core::outcome::{Category, Measurement};
use crate::core::registry::SuiteRegistry;

pub fn suite() -> Result<SuiteRegistry> {
    let mut registry = SuiteRegistry::new(Category::Ml);

    registry.register("ML Inference (1 Epoch)", |cfg: &BenchConfig| {
        inference(cfg)
    })?;
    registry.register("ML Training (5 Epochs)", |cfg: &BenchConfig| {
        training(cfg)
    })?;

    Ok(registry)
}

struct DenseNet {
    features: usize,
    hidden: usize,
    classes: usize,
    w1: Vec<f32>,
    b1: Vec<f32>,
    w2: Vec<f32>,
    b2: Vec<f32>,
}

impl DenseNet {
    fn new(features: usize, hidden: usize, classes: usize, rng: &mut impl Rng) -> Self {
        let scale1 = (2.0 / features as f32).sqrt();
        let scale2 = (2.0 / hidden as f32).sqrt();
        Self {
            features,
            hidden,
            classes,
            w1: (0..features * hidden)
                .map(|_| rng.gen_range(-scale1..scale1))
                .collect(),
            b1: vec![0.0; hidden],
            w2: (0..hidden * classes)
                .map(|_| rng.gen_range(-scale2..scale2))
                .collect(),
            b2: vec![0.0; classes],
        }
    }

    /// Forward pass for one sample; fills the hidden activations and the
    /// softmax class probabilities.
    fn forward(&self, x: &[f32], hidden_out: &mut [f32], probs_out: &mut [f32]) {
        for h in 0..self.hidden {
            let mut acc = self.b1[h];
            for f in 0..self.features {
                acc += x[f] * self.w1[f * self.hidden + h];
            }
            hidden_out[h] = acc.max(0.0);
        }

        for c in 0..self.classes {
            let mut acc = self.b2[c];
            for h in 0..self.hidden {
                acc += hidden_out[h] * self.w2[h * self.classes + c];
            }
            probs_out[c] = acc;
        }
        softmax(probs_out);
    }

    /// One SGD step on a single sample with cross-entropy loss.
    fn train_sample(&mut self, x: &[f32], label: usize, lr: f32) {
        let mut hidden = vec![0.0f32; self.hidden];
        let mut probs = vec![0.0f32; self.classes];
        self.forward(x, &mut hidden, &mut probs);

        // dL/dlogits for softmax cross-entropy
        let mut dlogits = probs;
        dlogits[label] -= 1.0;

        let mut dhidden = vec![0.0f32; self.hidden];
        for h in 0..self.hidden {
            let mut acc = 0.0;
            for c in 0..self.classes {
                acc += dlogits[c] * self.w2[h * self.classes + c];
                self.w2[h * self.classes + c] -= lr * dlogits[c] * hidden[h];
            }
            if hidden[h] > 0.0 {
                dhidden[h] = acc;
            }
        }
        for c in 0..self.classes {
            self.b2[c] -= lr * dlogits[c];
        }

        for f in 0..self.features {
            for h in 0..self.hidden {
                self.w1[f * self.hidden + h] -= lr * dhidden[h] * x[f];
            }
        }
        for h in 0..self.hidden {
            self.b1[h] -= lr * dhidden[h];
        }
    }
}

fn softmax(logits: &mut [f32]) {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for v in logits.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in logits.iter_mut() {
        *v /= sum;
    }
}

fn synthetic_dataset(
    samples: usize,
    features: usize,
    classes: usize,
    rng: &mut impl Rng,
) -> (Vec<f32>, Vec<usize>) {
    let data: Vec<f32> = (0..samples * features).map(|_| rng.gen()).collect();
    let labels: Vec<usize> = (0..samples).map(|_| rng.gen_range(0..classes)).collect();
    (data, labels)
}

fn inference(cfg: &BenchConfig) -> Result<Measurement> {
    let mut rng = rand::thread_rng();
    let net = DenseNet::new(cfg.ml_features, cfg.ml_hidden, cfg.ml_classes, &mut rng);
    let (data, _) = synthetic_dataset(cfg.ml_samples, cfg.ml_features, cfg.ml_classes, &mut rng);

    let detail = format!("samples={}", cfg.ml_samples);
    let (measurement, checksum) = Measurement::capture(detail, || {
        let mut hidden = vec![0.0f32; cfg.ml_hidden];
        let mut probs = vec![0.0f32; cfg.ml_classes];
        let mut checksum = 0.0f32;
        for s in 0..cfg.ml_samples {
            let x = &data[s * cfg.ml_features..(s + 1) * cfg.ml_features];
            net.forward(x, &mut hidden, &mut probs);
            checksum += probs[0];
        }
        checksum
    });
    black_box(checksum);
    Ok(measurement)
}

fn training(cfg: &BenchConfig) -> Result<Measurement> {
    let mut rng = rand::thread_rng();
    let mut net = DenseNet::new(cfg.ml_features, cfg.ml_hidden, cfg.ml_classes, &mut rng);
    let (data, labels) =
        synthetic_dataset(cfg.ml_samples, cfg.ml_features, cfg.ml_classes, &mut rng);

    let detail = format!(
        "epochs={}, samples={}",
        cfg.ml_training_epochs, cfg.ml_samples
    );
    let (measurement, _) = Measurement::capture(detail, || {
        for _ in 0..cfg.ml_training_epochs {
            for s in 0..cfg.ml_samples {
                let x = &data[s * cfg.ml_features..(s + 1) * cfg.ml_features];
                net.train_sample(x, labels[s], 0.01);
            }
        }
    });
    black_box(net.w1.first().copied());
    Ok(measurement)
}
