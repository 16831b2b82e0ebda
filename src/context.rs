//! Session state: the three voice specs, the random source, and config.
//!
//! Edits replace a voice's spec wholesale and are validated before they land,
//! so a failed edit leaves the previous spec in place.

use std::sync::atomic::AtomicBool;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::EngineConfig;
use crate::generator;
use crate::geometry::Geometry;
use crate::melody::{self, Note, Voice, VoiceSet};
use crate::preset::{Composition, Preset};
use crate::spec::{FractalSpec, FractalType, SpecError, DEFAULT_DEPTH};

pub struct GenerationContext {
    melody: FractalSpec,
    bass: FractalSpec,
    drums: FractalSpec,
    config: EngineConfig,
    voices: VoiceSet,
    rng: ChaCha8Rng,
}

impl GenerationContext {
    /// Tree melody, dragon bass and fern drums at the default depth.
    pub fn new(config: EngineConfig) -> Result<Self, SpecError> {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let cap = config.depth_cap();
        let default = |kind| {
            FractalSpec::with_defaults(kind, DEFAULT_DEPTH as i64).map(|s| s.capped(cap))
        };
        Ok(Self {
            melody: default(FractalType::Tree)?,
            bass: default(FractalType::Dragon)?,
            drums: default(FractalType::Barnsley)?,
            voices: config.voices(),
            config,
            rng,
        })
    }

    /// Default config with a fixed seed.
    pub fn seeded(seed: u64) -> Result<Self, SpecError> {
        Self::new(EngineConfig {
            seed: Some(seed),
            ..EngineConfig::default()
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn voices(&self) -> &VoiceSet {
        &self.voices
    }

    pub fn spec(&self, voice: Voice) -> &FractalSpec {
        match voice {
            Voice::Melody => &self.melody,
            Voice::Bass => &self.bass,
            Voice::Drums => &self.drums,
        }
    }

    /// Store `spec` for `voice`, lowering its depth to the session cap.
    pub fn set_spec(&mut self, voice: Voice, spec: FractalSpec) {
        let spec = spec.capped(self.config.depth_cap());
        debug!("{voice} now {} at depth {}", spec.kind(), spec.depth());
        *self.slot(voice) = spec;
    }

    /// Switch a voice to another type, loading that type's defaults.
    pub fn select_type(&mut self, voice: Voice, kind: FractalType) -> Result<(), SpecError> {
        let depth = self.spec(voice).depth();
        let spec = FractalSpec::with_defaults(kind, depth as i64)?;
        self.set_spec(voice, spec);
        Ok(())
    }

    pub fn set_depth(&mut self, voice: Voice, depth: i64) -> Result<(), SpecError> {
        let spec = self.spec(voice).with_depth(depth)?;
        self.set_spec(voice, spec);
        Ok(())
    }

    /// Replace a voice's rules with a parsed rules object.
    pub fn apply_rules(&mut self, voice: Voice, rules: serde_json::Value) -> Result<(), SpecError> {
        let current = self.spec(voice);
        let spec = FractalSpec::from_parts(current.kind().name(), current.depth() as i64, rules)?;
        self.set_spec(voice, spec);
        Ok(())
    }

    /// Parse a JSON rules text, as typed into an editor, and apply it.
    pub fn apply_rules_json(&mut self, voice: Voice, json: &str) -> Result<(), SpecError> {
        let rules = serde_json::from_str(json).map_err(|e| SpecError::param("rules", e.to_string()))?;
        self.apply_rules(voice, rules)
    }

    /// Restore the type's default scalar rules.
    pub fn reset_rules(&mut self, voice: Voice) -> Result<(), SpecError> {
        let current = self.spec(voice);
        let spec = FractalSpec::with_defaults(current.kind(), current.depth() as i64)?;
        self.set_spec(voice, spec);
        Ok(())
    }

    /// Switch a voice to its type's built-in L-system.
    pub fn use_lsystem(&mut self, voice: Voice) -> Result<(), SpecError> {
        let current = self.spec(voice);
        let spec = FractalSpec::lsystem_default(current.kind(), current.depth() as i64)?;
        self.set_spec(voice, spec);
        Ok(())
    }

    pub fn generate(&mut self, voice: Voice) -> Geometry {
        let (spec, rng) = self.spec_and_rng(voice);
        generator::generate(spec, rng)
    }

    /// Generate, giving up on a Mandelbrot field once `cancel` is set.
    pub fn generate_with_cancel(&mut self, voice: Voice, cancel: &AtomicBool) -> Option<Geometry> {
        let (spec, rng) = self.spec_and_rng(voice);
        generator::generate_with_cancel(spec, rng, cancel)
    }

    pub fn indices(&mut self, voice: Voice) -> Vec<u8> {
        let (spec, rng) = self.spec_and_rng(voice);
        melody::map_to_indices(spec, rng)
    }

    pub fn notes(&mut self, voice: Voice) -> Vec<Note> {
        let indices = self.indices(voice);
        melody::to_notes(&indices, self.voices.get(voice))
    }

    pub fn snapshot(&self) -> Preset {
        Preset::new(self.melody.clone(), self.bass.clone(), self.drums.clone())
    }

    /// Replace all three voices with a preset's specs.
    pub fn load_preset(&mut self, preset: &Preset) {
        for voice in Voice::ALL {
            self.set_spec(voice, preset.voice(voice).clone());
        }
        info!("loaded preset {}", preset.id);
    }

    pub fn compose(&mut self, title: impl Into<String>) -> Composition {
        let preset = self.snapshot();
        Composition::render(title, &preset, &self.voices, &mut self.rng)
    }

    fn spec_and_rng(&mut self, voice: Voice) -> (&FractalSpec, &mut ChaCha8Rng) {
        let spec = match voice {
            Voice::Melody => &self.melody,
            Voice::Bass => &self.bass,
            Voice::Drums => &self.drums,
        };
        (spec, &mut self.rng)
    }

    fn slot(&mut self, voice: Voice) -> &mut FractalSpec {
        match voice {
            Voice::Melody => &mut self.melody,
            Voice::Bass => &mut self.bass,
            Voice::Drums => &mut self.drums,
        }
    }
}
