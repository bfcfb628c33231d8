#![allow(dead_code)]

use jdspfx::audio::AudioFrame;
use jdspfx::{Command, EffectEngine, EngineError};
use std::sync::{Arc, Mutex};

/// What a [`ScriptedEngine`] does with audio.
#[derive(Debug, Clone, Copy)]
pub enum Render {
    Gain(f32),
    Silence,
}

#[derive(Debug, Default)]
pub struct Journal {
    pub commands: Vec<Command>,
    pub process_calls: usize,
    pub frames: Vec<usize>,
}

/// Engine double that journals every call for inspection from the test.
pub struct ScriptedEngine {
    journal: Arc<Mutex<Journal>>,
    render: Render,
}

impl ScriptedEngine {
    pub fn new(render: Render) -> (Self, Arc<Mutex<Journal>>) {
        let journal = Arc::new(Mutex::new(Journal::default()));
        (
            Self {
                journal: Arc::clone(&journal),
                render,
            },
            journal,
        )
    }
}

impl EffectEngine for ScriptedEngine {
    fn command(&mut self, command: &Command) -> Result<(), EngineError> {
        self.journal.lock().unwrap().commands.push(*command);
        Ok(())
    }

    fn process(&mut self, input: &AudioFrame, output: &mut AudioFrame) {
        {
            let mut journal = self.journal.lock().unwrap();
            journal.process_calls += 1;
            journal.frames.push(input.frame_count());
        }
        for (o, i) in output.samples_mut().iter_mut().zip(input.samples()) {
            *o = match self.render {
                Render::Gain(g) => i * g,
                Render::Silence => 0.0,
            };
        }
    }
}

pub fn to_bytes(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
}

pub fn from_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

pub fn sine(frames: usize, sample_rate: f32) -> Vec<f32> {
    (0..frames)
        .flat_map(|i| {
            let t = i as f32 / sample_rate;
            let s = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
            [s, -s]
        })
        .collect()
}
