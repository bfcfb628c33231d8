//! The owning element: property surface on the control side, session lifecycle
//! for the host, and the factory for the streaming side.
//!
//! Every operation that touches the engine goes through one mutex. The global
//! enable flag is mirrored into an atomic so disabled buffers never take it.

use arc_swap::ArcSwap;
use crossbeam::channel::{Receiver, Sender, TrySendError, bounded};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::audio::processor::StreamProcessor;
use crate::engine::{EffectEngine, EngineSession, SessionState};
use crate::error::{FxError, Result};
use crate::params::{ParamId, ParamValue, ParameterStore, PropertyValue};

const BUS_CAPACITY: usize = 64;
pub const MIN_SAMPLE_RATE: i32 = 44100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    F32,
    S16,
    S32,
}

/// Negotiated stream format as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: i32,
    pub channels: u32,
    pub format: SampleFormat,
    pub interleaved: bool,
}

impl AudioFormat {
    pub const fn stereo_f32(sample_rate: i32) -> Self {
        Self {
            sample_rate,
            channels: 2,
            format: SampleFormat::F32,
            interleaved: true,
        }
    }

    fn check(&self) -> Result<()> {
        if self.format != SampleFormat::F32 {
            return Err(FxError::UnsupportedFormat(format!(
                "{:?} samples, only F32 is accepted",
                self.format
            )));
        }
        if self.channels != 2 || !self.interleaved {
            return Err(FxError::UnsupportedFormat(format!(
                "{} channels (interleaved: {}), only interleaved stereo is accepted",
                self.channels, self.interleaved
            )));
        }
        if self.sample_rate < MIN_SAMPLE_RATE {
            return Err(FxError::UnsupportedFormat(format!(
                "{} Hz, at least {MIN_SAMPLE_RATE} Hz required",
                self.sample_rate
            )));
        }
        Ok(())
    }
}

/// Out-of-band notifications for the host, since property setters have no
/// error channel of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    /// A property write was rejected; the previous value stays active.
    Warning { property: String, message: String },
    /// The engine failed a command or buffer.
    Error { message: String },
}

pub(crate) struct Inner {
    pub(crate) session: EngineSession,
    pub(crate) params: ParameterStore,
}

pub(crate) struct Shared {
    enabled: AtomicBool,
    inner: Mutex<Inner>,
    snapshot: ArcSwap<ParameterStore>,
    bus: Sender<BusMessage>,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            error!("Engine lock poisoned by a panicking holder, recovering");
            poisoned.into_inner()
        })
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub(crate) fn post(&self, message: BusMessage) {
        match self.bus.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(m)) => debug!("Bus full, dropping {m:?}"),
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

pub struct Jdspfx {
    shared: Arc<Shared>,
    bus_rx: Receiver<BusMessage>,
}

impl Jdspfx {
    pub fn new(engine: impl EffectEngine) -> Self {
        let params = ParameterStore::defaults();
        let (tx, rx) = bounded(BUS_CAPACITY);

        let shared = Shared {
            enabled: AtomicBool::new(params.enabled()),
            snapshot: ArcSwap::from_pointee(params.clone()),
            inner: Mutex::new(Inner {
                session: EngineSession::new(Box::new(engine)),
                params,
            }),
            bus: tx,
        };

        Self {
            shared: Arc::new(shared),
            bus_rx: rx,
        }
    }

    /// Validate, store and forward one control value.
    pub fn set(&self, id: ParamId, value: impl Into<PropertyValue>) -> Result<()> {
        let raw = value.into();
        let mut inner = self.shared.lock();

        let value = match inner.params.set(id, &raw) {
            Ok(v) => v,
            Err(e) => {
                drop(inner);
                warn!("Rejected {id} = {raw}: {e}");
                self.shared.post(BusMessage::Warning {
                    property: id.name().to_string(),
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        if let ParamValue::Bool(on) = value
            && id == ParamId::Enable
        {
            self.shared.enabled.store(on, Ordering::Release);
        }
        self.shared.snapshot.store(Arc::new(inner.params.clone()));

        let sent = inner.session.apply(id, value);
        drop(inner);

        if let Err(e) = sent {
            error!("Engine failed to apply {id}: {e}");
            self.shared.post(BusMessage::Error {
                message: e.to_string(),
            });
            return Err(e);
        }

        debug!("{id} = {raw}");
        Ok(())
    }

    /// Host-facing setter keyed by property name.
    pub fn set_property(&self, name: &str, value: impl Into<PropertyValue>) -> Result<()> {
        let Some(id) = ParamId::from_name(name) else {
            warn!("Unknown property '{name}'");
            self.shared.post(BusMessage::Warning {
                property: name.to_string(),
                message: "unknown property".to_string(),
            });
            return Err(FxError::UnknownProperty(name.to_string()));
        };
        self.set(id, value)
    }

    /// Last accepted value, read without touching the engine lock.
    pub fn get(&self, id: ParamId) -> ParamValue {
        self.shared.snapshot.load().get(id)
    }

    pub fn get_property(&self, name: &str) -> Result<PropertyValue> {
        let id =
            ParamId::from_name(name).ok_or_else(|| FxError::UnknownProperty(name.to_string()))?;
        Ok(self.get(id).into())
    }

    /// Snapshot of every control as last accepted.
    pub fn parameters(&self) -> Arc<ParameterStore> {
        self.shared.snapshot.load_full()
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.is_enabled()
    }

    /// Format negotiation: validate the stream format, then configure the engine.
    pub fn setup(&self, format: &AudioFormat) -> Result<()> {
        format.check().inspect_err(|e| error!("Setup failed: {e}"))?;
        self.configure(format.sample_rate)
    }

    pub fn configure(&self, sample_rate: i32) -> Result<()> {
        let mut inner = self.shared.lock();
        let Inner { session, params } = &mut *inner;
        match session.configure(sample_rate, params) {
            Ok(()) => {
                info!("Engine configured at {sample_rate} Hz");
                Ok(())
            }
            Err(e) => {
                drop(inner);
                error!("Engine configuration failed: {e}");
                self.shared.post(BusMessage::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn stop(&self) -> Result<()> {
        let result = self.shared.lock().session.stop();
        if let Err(ref e) = result {
            error!("Engine reset failed: {e}");
        }
        result
    }

    pub fn state(&self) -> SessionState {
        self.shared.lock().session.state()
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.shared.lock().session.sample_rate()
    }

    /// Handle for the streaming thread. Each handle owns its own frame pool.
    pub fn stream(&self) -> StreamProcessor {
        StreamProcessor::new(Arc::clone(&self.shared))
    }

    pub fn bus(&self) -> &Receiver<BusMessage> {
        &self.bus_rx
    }
}
