use log::{debug, error, trace};
use std::fmt;

use crate::audio::frame::AudioFrame;
use crate::engine::EffectEngine;
use crate::engine::command::{self, Command};
use crate::error::{FxError, Result};
use crate::params::{ParamId, ParamValue, ParameterStore, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Engine allocated but no sample rate known yet.
    Uninitialized,
    Configured,
    Processing,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Configured => "configured",
            Self::Processing => "processing",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Sole owner of the engine instance and its lifecycle.
///
/// Not synchronised itself; the element keeps it behind its one lock.
pub struct EngineSession {
    engine: Box<dyn EffectEngine>,
    sample_rate: Option<u32>,
    state: SessionState,
}

impl EngineSession {
    pub fn new(engine: Box<dyn EffectEngine>) -> Self {
        Self {
            engine,
            sample_rate: None,
            state: SessionState::Uninitialized,
        }
    }

    pub const fn state(&self) -> SessionState {
        self.state
    }

    pub const fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    pub const fn accepts_process(&self) -> bool {
        matches!(
            self.state,
            SessionState::Configured | SessionState::Processing
        )
    }

    /// INIT, SET_CONFIG, then replay every control so the engine mirrors `params`.
    pub fn configure(&mut self, sample_rate: i32, params: &ParameterStore) -> Result<()> {
        let rate = u32::try_from(sample_rate)
            .ok()
            .filter(|&r| r > 0)
            .ok_or_else(|| FxError::EngineUnavailable(format!("invalid sample rate {sample_rate}")))?;

        debug!("Configuring engine at {rate} Hz (was {})", self.state);

        // INIT wipes the engine, so nothing may be processed until this succeeds.
        self.state = SessionState::Uninitialized;
        self.sample_rate = None;

        self.engine
            .command(&Command::Init)
            .map_err(|e| FxError::EngineUnavailable(e.to_string()))?;
        self.engine
            .command(&Command::SetConfig { sample_rate: rate })
            .map_err(|e| FxError::EngineUnavailable(e.to_string()))?;

        for cmd in command::resync(params) {
            // A single rejected control must not fail negotiation for the stream.
            if let Err(e) = self.engine.command(&cmd) {
                error!("Engine rejected resync of {cmd}: {e}");
            }
        }

        self.sample_rate = Some(rate);
        self.state = SessionState::Configured;
        Ok(())
    }

    /// Forward a freshly stored value. Before configuration the value only lives
    /// in the store and reaches the engine with the next resync.
    pub fn apply(&mut self, id: ParamId, value: ParamValue) -> Result<()> {
        if !self.accepts_process() {
            trace!("Deferring {id} until the engine is configured");
            return Ok(());
        }

        if id.spec().target == Target::Gate {
            trace!("{id} only gates the stream, nothing to send");
            return Ok(());
        }

        let cmd = command::translate(id, value);
        trace!("{id} -> {cmd}");
        self.engine.command(&cmd)?;
        Ok(())
    }

    /// Reset the engine's internal DSP state. Stored control values are untouched.
    pub fn stop(&mut self) -> Result<()> {
        if !self.accepts_process() {
            debug!("Stop requested while {}, nothing to reset", self.state);
            return Ok(());
        }

        self.state = SessionState::Stopped;
        debug!("Resetting engine");
        self.engine.command(&Command::Reset)?;
        Ok(())
    }

    pub fn process(&mut self, input: &AudioFrame, output: &mut AudioFrame) -> Result<()> {
        debug_assert!(
            self.accepts_process(),
            "process() called while {}; format negotiation must configure the engine first",
            self.state
        );
        if !self.accepts_process() {
            return Err(FxError::NotConfigured);
        }

        if output.frame_count() != input.frame_count() {
            output.resize(input.frame_count());
        }

        if self.state == SessionState::Configured {
            debug!("First buffer, engine now processing");
            self.state = SessionState::Processing;
        }

        self.engine.process(input, output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Payload;
    use crate::error::EngineError;
    use crate::params::PARAM_COUNT;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Log(Arc<Mutex<Vec<Command>>>);

    impl Log {
        fn take(&self) -> Vec<Command> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    struct Doubler {
        log: Log,
        fail_init: bool,
        reject_rate: Option<u32>,
    }

    impl EffectEngine for Doubler {
        fn command(&mut self, command: &Command) -> std::result::Result<(), EngineError> {
            if self.fail_init && *command == Command::Init {
                return Err(EngineError::new(command.code(), "no core"));
            }
            if let Command::SetConfig { sample_rate } = command
                && Some(*sample_rate) == self.reject_rate
            {
                return Err(EngineError::new(command.code(), "unsupported rate"));
            }
            self.log.0.lock().unwrap().push(*command);
            Ok(())
        }

        fn process(&mut self, input: &AudioFrame, output: &mut AudioFrame) {
            for (o, i) in output.samples_mut().iter_mut().zip(input.samples()) {
                *o = i * 2.0;
            }
        }
    }

    fn session() -> (EngineSession, Log) {
        let log = Log::default();
        let engine = Doubler {
            log: log.clone(),
            fail_init: false,
            reject_rate: None,
        };
        (EngineSession::new(Box::new(engine)), log)
    }

    #[test]
    fn rejects_non_positive_rates() {
        let (mut session, log) = session();
        let params = ParameterStore::defaults();
        for rate in [0, -1, i32::MIN] {
            assert!(matches!(
                session.configure(rate, &params),
                Err(FxError::EngineUnavailable(_))
            ));
        }
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(log.take().is_empty());
    }

    #[test]
    fn init_failure_is_engine_unavailable() {
        let log = Log::default();
        let mut session = EngineSession::new(Box::new(Doubler {
            log,
            fail_init: true,
            reject_rate: None,
        }));
        let err = session
            .configure(48000, &ParameterStore::defaults())
            .unwrap_err();
        assert!(matches!(err, FxError::EngineUnavailable(_)));
        assert!(!session.accepts_process());
    }

    #[test]
    fn failed_reconfigure_blocks_processing() {
        let log = Log::default();
        let mut session = EngineSession::new(Box::new(Doubler {
            log,
            fail_init: false,
            reject_rate: Some(96000),
        }));
        let params = ParameterStore::defaults();
        let input = AudioFrame::from_interleaved(vec![0.5, 0.5]).unwrap();
        let mut output = AudioFrame::new();

        session.configure(48000, &params).unwrap();
        session.process(&input, &mut output).unwrap();

        let err = session.configure(96000, &params).unwrap_err();
        assert!(matches!(err, FxError::EngineUnavailable(_)));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(session.sample_rate(), None);
        assert!(!session.accepts_process());

        session.configure(48000, &params).unwrap();
        assert!(session.accepts_process());
    }

    #[test]
    fn global_switch_sends_nothing_live() {
        let (mut session, log) = session();
        session.configure(48000, &ParameterStore::defaults()).unwrap();
        log.take();

        session.apply(ParamId::Enable, ParamValue::Bool(true)).unwrap();
        session.apply(ParamId::Enable, ParamValue::Bool(false)).unwrap();
        assert!(log.take().is_empty());
    }

    #[test]
    fn configure_resyncs_every_control() {
        let (mut session, log) = session();
        let mut params = ParameterStore::defaults();
        params.set(ParamId::BassFreq, &120.into()).unwrap();

        session.configure(48000, &params).unwrap();
        assert_eq!(session.state(), SessionState::Configured);
        assert_eq!(session.sample_rate(), Some(48000));

        let sent = log.take();
        assert_eq!(sent.len(), 2 + PARAM_COUNT);
        assert_eq!(sent[0], Command::Init);
        assert_eq!(sent[1], Command::SetConfig { sample_rate: 48000 });
        assert_eq!(sent[2], Command::Enable);
        assert!(sent.contains(&Command::SetParam {
            opcode: 114,
            payload: Payload::Int16(120)
        }));
    }

    #[test]
    fn values_are_deferred_until_configured() {
        let (mut session, log) = session();
        session.apply(ParamId::BassFreq, ParamValue::Int(90)).unwrap();
        assert!(log.take().is_empty());

        session.configure(44100, &ParameterStore::defaults()).unwrap();
        log.take();
        session.apply(ParamId::BassFreq, ParamValue::Int(90)).unwrap();
        assert_eq!(
            log.take(),
            vec![Command::SetParam {
                opcode: 114,
                payload: Payload::Int16(90)
            }]
        );
    }

    #[test]
    fn lifecycle_round_trip() {
        let (mut session, log) = session();
        let params = ParameterStore::defaults();
        session.configure(48000, &params).unwrap();

        let input = AudioFrame::from_interleaved(vec![0.25, -0.25, 0.5, 0.0]).unwrap();
        let mut output = AudioFrame::new();
        session.process(&input, &mut output).unwrap();
        assert_eq!(session.state(), SessionState::Processing);
        assert_eq!(output.samples(), &[0.5, -0.5, 1.0, 0.0]);

        log.take();
        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(log.take(), vec![Command::Reset]);

        session.configure(96000, &params).unwrap();
        session.process(&input, &mut output).unwrap();
        assert_eq!(session.state(), SessionState::Processing);
        assert_eq!(session.sample_rate(), Some(96000));
    }

    #[test]
    fn stop_before_configure_is_a_no_op() {
        let (mut session, log) = session();
        session.stop().unwrap();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(log.take().is_empty());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "format negotiation"))]
    fn process_without_configure_fails_loudly() {
        let (mut session, _) = session();
        let input = AudioFrame::with_frames(4);
        let mut output = AudioFrame::new();
        assert_eq!(
            session.process(&input, &mut output),
            Err(FxError::NotConfigured)
        );
    }
}
