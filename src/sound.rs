use std::{fmt::Debug, time::Duration};

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source, source::SineWave};

/// How long a single cue plays
const CUE_LENGTH: Duration = Duration::from_millis(60);

/// A short audible hint for a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Push,
    Pop,
    Clear,
}

impl Cue {
    /// Tone frequency in Hz. Pushes go up, pops come down.
    pub const fn frequency(self) -> f32 {
        match self {
            Cue::Push => 880.0,
            Cue::Pop => 660.0,
            Cue::Clear => 330.0,
        }
    }
}

/// Cross-platform audio wrapper for stack operation cues
pub struct Speaker {
    /// This must be held as long as [`Self::sink`] lives
    _stream: OutputStream,
    /// The audio stream cues are queued on
    sink: Sink,
}

impl Debug for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speaker")
            .field("queued", &self.sink.len())
            .finish()
    }
}

impl Speaker {
    /// Attempts to open the default output device
    pub fn new() -> Option<Self> {
        match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream_handle) => {
                // dont log warnings on exit if in release mode
                if !cfg!(debug_assertions) {
                    stream_handle.log_on_drop(false);
                }

                let sink = Sink::connect_new(stream_handle.mixer());

                Some(Self {
                    _stream: stream_handle,
                    sink,
                })
            }
            Err(e) => {
                log::error!("audio error when opening stream: {:?}", e);
                None
            }
        }
    }

    /// Plays `cue`, cutting off whatever cue is still sounding
    pub fn play(&self, cue: Cue) {
        log::debug!("Playing {:?} cue", cue);
        self.sink.clear();

        let source = SineWave::new(cue.frequency())
            .take_duration(CUE_LENGTH)
            .amplify(0.20);
        self.sink.append(source);
        self.sink.play();
    }
}
