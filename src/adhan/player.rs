//! Audio backends for the adhan.
//!
//! [`CommandPlayer`] shells out to an external media player, one child process
//! per playback. A process exiting on its own is the "ended" signal.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("adhan audio file not found at {0}")]
    MissingFile(PathBuf),
    #[error("could not start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("audio output is disabled")]
    Disabled,
}

/// The single audio resource the adhan service drives.
pub trait AudioPlayer {
    /// Prepare the resource. Called lazily before the first playback.
    fn load(&mut self) -> Result<(), PlaybackError>;
    /// The "can play through" signal.
    fn is_ready(&self) -> bool;
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    /// Seek back to the beginning.
    fn rewind(&mut self);
    /// Returns `true` once when playback has finished on its own.
    fn poll_ended(&mut self) -> bool;
}

pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    file: PathBuf,
    child: Option<Child>,
    ready: bool,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>, file: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args,
            file: file.as_ref().to_path_buf(),
            child: None,
            ready: false,
        }
    }

    fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                log::debug!("adhan player already gone: {}", e);
            }
            let _ = child.wait();
        }
    }
}

impl AudioPlayer for CommandPlayer {
    fn load(&mut self) -> Result<(), PlaybackError> {
        if !self.file.exists() {
            self.ready = false;
            return Err(PlaybackError::MissingFile(self.file.clone()));
        }
        self.ready = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.kill_child();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&self.file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        log::debug!("adhan player started (pid {})", child.id());
        self.child = Some(child);
        Ok(())
    }

    fn pause(&mut self) {
        self.kill_child();
    }

    // Every play() starts a fresh process from the top of the file.
    fn rewind(&mut self) {}

    fn poll_ended(&mut self) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };
        match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("adhan player exited with {}", status);
                self.child = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("Lost track of adhan player: {}", e);
                self.child = None;
                true
            }
        }
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        self.kill_child();
    }
}

/// Stand-in when adhan audio is switched off in the config.
pub struct NullPlayer;

impl AudioPlayer for NullPlayer {
    fn load(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::Disabled)
    }

    fn is_ready(&self) -> bool {
        false
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        Err(PlaybackError::Disabled)
    }

    fn pause(&mut self) {}

    fn rewind(&mut self) {}

    fn poll_ended(&mut self) -> bool {
        false
    }
}

/// Either backend, chosen from configuration at startup.
pub enum Player {
    Command(CommandPlayer),
    Null(NullPlayer),
}

impl Player {
    /// The configured external player, or silence when the adhan is off.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if !config.adhan.enabled {
            return Ok(Player::Null(NullPlayer));
        }
        Ok(Player::Command(CommandPlayer::new(
            config.adhan.player_command.clone(),
            config.adhan.player_args.clone(),
            config.audio_path()?,
        )))
    }
}

impl AudioPlayer for Player {
    fn load(&mut self) -> Result<(), PlaybackError> {
        match self {
            Player::Command(p) => p.load(),
            Player::Null(p) => p.load(),
        }
    }

    fn is_ready(&self) -> bool {
        match self {
            Player::Command(p) => p.is_ready(),
            Player::Null(p) => p.is_ready(),
        }
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        match self {
            Player::Command(p) => p.play(),
            Player::Null(p) => p.play(),
        }
    }

    fn pause(&mut self) {
        match self {
            Player::Command(p) => p.pause(),
            Player::Null(p) => p.pause(),
        }
    }

    fn rewind(&mut self) {
        match self {
            Player::Command(p) => p.rewind(),
            Player::Null(p) => p.rewind(),
        }
    }

    fn poll_ended(&mut self) -> bool {
        match self {
            Player::Command(p) => p.poll_ended(),
            Player::Null(p) => p.poll_ended(),
        }
    }
}
