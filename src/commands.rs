//! The viewer's command vocabulary.
//!
//! Commands arrive as short text lines (the terminal front end reads one
//! line per key press). Most are a single character:
//!
//! | Input | Command |
//! |---|---|
//! | *(empty)*, `n`, `space` | next image |
//! | `-`, `b`, `backspace` | previous image |
//! | `h`, `home` | first image |
//! | `r`, `t`, `right` | rotate 90° clockwise |
//! | `l`, `L`, `R`, `T`, `left` | rotate 90° counter-clockwise |
//! | `u`, `up` | rotate 180° |
//! | `f` / `F` | toggle fullscreen / full size |
//! | `p` | toggle presentation mode |
//! | `+`, `=` / `/` | zoom in / out |
//! | `d` | delete (asks first) |
//! | `0`–`9` | toggle note list |
//! | `c TEXT` | set comment (`c` alone clears it) |
//! | `i` | image info |
//! | `s N` | slideshow every N seconds (`s 0` stops) |
//! | `q`, `esc` | quit |

use crate::imaging::ImageBackend;
use crate::session::{Flow, Navigation, Presenter, Session, SessionError};
use crate::slideshow::Scheduler;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("slideshow delay must be a number of seconds, got '{0}'")]
    Delay(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Next,
    Prev,
    First,
    /// Relative turn in degrees, clockwise positive.
    Rotate(i32),
    ToggleFullscreen,
    ToggleFullsize,
    TogglePresentation,
    ZoomIn,
    ZoomOut,
    Delete,
    Note(u8),
    Comment(String),
    Info,
    Slideshow(Duration),
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim_end_matches(['\r', '\n']);
        if let Some(text) = input.strip_prefix("c ") {
            return Ok(Command::Comment(text.trim().to_string()));
        }
        if let Some(seconds) = input.strip_prefix("s ") {
            let seconds = seconds.trim();
            let secs: f64 = seconds
                .parse()
                .map_err(|_| CommandError::Delay(seconds.to_string()))?;
            if !secs.is_finite() || secs < 0.0 {
                return Err(CommandError::Delay(seconds.to_string()));
            }
            return Ok(Command::Slideshow(Duration::from_secs_f64(secs)));
        }

        let command = match input.trim() {
            "" | "n" | "space" => Command::Next,
            "-" | "b" | "backspace" => Command::Prev,
            "h" | "home" => Command::First,
            "r" | "t" | "right" => Command::Rotate(90),
            "l" | "L" | "R" | "T" | "left" => Command::Rotate(-90),
            "u" | "up" => Command::Rotate(180),
            "f" => Command::ToggleFullscreen,
            "F" => Command::ToggleFullsize,
            "p" => Command::TogglePresentation,
            "+" | "=" => Command::ZoomIn,
            "/" => Command::ZoomOut,
            "d" => Command::Delete,
            "c" => Command::Comment(String::new()),
            "i" => Command::Info,
            "q" | "esc" => Command::Quit,
            key => match key.parse::<u8>() {
                Ok(slot) if key.len() == 1 => Command::Note(slot),
                _ => return Err(CommandError::Unknown(key.to_string())),
            },
        };
        Ok(command)
    }
}

impl<B: ImageBackend, P: Presenter, S: Scheduler> Session<B, P, S> {
    /// Carry out one command.
    pub fn execute(&mut self, command: &Command) -> Result<Flow, SessionError> {
        tracing::debug!(?command, "execute");
        match command {
            Command::Next => {
                if self.next_image()? == Navigation::Exhausted
                    && self.presenter_mut().prompt_user("Quit?", "qy", "n")
                {
                    return Ok(Flow::Ended);
                }
            }
            Command::Prev => {
                self.prev_image()?;
            }
            Command::First => {
                self.first_image()?;
            }
            Command::Rotate(degrees) => self.scale_and_rotate(*degrees)?,
            Command::ToggleFullscreen => self.toggle_fullscreen()?,
            Command::ToggleFullsize => self.toggle_fullsize()?,
            Command::TogglePresentation => self.toggle_presentation()?,
            Command::ZoomIn => self.zoom_in()?,
            Command::ZoomOut => self.zoom_out()?,
            Command::Delete => return self.delete_active(),
            Command::Note(slot) => {
                self.toggle_note(*slot)?;
            }
            Command::Comment(text) => self.set_comment(text)?,
            Command::Info => self.show_info()?,
            Command::Slideshow(delay) => self.set_slideshow_delay(*delay),
            Command::Quit => return Ok(Flow::Ended),
        }
        Ok(Flow::Continue)
    }
}
