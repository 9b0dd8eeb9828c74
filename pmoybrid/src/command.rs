//! Commands and requests: the closed action vocabulary of a session
//!
//! Each [`Command`] carries its argument contract and its audio-action flag
//! as data. A [`Request`] binds a command to already-validated arguments and
//! is immutable thereafter; argument errors surface at construction time and
//! never reach a transaction.

use pmobouquet::ServiceId;

use crate::errors::ControlError;

/// How a swap replaces the current item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwapMode {
    /// Play the replacement from its beginning once the current item ends.
    End2End,
    /// Crossfade into the replacement immediately.
    Fade2End,
}

impl SwapMode {
    pub fn wire_token(&self) -> &'static str {
        match self {
            SwapMode::End2End => "end2end",
            SwapMode::Fade2End => "fade2end",
        }
    }
}

/// A concrete argument value bound to a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandArg {
    Mode(SwapMode),
    Service(ServiceId),
}

/// Named action a session can execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    Connect,
    Disconnect,
    Refresh,
    Prepare,
    Play,
    Stop,
    SwapItem,
    SwapService,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Connect => "connect",
            Command::Disconnect => "disconnect",
            Command::Refresh => "refresh",
            Command::Prepare => "prepare",
            Command::Play => "play",
            Command::Stop => "stop",
            Command::SwapItem => "swap-item",
            Command::SwapService => "swap-service",
        }
    }

    /// True for commands whose effect the player can hear.
    pub fn has_audio_action(&self) -> bool {
        matches!(
            self,
            Command::Play | Command::Stop | Command::SwapItem | Command::SwapService
        )
    }

    /// Validate an argument list against this command's fixed signature.
    pub fn assert_argument_list_valid(&self, args: &[CommandArg]) -> Result<(), ControlError> {
        match self {
            Command::SwapItem => match args {
                [CommandArg::Mode(_)] => Ok(()),
                _ => Err(ControlError::invalid_arguments(
                    self.name(),
                    "expects exactly one swap mode",
                )),
            },
            Command::SwapService => match args {
                [CommandArg::Service(_)] => Ok(()),
                _ => Err(ControlError::invalid_arguments(
                    self.name(),
                    "expects exactly one service identifier",
                )),
            },
            _ => {
                if args.is_empty() {
                    Ok(())
                } else {
                    Err(ControlError::invalid_arguments(
                        self.name(),
                        format!("takes no arguments, got {}", args.len()),
                    ))
                }
            }
        }
    }
}

/// Immutable pairing of a command with its validated arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    command: Command,
    args: Vec<CommandArg>,
}

impl Request {
    /// Bind a command to concrete arguments, validating eagerly.
    pub fn new(command: Command, args: Vec<CommandArg>) -> Result<Self, ControlError> {
        command.assert_argument_list_valid(&args)?;
        Ok(Self { command, args })
    }

    pub fn connect() -> Self {
        Self::bare(Command::Connect)
    }

    pub fn disconnect() -> Self {
        Self::bare(Command::Disconnect)
    }

    pub fn refresh() -> Self {
        Self::bare(Command::Refresh)
    }

    pub fn prepare() -> Self {
        Self::bare(Command::Prepare)
    }

    pub fn play() -> Self {
        Self::bare(Command::Play)
    }

    pub fn stop() -> Self {
        Self::bare(Command::Stop)
    }

    pub fn swap_item(mode: SwapMode) -> Self {
        Self {
            command: Command::SwapItem,
            args: vec![CommandArg::Mode(mode)],
        }
    }

    pub fn swap_service(service: ServiceId) -> Self {
        Self {
            command: Command::SwapService,
            args: vec![CommandArg::Service(service)],
        }
    }

    // Valid by construction for the zero-argument commands.
    fn bare(command: Command) -> Self {
        Self {
            command,
            args: Vec::new(),
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn args(&self) -> &[CommandArg] {
        &self.args
    }

    /// The bound swap mode, when this is a swap-item request.
    pub fn swap_mode(&self) -> Option<SwapMode> {
        self.args.iter().find_map(|arg| match arg {
            CommandArg::Mode(mode) => Some(*mode),
            _ => None,
        })
    }

    /// The bound service identifier, when this is a swap-service request.
    pub fn service_id(&self) -> Option<&ServiceId> {
        self.args.iter().find_map(|arg| match arg {
            CommandArg::Service(id) => Some(id),
            _ => None,
        })
    }
}
