//! Raw-mode stdin, switched between three `termios` profiles on demand:
//! blocking single-byte read, non-blocking poll, and a timed blocking read.
//!
//! Grounded directly on `tty_init`/`tty_asr33_mode`/`tty_exit`: rather than
//! keeping the terminal permanently in raw mode, the mode is only switched
//! (and `tcsetattr` only called) when it actually changes, and the
//! original cooked settings are restored when the console exits.

use std::io::{self, Read};
use std::os::unix::io::RawFd;

use termios::{
    tcgetattr, tcsetattr, Termios, BRKINT, CS8, ECHO, ICANON, ICRNL, IEXTEN, INPCK, ISIG, ISTRIP,
    IXON, OPOST, TCSAFLUSH, VMIN, VTIME,
};

use pdp8_devices::KeyboardSource;

const STDIN: RawFd = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Cooked,
    Blocking,
    NonBlocking,
    /// Timed, in deciseconds (`VTIME` units).
    Timed(u8),
}

/// `KeyboardSource` over the real terminal. Only meaningful attached to an
/// actual tty; `new` fails if `stdin` isn't one.
pub struct TerminalKeyboard {
    orig: Termios,
    raw: Termios,
    mode: Mode,
}

impl TerminalKeyboard {
    pub fn new() -> io::Result<Self> {
        let mut orig = Termios::from_fd(STDIN)?;
        tcgetattr(STDIN, &mut orig)?;

        let mut raw = orig;
        raw.c_iflag &= !(BRKINT | ICRNL | INPCK | ISTRIP | IXON);
        raw.c_oflag &= !OPOST;
        raw.c_cflag |= CS8;
        raw.c_lflag &= !(ECHO | ICANON | IEXTEN | ISIG);

        Ok(TerminalKeyboard {
            orig,
            raw,
            mode: Mode::Cooked,
        })
    }

    /// Restore the terminal's original (cooked) settings. Idempotent.
    pub fn restore(&mut self) -> io::Result<()> {
        if self.mode != Mode::Cooked {
            tcsetattr(STDIN, TCSAFLUSH, &self.orig)?;
            self.mode = Mode::Cooked;
        }
        Ok(())
    }

    fn enter(&mut self, mode: Mode) -> io::Result<()> {
        if self.mode == mode {
            return Ok(());
        }
        let (vmin, vtime) = match mode {
            Mode::Cooked => {
                tcsetattr(STDIN, TCSAFLUSH, &self.orig)?;
                self.mode = mode;
                return Ok(());
            }
            Mode::Blocking => (1, 0),
            Mode::NonBlocking => (0, 0),
            Mode::Timed(deciseconds) => (0, deciseconds),
        };
        self.raw.c_cc[VMIN] = vmin;
        self.raw.c_cc[VTIME] = vtime;
        tcsetattr(STDIN, TCSAFLUSH, &self.raw)?;
        self.mode = mode;
        Ok(())
    }

    fn read_one(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(err) => Err(err),
        }
    }
}

impl Drop for TerminalKeyboard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

impl KeyboardSource for TerminalKeyboard {
    fn poll(&mut self) -> io::Result<Option<u8>> {
        self.enter(Mode::NonBlocking)?;
        self.read_one()
    }

    fn read_blocking(&mut self) -> io::Result<u8> {
        self.enter(Mode::Blocking)?;
        loop {
            if let Some(byte) = self.read_one()? {
                return Ok(byte);
            }
        }
    }

    fn read_timeout(&mut self, timeout: std::time::Duration) -> io::Result<Option<u8>> {
        let deciseconds = (timeout.as_millis() / 100).clamp(1, 255) as u8;
        self.enter(Mode::Timed(deciseconds))?;
        self.read_one()
    }
}

/// `KeyboardSource` over a plain file, for `assign 3 <file>` — feeding the
/// keyboard device from a low-speed reader tape instead of the terminal.
/// Every read is effectively instantaneous, so the blocking/timed variants
/// never actually wait; EOF reports no byte available, forever.
pub struct FileKeyboardSource {
    file: std::fs::File,
}

impl FileKeyboardSource {
    #[must_use]
    pub fn new(file: std::fs::File) -> Self {
        FileKeyboardSource { file }
    }

    fn read_one(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match self.file.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(err) => Err(err),
        }
    }
}

impl KeyboardSource for FileKeyboardSource {
    fn poll(&mut self) -> io::Result<Option<u8>> {
        self.read_one()
    }

    fn read_blocking(&mut self) -> io::Result<u8> {
        Ok(self.read_one()?.unwrap_or(0))
    }

    fn read_timeout(&mut self, _timeout: std::time::Duration) -> io::Result<Option<u8>> {
        self.read_one()
    }
}
